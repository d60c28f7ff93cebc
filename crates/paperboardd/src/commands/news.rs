//! Module for finding the newsletter issue of a day.

use super::*;

/// Arguments for [`Commands::News`]
#[derive(Args, Clone)]
pub struct NewsOptions {
  /// Day of the issue (YYYY-MM-DD), defaults to today
  #[arg(long)]
  pub date: Option<NaiveDate>,
}

/// Function for the [`Commands::News`] in the CLI.
pub async fn news<I: UserInteraction>(
  interaction: &I,
  board: &Paperboard,
  options: NewsOptions,
) -> Result<()> {
  let date = options.date.unwrap_or_else(today);
  match board.newsletter(date).await? {
    Some(url) =>
      interaction.reply(ResponseContent::Success(&format!("Newsletter for {date}: {url}"))),
    None => interaction.reply(ResponseContent::Info(&format!("No newsletter found for {date}"))),
  }
}
