//! Module for the daily paper listing.

use super::*;

/// Arguments for [`Commands::Listing`]
#[derive(Args, Clone)]
pub struct ListingOptions {
  /// Day of the listing (YYYY-MM-DD), defaults to today
  #[arg(long)]
  pub date: Option<NaiveDate>,
}

/// Function for the [`Commands::Listing`] in the CLI.
pub async fn listing<I: UserInteraction>(
  interaction: &I,
  board: &Paperboard,
  options: ListingOptions,
) -> Result<()> {
  let date = options.date.unwrap_or_else(today);
  interaction.reply(ResponseContent::Info(&format!("Fetching listing for {date}")))?;
  let papers = board.listing_papers(date).await?;

  if papers.is_empty() {
    interaction.reply(ResponseContent::Info("No papers listed for this day"))
  } else {
    interaction.reply(ResponseContent::Papers(&papers))
  }
}
