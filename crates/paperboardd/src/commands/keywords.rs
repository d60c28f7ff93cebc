//! Module for keyword searches across all of arXiv.

use super::*;

/// Arguments for [`Commands::Keywords`]
#[derive(Args, Clone)]
pub struct KeywordsOptions {
  /// Keywords that must all match
  #[arg(required = true)]
  pub keywords: Vec<String>,

  /// Offset of the first result
  #[arg(long, default_value_t = 0)]
  pub start: usize,

  /// Maximum number of results
  #[arg(long)]
  pub max: Option<usize>,
}

/// Function for the [`Commands::Keywords`] in the CLI.
pub async fn keywords<I: UserInteraction>(
  interaction: &I,
  board: &Paperboard,
  options: KeywordsOptions,
) -> Result<()> {
  let KeywordsOptions { keywords, start, max } = options;
  interaction.reply(ResponseContent::Info(&format!("Searching for: {}", keywords.join(" AND "))))?;
  let papers = board.keyword_search(keywords.as_slice(), start, max).await?;

  if papers.is_empty() {
    interaction.reply(ResponseContent::Info("No papers found matching all keywords"))
  } else {
    interaction.reply(ResponseContent::Papers(&papers))
  }
}
