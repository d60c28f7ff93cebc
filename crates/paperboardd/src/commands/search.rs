//! Module for searching arXiv within a submission date range.

use super::*;

/// Arguments for [`Commands::Search`]
#[derive(Args, Clone)]
pub struct SearchOptions {
  /// arXiv search expression, e.g. "all:agent AND cat:cs.AI"
  pub query: String,

  /// First submission day (YYYY-MM-DD)
  #[arg(long)]
  pub from: NaiveDate,

  /// Last submission day (YYYY-MM-DD), defaults to today
  #[arg(long)]
  pub to: Option<NaiveDate>,

  /// Maximum number of results
  #[arg(long)]
  pub max: Option<usize>,

  /// Use a saved query by id instead of QUERY
  #[arg(long)]
  pub saved: bool,
}

/// Function for the [`Commands::Search`] in the CLI.
pub async fn search<I: UserInteraction>(
  interaction: &I,
  board: &Paperboard,
  options: SearchOptions,
) -> Result<()> {
  let SearchOptions { query, from, to, max, saved } = options;
  let to = to.unwrap_or_else(today);

  let query = if saved {
    let user = board.config().user_id.as_deref().ok_or(PaperboarddError::NoUser)?;
    let saved = board.store().queries(user).await?.into_iter().find(|q| q.id == query);
    match saved {
      Some(saved) => {
        interaction.reply(ResponseContent::Info(&format!("Running saved query {:?}", saved.name)))?;
        saved.query
      },
      None => return Err(PaperboardError::NotFound.into()),
    }
  } else {
    query
  };

  interaction.reply(ResponseContent::Info(&format!("Searching for: {query} ({from} to {to})")))?;
  let papers = board.date_search(&query, from, to, max).await?;

  if papers.is_empty() {
    interaction.reply(ResponseContent::Info("No papers found matching all criteria"))
  } else {
    interaction.reply(ResponseContent::Papers(&papers))
  }
}
