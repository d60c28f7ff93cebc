//! Module for looking up a single paper.

use super::*;

/// Arguments for [`Commands::Paper`]
#[derive(Args, Clone)]
pub struct PaperOptions {
  /// arXiv identifier or abstract URL, e.g. "2301.07041" or "https://arxiv.org/abs/2301.07041v2"
  pub identifier: String,
}

/// Function for the [`Commands::Paper`] in the CLI.
///
/// When a user is known, the paper's tags and reading list state are shown as well.
pub async fn paper<I: UserInteraction>(
  interaction: &I,
  board: &Paperboard,
  options: PaperOptions,
) -> Result<()> {
  interaction.reply(ResponseContent::Info(&format!("Fetching paper: {}", options.identifier)))?;
  let paper = board.paper(&options.identifier).await?;
  interaction.reply(ResponseContent::Paper(&paper))?;

  if let Some(user) = board.config().user_id.as_deref() {
    let tags: Vec<PaperTag> = board
      .store()
      .tags_for_paper(user, &paper.id)
      .await?
      .into_iter()
      .filter(|t| t.name != READING_LIST)
      .collect();
    if !tags.is_empty() {
      interaction.reply(ResponseContent::Tags(&tags))?;
    }
    if board.store().in_reading_list(user, &paper.id).await? {
      interaction.reply(ResponseContent::Info("On your reading list"))?;
    }
  }
  Ok(())
}
