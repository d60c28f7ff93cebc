//! Module for the reading list commands.

use super::*;

/// Reading list actions
#[derive(Subcommand, Clone)]
pub enum ReadingListCommands {
  /// Show the reading list, most recently published first
  List,

  /// Put a paper on the reading list
  Add {
    /// arXiv identifier
    identifier: String,
  },

  /// Take a paper off the reading list
  Remove {
    /// arXiv identifier
    identifier: String,
  },

  /// Tell whether a paper is on the reading list
  Check {
    /// arXiv identifier
    identifier: String,
  },
}

/// Function for the [`Commands::ReadingList`] in the CLI.
pub async fn reading_list<I: UserInteraction>(
  interaction: &I,
  board: &Paperboard,
  user: &str,
  cmd: ReadingListCommands,
) -> Result<()> {
  match cmd {
    ReadingListCommands::List => {
      let papers = board.reading_list(user).await?;
      if papers.is_empty() {
        interaction.reply(ResponseContent::Info("Reading list is empty"))
      } else {
        interaction.reply(ResponseContent::Papers(&papers))
      }
    },
    ReadingListCommands::Add { identifier } =>
      match board.store().toggle_reading_list(user, &identifier, ReadingListAction::Add).await? {
        Toggle::Unchanged => interaction
          .reply(ResponseContent::Info(&format!("{identifier} is already on the reading list"))),
        _ => interaction
          .reply(ResponseContent::Success(&format!("Added {identifier} to the reading list"))),
      },
    ReadingListCommands::Remove { identifier } =>
      match board.store().toggle_reading_list(user, &identifier, ReadingListAction::Remove).await? {
        Toggle::Unchanged => interaction
          .reply(ResponseContent::Info(&format!("{identifier} is not on the reading list"))),
        _ => interaction
          .reply(ResponseContent::Success(&format!("Removed {identifier} from the reading list"))),
      },
    ReadingListCommands::Check { identifier } =>
      if board.store().in_reading_list(user, &identifier).await? {
        interaction.reply(ResponseContent::Info(&format!("{identifier} is on the reading list")))
      } else {
        interaction
          .reply(ResponseContent::Info(&format!("{identifier} is not on the reading list")))
      },
  }
}
