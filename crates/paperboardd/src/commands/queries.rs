//! Module for the saved query commands.

use super::*;

/// Saved query actions
#[derive(Subcommand, Clone)]
pub enum QueryCommands {
  /// Show the saved queries, newest first
  List,

  /// Save a search expression under a name
  Save {
    /// Display name
    name: String,

    /// arXiv search expression
    query: String,
  },

  /// Delete a saved query by its id
  Delete {
    /// Query id as shown by `queries list`
    id: String,
  },
}

/// Function for the [`Commands::Queries`] in the CLI.
pub async fn queries<I: UserInteraction>(
  interaction: &I,
  board: &Paperboard,
  user: &str,
  cmd: QueryCommands,
) -> Result<()> {
  match cmd {
    QueryCommands::List => {
      let queries: Vec<SavedQuery> = board.store().queries(user).await?;
      if queries.is_empty() {
        interaction.reply(ResponseContent::Info("No saved queries"))
      } else {
        interaction.reply(ResponseContent::Queries(&queries))
      }
    },
    QueryCommands::Save { name, query } => {
      let saved = board.store().save_query(user, &name, &query).await?;
      interaction.reply(ResponseContent::Success(&format!(
        "Saved query {:?} id: {}",
        saved.name, saved.id
      )))
    },
    QueryCommands::Delete { id } => {
      board.store().delete_query(user, &id).await?;
      interaction.reply(ResponseContent::Success(&format!("Deleted query {id}")))
    },
  }
}
