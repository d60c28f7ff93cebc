//! Module for the digest commands.

use super::*;

/// Digest actions
#[derive(Subcommand, Clone)]
pub enum DigestCommands {
  /// Show the digests, oldest first
  List,

  /// Create a digest
  Create {
    /// Display name, also the key matches are recorded under
    name: String,

    /// Selected topic, may be repeated
    #[arg(long = "topic")]
    topics: Vec<String>,

    /// Free-text description of the interest
    #[arg(long, default_value = "")]
    description: String,
  },

  /// Replace the name, topics and description of a digest
  Update {
    /// Digest id as shown by `digests list`
    id: String,

    /// New display name
    name: String,

    /// Selected topic, may be repeated
    #[arg(long = "topic")]
    topics: Vec<String>,

    /// Free-text description of the interest
    #[arg(long, default_value = "")]
    description: String,
  },

  /// Delete a digest. Recorded matches are kept.
  Delete {
    /// Digest id as shown by `digests list`
    id: String,
  },

  /// Show one page of a digest's matches for a day
  Show {
    /// Digest name
    name: String,

    /// Day of the matches (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Print the page as JSON
    #[arg(long)]
    json: bool,
  },
}

/// Function for the [`Commands::Digests`] in the CLI.
pub async fn digests<I: UserInteraction>(
  interaction: &I,
  board: &Paperboard,
  user: &str,
  cmd: DigestCommands,
) -> Result<()> {
  let store = board.store();
  match cmd {
    DigestCommands::List => {
      let digests: Vec<Digest> = store.digests(user).await?;
      if digests.is_empty() {
        interaction.reply(ResponseContent::Info("No digests yet"))
      } else {
        interaction.reply(ResponseContent::Digests(&digests))
      }
    },
    DigestCommands::Create { name, topics, description } => {
      let digest = store.create_digest(user, &name, &topics, &description).await?;
      interaction.reply(ResponseContent::Success(&format!(
        "Created digest {:?} id: {}",
        digest.name, digest.id
      )))
    },
    DigestCommands::Update { id, name, topics, description } => {
      let digest = store.update_digest(user, &id, &name, &topics, &description).await?;
      interaction.reply(ResponseContent::Success(&format!("Updated digest {:?}", digest.name)))
    },
    DigestCommands::Delete { id } => {
      store.delete_digest(user, &id).await?;
      interaction.reply(ResponseContent::Success(&format!("Deleted digest {id}")))
    },
    DigestCommands::Show { name, date, page, json } => {
      let date = date.unwrap_or_else(today);
      let page = board.digest_page(user, &name, date, page).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        Ok(())
      } else if page.total_papers == 0 {
        interaction.reply(ResponseContent::Info(&format!("No matches for {name:?} on {date}")))
      } else {
        interaction.reply(ResponseContent::DigestPage(&page))
      }
    },
  }
}
