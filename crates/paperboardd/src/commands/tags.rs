//! Module for the tag commands.

use super::*;

/// Tag actions
#[derive(Subcommand, Clone)]
pub enum TagCommands {
  /// Show the tags on a paper
  List {
    /// arXiv identifier
    identifier: String,
  },

  /// Tag a paper. A name used before keeps its color.
  Add {
    /// arXiv identifier
    identifier: String,

    /// Tag name
    name: String,

    /// Color classes to use instead of the derived one
    #[arg(long)]
    color: Option<String>,
  },

  /// Remove a tag by its id
  Remove {
    /// Tag id as shown by `tags list`
    id: String,
  },

  /// Show every tag name in use with its color
  Summary,

  /// Show the papers carrying a tag
  Papers {
    /// Tag name
    name: String,
  },
}

/// Function for the [`Commands::Tags`] in the CLI.
pub async fn tags<I: UserInteraction>(
  interaction: &I,
  board: &Paperboard,
  user: &str,
  cmd: TagCommands,
) -> Result<()> {
  let store = board.store();
  match cmd {
    TagCommands::List { identifier } => {
      let tags = store.tags_for_paper(user, &identifier).await?;
      if tags.is_empty() {
        interaction.reply(ResponseContent::Info(&format!("No tags on {identifier}")))
      } else {
        interaction.reply(ResponseContent::Tags(&tags))
      }
    },
    TagCommands::Add { identifier, name, color } => {
      let color = match color {
        Some(color) => Some(color),
        None => store.tag_summary(user).await?.colors.remove(name.trim()),
      };
      trace!("Tagging {identifier} with {name:?} using color {color:?}");
      let tag = store.add_tag(user, &identifier, &name, color.as_deref()).await?;
      interaction.reply(ResponseContent::Success(&format!(
        "Tagged {} with {:?} ({}) id: {}",
        tag.paper_id, tag.name, tag.color, tag.id
      )))
    },
    TagCommands::Remove { id } => {
      store.remove_tag(user, &id).await?;
      interaction.reply(ResponseContent::Success(&format!("Removed tag {id}")))
    },
    TagCommands::Summary => {
      let summary = store.tag_summary(user).await?;
      if summary.names.is_empty() {
        interaction.reply(ResponseContent::Info("No tags yet"))
      } else {
        interaction.reply(ResponseContent::TagSummary(&summary))
      }
    },
    TagCommands::Papers { name } => {
      let papers = board.papers_for_tag(user, &name, &[]).await?;
      if papers.is_empty() {
        interaction.reply(ResponseContent::Info(&format!("No papers tagged {name:?}")))
      } else {
        interaction.reply(ResponseContent::Papers(&papers))
      }
    },
  }
}
