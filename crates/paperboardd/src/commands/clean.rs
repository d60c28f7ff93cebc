//! Module for abstracting the "clean" functionality to the paperboard database.

use super::*;

/// Function for the [`Commands::Clean`] in the CLI.
pub async fn clean<I: UserInteraction>(cli: &Cli, interaction: &I) -> Result<()> {
  let path = match &cli.path {
    Some(path) => path.clone(),
    None => {
      let path = cli.load_config()?.database_path;
      interaction.reply(ResponseContent::Info(&format!(
        "Using configured database path: {}",
        path.display()
      )))?;
      path
    },
  };

  if !path.exists() {
    interaction
      .reply(ResponseContent::Warning(&format!("No database found at: {}", path.display())))?;
    return Ok(());
  }
  interaction.reply(ResponseContent::Warning(&format!("Database found at: {}", path.display())))?;

  // Skip confirmations if force flag is set
  if !cli.accept_defaults {
    if !interaction.confirm("Are you sure you want to delete this database?")? {
      interaction.reply(ResponseContent::Info("Operation cancelled"))?;
      return Ok(());
    }

    // Require typing DELETE for final confirmation
    let typed =
      interaction.prompt(&format!("Type {} to confirm deletion", style("DELETE").red().bold()))?;
    if typed != "DELETE" {
      interaction.reply(ResponseContent::Info("Operation cancelled"))?;
      return Ok(());
    }
  }

  debug!("Removing database: {}", path.display());
  std::fs::remove_file(&path)?;

  // Also remove the SQLite journal files
  let pattern = glob::Pattern::escape(&path.display().to_string());
  for file in glob::glob(&format!("{pattern}-*"))?.flatten() {
    trace!("Removing {}", file.display());
    std::fs::remove_file(file)?;
  }
  interaction.reply(ResponseContent::Success("Database files cleaned"))
}
