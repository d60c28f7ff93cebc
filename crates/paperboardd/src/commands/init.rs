//! Module for setting up a paperboard environment

use super::*;

/// Arguments for [`Commands::Init`]
#[derive(Args, Clone)]
pub struct InitOptions {
  /// Mark session cookies `Secure`
  #[arg(long)]
  pub production: bool,

  /// Papers per digest page
  #[arg(long)]
  pub page_size: Option<usize>,
}

/// Function for the [`Commands::Init`] in the CLI.
pub async fn init<I: UserInteraction>(
  cli: &Cli,
  interaction: &I,
  options: InitOptions,
) -> Result<()> {
  let InitOptions { production, page_size } = options;
  let config_path = cli.config_path();

  if config_path.exists()
    && !interaction.confirm(&format!(
      "A config already exists at {:?}, do you want to overwrite it?",
      config_path
    ))?
  {
    interaction
      .reply(ResponseContent::Info("Please choose a different config location using --config"))?;
    return Ok(());
  }

  // Set database storage location
  let mut config = if let Some(db_path) = &cli.path {
    Config::default().with_database_path(db_path)
  } else if !interaction.confirm(&format!(
    "Would you like to use the default path {:?} for the database?",
    Store::default_path()
  ))? {
    interaction
      .reply(ResponseContent::Info("Please pass in your intended database path using --path"))?;
    return Ok(());
  } else {
    Config::default()
  };

  if let Some(user) = &cli.user {
    config = config.with_user(user.clone());
  }
  if let Some(size) = page_size {
    config = config.with_digest_page_size(size);
  }
  config = config.with_production(production);
  config.validate()?;

  config.save(&config_path)?;
  Store::open(&config.database_path).await?;

  interaction.reply(ResponseContent::Success(&format!(
    "Paperboard initialized successfully\nConfig path: {:?}\nDatabase path: {:?}",
    config_path, config.database_path,
  )))?;
  if config.user_id.is_none() {
    interaction.reply(ResponseContent::Warning(
      "No user set. Pass --user to commands or add user_id to the config file",
    ))?;
  }
  Ok(())
}
