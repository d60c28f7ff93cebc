//! Command line interface for the paperboard paper tracker.
//!
//! This crate provides the `paperboard` binary on top of the `paperboard` library. It supports:
//! - Writing a configuration and creating the store
//! - Looking up and searching arXiv papers
//! - Managing the reading list, tags, saved queries and digests of a user
//! - Following the AI newsletter and the daily paper listing
//! - Removing the store
//!
//! # Usage
//!
//! ```bash
//! # Write a config for user alice and create the store
//! paperboard init --user alice
//!
//! # Look up a paper
//! paperboard paper 2301.07041
//!
//! # Papers about agents submitted in the first week of 2024
//! paperboard search "all:agent" --from 2024-01-01 --to 2024-01-07
//!
//! # Bookmark a paper and list the bookmarks
//! paperboard reading-list add 2301.07041
//! paperboard reading-list list
//!
//! # Today's matches of a digest
//! paperboard digests show "Machine Learning"
//! ```
//!
//! Commands acting on user data need a user, taken from `--user` or the `user_id` of the config
//! file. Verbosity is raised with `-v`; `--log-dir` additionally writes a daily rotated log file.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use paperboard::{
  config::Config,
  prelude::*,
  store::{
    tags::READING_LIST, Digest, PaperTag, ReadingListAction, SavedQuery, Store, TagSummary, Toggle,
  },
  Paperboard,
};
use tracing::{debug, trace};
use tracing_appender::rolling;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Track, tag and digest arXiv papers")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the database file. Overrides the path in the config file.
  #[arg(long, short, global = true)]
  path: Option<PathBuf>,

  /// Path to the config file. If not specified, uses the default platform-specific config
  /// directory.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// User to act as. Overrides the user in the config file.
  #[arg(long, short, global = true)]
  user: Option<String>,

  /// Directory for a daily rotated log file
  #[arg(long, global = true)]
  log_dir: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Option<Commands>,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

impl Cli {
  /// The config file this invocation reads and writes.
  fn config_path(&self) -> PathBuf { self.config.clone().unwrap_or_else(Config::default_path) }

  /// Loads the config file and applies the command line overrides.
  fn load_config(&self) -> Result<Config> {
    let path = self.config_path();
    trace!("Using config at: {}", path.display());
    let mut config = Config::load_or_default(&path)?;
    if let Some(db_path) = &self.path {
      config = config.with_database_path(db_path);
    }
    if let Some(user) = &self.user {
      config = config.with_user(user.clone());
    }
    Ok(config)
  }
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used
/// * `log_dir` - Directory for an additional daily log file, if any
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbosity: u8, log_dir: Option<&Path>) -> Result<()> {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  let stderr_layer = tracing_subscriber::fmt::layer()
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true);

  let file_layer = match log_dir {
    Some(dir) => {
      let file_appender = rolling::RollingFileAppender::builder()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix("paperboard")
        .filename_suffix("log")
        .build(dir)?;
      Some(
        tracing_subscriber::fmt::layer()
          .with_writer(file_appender)
          .with_ansi(false)
          .with_thread_ids(true)
          .with_target(true)
          .with_file(true)
          .with_line_number(true),
      )
    },
    None => None,
  };

  tracing_subscriber::registry().with(filter).with(stderr_layer).with(file_layer).init();
  Ok(())
}

/// Entry point for the paperboard CLI application
///
/// Parses arguments, sets up logging and runs the requested command. A failed command is
/// reported on stderr and ends the process with status 1.
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let Some(command) = cli.command.clone() else {
    println!("Please specify a command. Use --help for usage information.");
    std::process::exit(1);
  };

  setup_logging(cli.verbose, cli.log_dir.as_deref())?;
  let terminal = Terminal::new(cli.accept_defaults);

  if let Err(e) = run(&cli, &terminal, command).await {
    terminal.reply(ResponseContent::Error(&e))?;
    std::process::exit(1);
  }
  Ok(())
}

/// Dispatches one command.
///
/// `init` and `clean` manage the files themselves; every other command runs against a
/// [`Paperboard`] built from the loaded configuration.
async fn run<I: UserInteraction>(cli: &Cli, interaction: &I, command: Commands) -> Result<()> {
  match command {
    Commands::Init(options) => return init(cli, interaction, options).await,
    Commands::Clean => return clean(cli, interaction).await,
    _ => {},
  }

  let config = cli.load_config()?;
  debug!("Loaded config: {config:?}");
  let board = Paperboard::builder().with_config(config).build().await?;
  let user = || {
    board.config().user_id.clone().filter(|u| !u.trim().is_empty()).ok_or(PaperboarddError::NoUser)
  };

  match command {
    Commands::Paper(options) => paper(interaction, &board, options).await,
    Commands::Search(options) => search(interaction, &board, options).await,
    Commands::Keywords(options) => keywords(interaction, &board, options).await,
    Commands::News(options) => news(interaction, &board, options).await,
    Commands::Listing(options) => listing(interaction, &board, options).await,
    Commands::ReadingList { cmd } => reading_list(interaction, &board, &user()?, cmd).await,
    Commands::Tags { cmd } => tags(interaction, &board, &user()?, cmd).await,
    Commands::Queries { cmd } => queries(interaction, &board, &user()?, cmd).await,
    Commands::Digests { cmd } => digests(interaction, &board, &user()?, cmd).await,
    Commands::Init(_) | Commands::Clean => Ok(()),
  }
}
