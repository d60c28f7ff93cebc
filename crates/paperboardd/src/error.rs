//! Error types for the paperboard command line.
//!
//! The variants wrap failures from the library, from user prompts, from the file system and
//! from log setup. They are transparent so the underlying message is what the user sees.

use thiserror::Error;

/// Result alias used throughout the command line crate.
pub type Result<T> = core::result::Result<T, PaperboarddError>;

/// Errors that can occur while running a command.
#[derive(Error, Debug)]
pub enum PaperboarddError {
  /// Errors from user interaction dialogs
  #[error(transparent)]
  Dialoguer(#[from] dialoguer::Error),

  /// Errors from the underlying paperboard library
  #[error(transparent)]
  Paperboard(#[from] paperboard::error::PaperboardError),

  /// File system and IO operation errors
  #[error(transparent)]
  IO(#[from] std::io::Error),

  /// Glob pattern matching errors
  #[error(transparent)]
  Glob(#[from] glob::PatternError),

  /// The log file could not be opened
  #[error(transparent)]
  LogFile(#[from] tracing_appender::rolling::InitError),

  /// Output could not be rendered as JSON
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A command that acts on user data was run without a user
  #[error("No user configured. Pass --user or set user_id in the config file")]
  NoUser,
}
