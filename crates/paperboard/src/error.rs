//! Error types for the paperboard library.
//!
//! Every fallible operation in this crate returns [`PaperboardError`]. The variants follow
//! the way failures are recovered from:
//! - Upstream transport and HTTP failures are retried by [`crate::fetch`] and only surface once
//!   the retry budget is spent
//! - Empty or malformed upstream payloads are terminal for that call
//! - Store and validation failures surface immediately
//! - Session failures surface as [`PaperboardError::Unauthorized`]
//!
//! Individual entries that fail to normalize, and individual lookups that fail inside a batch,
//! never become errors; they are dropped where they occur.
//!
//! # Examples
//!
//! ```no_run
//! use paperboard::{error::PaperboardError, Paperboard};
//!
//! # async fn example(board: Paperboard) -> Result<(), PaperboardError> {
//! match board.paper("2301.07041").await {
//!   Err(PaperboardError::NotFound) => println!("No such paper"),
//!   Err(PaperboardError::Network(e)) => println!("Network error: {}", e),
//!   Err(e) => println!("Other error: {}", e),
//!   Ok(paper) => println!("{}", paper.title),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Error type alias used for the [`paperboard`](crate) crate.
pub type Result<T> = core::result::Result<T, PaperboardError>;

/// Errors that can occur when working with the paperboard library.
#[derive(Error, Debug)]
pub enum PaperboardError {
  /// A network request failed before a response was received.
  ///
  /// This can occur when:
  /// - The network is unavailable
  /// - The server is unreachable
  /// - TLS errors occur
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The upstream answered with a status outside the 2xx class.
  #[error("HTTP error! status: {status} from {url}")]
  HttpStatus {
    /// The numeric HTTP status code
    status: u16,
    /// The URL that was requested
    url:    String,
  },

  /// The upstream answered successfully but with an empty body.
  #[error("Empty response from upstream")]
  EmptyResponse,

  /// The upstream reported an error inside an otherwise successful payload.
  ///
  /// The string holds the upstream message for debugging.
  #[error("API error: {0}")]
  ApiError(String),

  /// The upstream XML could not be read.
  #[error("XML error: {0}")]
  Xml(String),

  /// The requested paper, tag, query or digest does not exist (or is not owned by the caller).
  #[error("Not found")]
  NotFound,

  /// A required argument was missing or empty.
  #[error("Invalid input: {0}")]
  InvalidInput(String),

  /// A tag with the same name is already attached to the paper.
  #[error("Tag already exists for this paper")]
  DuplicateTag,

  /// The session cookie was missing or could not be verified.
  #[error("{0}")]
  Unauthorized(String),

  /// A SQLite operation failed.
  #[error(transparent)]
  Sqlite(#[from] rusqlite::Error),

  /// An async SQLite operation failed.
  #[error(transparent)]
  AsyncSqlite(#[from] tokio_rusqlite::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// The configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// The configuration could not be written.
  #[error(transparent)]
  TomlSer(#[from] toml::ser::Error),

  /// JSON (de)serialization failed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A URL could not be built from the configured endpoint.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),

  /// A CSS selector used for scraping failed to parse.
  #[error("Invalid selector: {0}")]
  Selector(String),

  /// Generic configuration error.
  #[error("{0}")]
  Config(String),
}

impl PaperboardError {
  /// Whether this error is worth retrying.
  ///
  /// Only transport failures and non-2xx statuses are retried. Payload, validation, store and
  /// session errors are terminal.
  pub fn is_transient(&self) -> bool {
    matches!(self, PaperboardError::Network(_) | PaperboardError::HttpStatus { .. })
  }
}
