//! Persistent per-user collections.
//!
//! Everything a user creates lives in a single SQLite file:
//! - saved search queries ([`queries`])
//! - tags on papers and the per-user name/color summary, including the reading list
//!   ([`tags`])
//! - digest definitions and the results the nightly digest job writes for them ([`digests`])
//!
//! Papers themselves are never stored; only their version-less identifiers are. All access goes
//! through a [`Store`], which wraps one async connection. Every method takes the owning user's id
//! and only ever sees that user's rows.
//!
//! The schema is applied from `migrations/init.sql` each time a store is opened.
//!
//! # Examples
//!
//! ```no_run
//! use paperboard::store::Store;
//!
//! # async fn example() -> paperboard::error::Result<()> {
//! let store = Store::open(Store::default_path()).await?;
//!
//! store.save_query("alice", "Agents", "all:agent AND cat:cs.AI").await?;
//! store.add_tag("alice", "2301.07041v2", "crypto", None).await?;
//!
//! for tag in store.tags_for_paper("alice", "2301.07041").await? {
//!   println!("{} ({})", tag.name, tag.color);
//! }
//! # Ok(())
//! # }
//! ```

use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use super::*;

pub mod digests;
pub mod queries;
pub mod tags;

#[cfg(test)] mod tests;

pub use digests::{Digest, DigestResult};
pub use queries::SavedQuery;
pub use tags::{color_for_tag, PaperTag, ReadingListAction, TagSummary, Toggle};

/// Handle on the SQLite file holding all user collections.
#[derive(Clone)]
pub struct Store {
  /// Async SQLite connection handle
  conn: Connection,
}

impl std::fmt::Debug for Store {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Store").finish_non_exhaustive()
  }
}

impl Store {
  /// Opens the store at `path`, creating the file and any missing parent directories.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    debug!("Opening store at {}", path.display());
    let conn = Connection::open(path).await?;

    conn
      .call(|conn| {
        conn.execute_batch(include_str!(concat!(
          env!("CARGO_MANIFEST_DIR"),
          "/migrations/init.sql"
        )))?;
        Ok(())
      })
      .await?;

    Ok(Self { conn })
  }

  /// Default location of the store file.
  ///
  /// - On Unix: `~/.local/share/paperboard/paperboard.db`
  /// - On macOS: `~/Library/Application Support/paperboard/paperboard.db`
  /// - On Windows: `%APPDATA%\paperboard\paperboard.db`
  /// - Fallback: `./paperboard/paperboard.db`
  pub fn default_path() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("paperboard").join("paperboard.db")
  }
}

/// Milliseconds since the Unix epoch, the timestamp format of every `created_at`.
fn now_millis() -> i64 { Utc::now().timestamp_millis() }

/// Fresh identifier for a stored row.
fn new_id() -> String { uuid::Uuid::new_v4().simple().to_string() }

/// Rejects blank required arguments.
fn require(value: &str, what: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(PaperboardError::InvalidInput(format!("{what} is required")));
  }
  Ok(())
}
