use super::*;

pub mod clean;
pub mod digests;
pub mod init;
pub mod keywords;
pub mod listing;
pub mod news;
pub mod paper;
pub mod queries;
pub mod reading_list;
pub mod search;
pub mod tags;

pub use clean::clean;
pub use digests::{digests, DigestCommands};
pub use init::{init, InitOptions};
pub use keywords::{keywords, KeywordsOptions};
pub use listing::{listing, ListingOptions};
pub use news::{news, NewsOptions};
pub use paper::{paper, PaperOptions};
pub use queries::{queries, QueryCommands};
pub use reading_list::{reading_list, ReadingListCommands};
pub use search::{search, SearchOptions};
pub use tags::{tags, TagCommands};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Write a config file and create the paperboard database
  Init(InitOptions),

  /// Look up one paper by arXiv identifier or abstract URL
  Paper(PaperOptions),

  /// Search arXiv for papers submitted within a date range
  Search(SearchOptions),

  /// Search arXiv for papers matching every keyword
  Keywords(KeywordsOptions),

  /// Manage the reading list
  ReadingList {
    /// Reading list action
    #[command(subcommand)]
    cmd: ReadingListCommands,
  },

  /// Manage tags on papers
  Tags {
    /// Tag action
    #[command(subcommand)]
    cmd: TagCommands,
  },

  /// Manage saved search queries
  Queries {
    /// Query action
    #[command(subcommand)]
    cmd: QueryCommands,
  },

  /// Manage digests and read their matches
  Digests {
    /// Digest action
    #[command(subcommand)]
    cmd: DigestCommands,
  },

  /// Find the AI newsletter issue for a day
  News(NewsOptions),

  /// Show the papers featured on the daily listing
  Listing(ListingOptions),

  /// Removes the entire database after confirmation
  Clean,
}

/// The current day in UTC, the default for every date argument.
pub fn today() -> NaiveDate { Utc::now().date_naive() }
