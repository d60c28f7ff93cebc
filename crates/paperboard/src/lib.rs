//! Personal research-paper tracking: fetch, normalize, tag and digest arXiv papers.
//!
//! `paperboard` is the library behind a paper dashboard. It provides:
//!
//! - Retrying access to the arXiv query API, with bounded exponential backoff
//! - Normalization of heterogeneous Atom entries into one canonical [`Paper`] shape
//! - Concurrent resolution of stored paper identifiers, tolerant of individual failures
//! - Per-user saved queries, tags, a reading list, and digest definitions in a local store
//! - Scraping of the AI newsletter archive and the daily paper listing
//! - A session gate in front of user data
//!
//! # Getting Started
//!
//! ```no_run
//! use paperboard::{config::Config, prelude::*, Paperboard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let board = Paperboard::builder().with_config(Config::default()).build().await?;
//!
//!   // Look up one paper
//!   let paper = board.paper("2301.07041").await?;
//!   println!("Title: {}", paper.title);
//!
//!   // Bookmark it and read the list back, newest first
//!   board.store().toggle_reading_list("alice", &paper.id, ReadingListAction::Add).await?;
//!   for paper in board.reading_list("alice").await? {
//!     println!("{} ({})", paper.title, paper.published);
//!   }
//!
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`fetch`]: HTTP access with retry
//! - [`xml`]: XML to generic tree conversion
//! - [`paper`]: The canonical paper record and entry normalization
//! - [`arxiv`]: Query construction and the arXiv client
//! - [`batch`]: Concurrent identifier resolution
//! - [`scrape`]: Newsletter archive and paper listing extraction
//! - [`store`]: Persistent per-user collections
//! - [`session`]: Session cookies and verification
//! - [`config`]: Settings and their TOML file
//! - [`prelude`]: Common types for glob imports

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::{BTreeMap, HashMap, HashSet},
  future::Future,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod arxiv;
pub mod batch;
pub mod config;
pub mod fetch;
pub mod scrape;
pub mod session;
pub mod store;
pub mod xml;

pub mod error;
pub mod paper;

use crate::{
  arxiv::ArxivClient,
  batch::BatchHandle,
  config::Config,
  error::*,
  fetch::Fetcher,
  paper::Paper,
  session::{IdentityProvider, MemoryIdentityProvider, SessionGate},
  store::{tags::READING_LIST, DigestResult, Store},
};

/// Common types for ergonomic imports.
///
/// ```no_run
/// use paperboard::{prelude::*, Paperboard};
///
/// async fn example(board: &Paperboard) -> Result<Vec<Paper>, PaperboardError> {
///   board.reading_list("alice").await
/// }
/// ```
pub mod prelude {
  pub use crate::{
    error::PaperboardError,
    paper::Paper,
    session::IdentityProvider,
    store::{ReadingListAction, Toggle},
    DigestPage, DigestPaper,
  };
}

/// A paper matched by a digest, with the match details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestPaper {
  /// The matched paper
  #[serde(flatten)]
  pub paper:           Paper,
  /// Why the paper was matched
  pub reason:          String,
  /// How well the paper matches, higher is better
  pub relevancy_score: f64,
}

/// One page of a digest's results for a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestPage {
  /// Papers on this page that could be resolved, most relevant first
  pub results:      Vec<DigestPaper>,
  /// Number of pages for the day
  pub total_pages:  usize,
  /// Number of recorded matches for the day
  pub total_papers: usize,
  /// The requested page, starting at 1
  pub current_page: usize,
}

/// Process-wide service context.
///
/// Built once from a [`Config`]; owns the HTTP client, the arXiv client, the store and the
/// session gate, and hands them to every operation. Operations take `&self`, so one instance can
/// serve concurrent callers.
#[derive(Debug, Clone)]
pub struct Paperboard {
  /// Settings the context was built from
  config:  Config,
  /// Retrying HTTP access shared by every upstream call
  fetcher: Fetcher,
  /// arXiv query client
  arxiv:   ArxivClient,
  /// User collections
  store:   Store,
  /// Session verification
  session: SessionGate,
}

/// Builder for [`Paperboard`].
#[derive(Default)]
pub struct PaperboardBuilder {
  /// Settings, defaulted when unset
  config:   Option<Config>,
  /// Identity provider, in-memory when unset
  provider: Option<Arc<dyn IdentityProvider>>,
  /// HTTP client, fresh when unset
  client:   Option<reqwest::Client>,
}

impl PaperboardBuilder {
  /// Uses `config` instead of the defaults.
  pub fn with_config(mut self, config: Config) -> Self {
    self.config = Some(config);
    self
  }

  /// Uses `provider` to create and verify sessions.
  pub fn with_identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
    self.provider = Some(provider);
    self
  }

  /// Uses an existing HTTP client.
  pub fn with_client(mut self, client: reqwest::Client) -> Self {
    self.client = Some(client);
    self
  }

  /// Validates the configuration, opens the store and assembles the context.
  pub async fn build(self) -> Result<Paperboard> {
    let config = self.config.unwrap_or_default();
    config.validate()?;

    let fetcher = Fetcher::with_client(self.client.unwrap_or_default(), config.retry.clone());
    let arxiv = ArxivClient::with_base_url(fetcher.clone(), &config.arxiv_api_url)?;
    let store = Store::open(&config.database_path).await?;
    let provider = self.provider.unwrap_or_else(|| Arc::new(MemoryIdentityProvider::new()));
    let session = SessionGate::new(provider, config.production);

    info!("Paperboard ready with store at {}", config.database_path.display());
    Ok(Paperboard { config, fetcher, arxiv, store, session })
  }
}

impl Paperboard {
  /// Starts building a context.
  pub fn builder() -> PaperboardBuilder { PaperboardBuilder::default() }

  /// Settings in use.
  pub fn config(&self) -> &Config { &self.config }

  /// The arXiv client.
  pub fn arxiv(&self) -> &ArxivClient { &self.arxiv }

  /// The user collections.
  pub fn store(&self) -> &Store { &self.store }

  /// The session gate.
  pub fn session(&self) -> &SessionGate { &self.session }

  /// Looks up one paper by identifier or abstract URL.
  pub async fn paper(&self, paper_id: &str) -> Result<Paper> {
    self.arxiv.fetch_paper(paper_id).await
  }

  /// Papers matching `query` submitted between two days, newest first.
  pub async fn date_search(
    &self,
    query: &str,
    start: NaiveDate,
    end: NaiveDate,
    max_results: Option<usize>,
  ) -> Result<Vec<Paper>> {
    self.arxiv.date_search(query, start, end, max_results).await
  }

  /// Papers matching every keyword, newest first.
  pub async fn keyword_search<S: AsRef<str>>(
    &self,
    keywords: &[S],
    start: usize,
    max_results: Option<usize>,
  ) -> Result<Vec<Paper>> {
    self.arxiv.keyword_search(keywords, start, max_results).await
  }

  /// Looks up many papers at once, dropping the ones that fail. No order is guaranteed.
  pub async fn resolve_papers<I, S>(&self, ids: I) -> Vec<Paper>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>, {
    let arxiv = &self.arxiv;
    batch::resolve_all(ids, |id| async move { arxiv.fetch_paper(&id).await }).await
  }

  /// Like [`Paperboard::resolve_papers`], but cancellable through the returned handle.
  pub fn resolve_papers_abortable<I, S>(
    &self,
    ids: I,
  ) -> (impl Future<Output = Option<Vec<Paper>>> + '_, BatchHandle)
  where
    I: IntoIterator<Item = S> + 'static,
    S: Into<String> + 'static, {
    let arxiv = &self.arxiv;
    batch::resolve_abortable(ids, move |id| async move { arxiv.fetch_paper(&id).await })
  }

  /// The user's reading list, most recently published first.
  pub async fn reading_list(&self, user_id: &str) -> Result<Vec<Paper>> {
    let ids = self.store.paper_ids_for_tag(user_id, READING_LIST).await?;
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let mut papers = self.resolve_papers(ids).await;
    paper::sort_by_published_desc(&mut papers);
    Ok(papers)
  }

  /// Papers carrying tag `tag_name`.
  ///
  /// Papers already in `loaded` are reused and keep their order in `loaded`; the remaining
  /// identifiers are looked up and appended after them.
  pub async fn papers_for_tag(
    &self,
    user_id: &str,
    tag_name: &str,
    loaded: &[Paper],
  ) -> Result<Vec<Paper>> {
    let ids: HashSet<String> =
      self.store.paper_ids_for_tag(user_id, tag_name).await?.into_iter().collect();

    let mut papers: Vec<Paper> =
      loaded.iter().filter(|p| ids.contains(&paper::strip_version(&p.id))).cloned().collect();
    let present: HashSet<String> = papers.iter().map(|p| paper::strip_version(&p.id)).collect();
    let missing: Vec<String> = ids.into_iter().filter(|id| !present.contains(id)).collect();
    debug!("Tag {tag_name:?}: {} loaded, {} to fetch", papers.len(), missing.len());

    if !missing.is_empty() {
      papers.extend(self.resolve_papers(missing).await);
    }
    Ok(papers)
  }

  /// One page of a digest's matches for `date`.
  ///
  /// Pages start at 1 and hold [`Config::digest_page_size`] matches. Matches whose paper cannot
  /// be looked up are dropped from the page; the totals still count them.
  pub async fn digest_page(
    &self,
    user_id: &str,
    digest_name: &str,
    date: NaiveDate,
    page: usize,
  ) -> Result<DigestPage> {
    let page = page.max(1);
    let page_size = self.config.digest_page_size.max(1);
    let recorded = self.store.digest_results(user_id, date, digest_name).await?;

    let total_papers = recorded.len();
    let total_pages = total_papers.div_ceil(page_size);
    let on_page: Vec<DigestResult> =
      recorded.into_iter().skip((page - 1) * page_size).take(page_size).collect();

    let mut details: HashMap<String, DigestResult> =
      on_page.iter().map(|r| (r.paper_id.clone(), r.clone())).collect();
    let papers = self.resolve_keyed(on_page.into_iter().map(|r| r.paper_id)).await;

    let mut results: Vec<DigestPaper> = papers
      .into_iter()
      .filter_map(|(requested, paper)| {
        let detail = details.remove(&requested)?;
        Some(DigestPaper { paper, reason: detail.reason, relevancy_score: detail.relevancy_score })
      })
      .collect();
    results.sort_by(|a, b| b.relevancy_score.total_cmp(&a.relevancy_score));

    Ok(DigestPage { results, total_pages, total_papers, current_page: page })
  }

  /// Link to the newsletter issue published on `date`, if there is one.
  pub async fn newsletter(&self, date: NaiveDate) -> Result<Option<String>> {
    let html = self.fetcher.get_text(&self.config.news_archive_url, &[]).await?;
    scrape::newsletter_url(&html, date)
  }

  /// Papers featured on the listing page for `date`, in page order.
  pub async fn listing_papers(&self, date: NaiveDate) -> Result<Vec<Paper>> {
    let mut url = url::Url::parse(&self.config.listing_url)?;
    url.query_pairs_mut().append_pair("date", &date.format("%Y-%m-%d").to_string());
    let html = self.fetcher.get_text(url.as_str(), &[]).await?;

    let ids = scrape::listing_ids(&html)?;
    let order: HashMap<String, usize> =
      ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();
    let mut papers = self.resolve_keyed(ids).await;
    papers.sort_by_key(|(requested, _)| order.get(requested).copied().unwrap_or(usize::MAX));
    Ok(papers.into_iter().map(|(_, paper)| paper).collect())
  }

  /// Like [`Paperboard::resolve_papers`], pairing each paper with the identifier it was
  /// requested under. Old-style identifiers such as `hep-th/9901001` come back with a shorter
  /// `id`, so callers match on the requested one.
  async fn resolve_keyed(&self, ids: impl IntoIterator<Item = String>) -> Vec<(String, Paper)> {
    let arxiv = &self.arxiv;
    batch::resolve_all(ids, |id| async move {
      arxiv.fetch_paper(&id).await.map(|paper| (id, paper))
    })
    .await
  }
}
