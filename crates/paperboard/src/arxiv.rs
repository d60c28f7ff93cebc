//! Client for the arXiv query API.
//!
//! Queries are sent to the Atom endpoint (`https://export.arxiv.org/api/query` by default)
//! through the retrying [`Fetcher`]. A successful response is then validated before it is
//! normalized:
//!
//! - an empty or whitespace-only body is [`PaperboardError::EmptyResponse`]
//! - a body containing an `<error>` element, or a feed whose entry is an arXiv error entry (its
//!   `id` lives under `/api/errors`), is [`PaperboardError::ApiError`]
//!
//! Neither of these is retried; they describe the payload, not the transport.
//!
//! # Examples
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use paperboard::{arxiv::ArxivClient, fetch::{Fetcher, RetryPolicy}};
//!
//! # async fn example() -> paperboard::error::Result<()> {
//! let client = ArxivClient::new(Fetcher::new(RetryPolicy::default()));
//!
//! let paper = client.fetch_paper("2301.07041").await?;
//! println!("{} ({})", paper.title, paper.category);
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
//! let week = client.date_search("cat:cs.LG", start, end, None).await?;
//! println!("{} papers", week.len());
//! # Ok(())
//! # }
//! ```

use url::Url;

use super::*;
use crate::{fetch::Fetcher, paper::Paper};

/// Default query endpoint.
pub const DEFAULT_API_URL: &str = "https://export.arxiv.org/api/query";

/// Default result cap for date searches.
pub const DATE_SEARCH_MAX_RESULTS: usize = 1000;

/// Default result cap for keyword searches.
pub const KEYWORD_SEARCH_MAX_RESULTS: usize = 100;

lazy_static! {
  /// Message of an inline `<error>` element.
  static ref ERROR_ELEMENT: Regex = Regex::new(r"(?s)<error>(.*?)</error>").unwrap();
  /// Parsed form of [`DEFAULT_API_URL`].
  static ref DEFAULT_ENDPOINT: Url = Url::parse(DEFAULT_API_URL).unwrap();
}

/// Field the upstream sorts results by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
  /// Search relevance
  Relevance,
  /// Date of the last revision
  LastUpdatedDate,
  /// Date of the first submission
  SubmittedDate,
}

impl SortBy {
  /// The value the API expects for `sortBy`.
  pub fn as_str(&self) -> &'static str {
    match self {
      SortBy::Relevance => "relevance",
      SortBy::LastUpdatedDate => "lastUpdatedDate",
      SortBy::SubmittedDate => "submittedDate",
    }
  }
}

/// Direction of the upstream sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  /// Oldest or least relevant first
  Ascending,
  /// Newest or most relevant first
  Descending,
}

impl SortOrder {
  /// The value the API expects for `sortOrder`.
  pub fn as_str(&self) -> &'static str {
    match self {
      SortOrder::Ascending => "ascending",
      SortOrder::Descending => "descending",
    }
  }
}

/// Parameters of one call to the query API.
///
/// Unset parameters are left out of the request and take the upstream defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArxivQuery {
  /// Search expression, e.g. `all:transformer AND cat:cs.LG`
  pub search_query: Option<String>,
  /// Comma separated identifiers to look up directly
  pub id_list:      Option<String>,
  /// Offset of the first result
  pub start:        Option<usize>,
  /// Maximum number of results
  pub max_results:  Option<usize>,
  /// Sort field
  pub sort_by:      Option<SortBy>,
  /// Sort direction
  pub sort_order:   Option<SortOrder>,
}

impl ArxivQuery {
  /// An empty query.
  pub fn new() -> Self { Self::default() }

  /// Sets the search expression.
  pub fn search_query(mut self, query: impl Into<String>) -> Self {
    self.search_query = Some(query.into());
    self
  }

  /// Sets the identifier list.
  pub fn id_list(mut self, ids: impl Into<String>) -> Self {
    self.id_list = Some(ids.into());
    self
  }

  /// Sets the result offset.
  pub fn start(mut self, start: usize) -> Self {
    self.start = Some(start);
    self
  }

  /// Sets the result cap.
  pub fn max_results(mut self, max_results: usize) -> Self {
    self.max_results = Some(max_results);
    self
  }

  /// Sets the sort field and direction.
  pub fn sort(mut self, by: SortBy, order: SortOrder) -> Self {
    self.sort_by = Some(by);
    self.sort_order = Some(order);
    self
  }

  /// Builds the request URL against `base`.
  pub fn to_url(&self, base: &Url) -> Url {
    let mut url = base.clone();
    {
      let mut pairs = url.query_pairs_mut();
      if let Some(query) = &self.search_query {
        pairs.append_pair("search_query", query);
      }
      if let Some(ids) = &self.id_list {
        pairs.append_pair("id_list", ids);
      }
      if let Some(start) = self.start {
        pairs.append_pair("start", &start.to_string());
      }
      if let Some(max) = self.max_results {
        pairs.append_pair("max_results", &max.to_string());
      }
      if let Some(by) = self.sort_by {
        pairs.append_pair("sortBy", by.as_str());
      }
      if let Some(order) = self.sort_order {
        pairs.append_pair("sortOrder", order.as_str());
      }
    }
    url
  }
}

/// Builds the search expression for papers matching `query` submitted between two dates.
///
/// ```
/// use chrono::NaiveDate;
/// use paperboard::arxiv::date_range_query;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// assert_eq!(
///   date_range_query("cat:cs.AI", start, end),
///   "cat:cs.AI AND submittedDate:[202401010000 TO 202401020000]"
/// );
/// ```
pub fn date_range_query(query: &str, start: NaiveDate, end: NaiveDate) -> String {
  format!(
    "{query} AND submittedDate:[{}0000 TO {}0000]",
    start.format("%Y%m%d"),
    end.format("%Y%m%d")
  )
}

/// Builds a conjunction of `all:` terms, one per keyword.
pub fn keyword_query<S: AsRef<str>>(keywords: &[S]) -> String {
  keywords.iter().map(|k| format!("all:{}", k.as_ref().trim())).collect::<Vec<_>>().join(" AND ")
}

/// Client for the arXiv query API.
#[derive(Debug, Clone)]
pub struct ArxivClient {
  /// Retrying HTTP access
  fetcher:  Fetcher,
  /// Query endpoint
  base_url: Url,
}

impl ArxivClient {
  /// Creates a client for the public endpoint.
  pub fn new(fetcher: Fetcher) -> Self {
    Self { fetcher, base_url: DEFAULT_ENDPOINT.clone() }
  }

  /// Creates a client for a custom endpoint.
  pub fn with_base_url(fetcher: Fetcher, base_url: &str) -> Result<Self> {
    Ok(Self { fetcher, base_url: Url::parse(base_url)? })
  }

  /// The configured endpoint.
  pub fn base_url(&self) -> &Url { &self.base_url }

  /// Runs a query and returns the raw feed entries.
  pub async fn entries(&self, query: &ArxivQuery) -> Result<Vec<Value>> {
    let url = query.to_url(&self.base_url);
    debug!("Querying arXiv: {url}");
    let body = self.fetcher.get_text(url.as_str(), &[("Accept", "application/xml")]).await?;
    let entries = parse_feed(&body)?;
    debug!("arXiv returned {} entries", entries.len());
    Ok(entries)
  }

  /// Runs a query and returns the normalized papers, skipping unusable entries.
  pub async fn search(&self, query: &ArxivQuery) -> Result<Vec<Paper>> {
    let entries = self.entries(query).await?;
    Ok(entries.iter().filter_map(|entry| Paper::from_entry(entry, None)).collect())
  }

  /// Looks up one paper by identifier.
  ///
  /// Anything up to the last `/` is ignored, so abstract URLs work as well as bare identifiers.
  /// The requested identifier becomes the paper's `id`.
  pub async fn fetch_paper(&self, paper_id: &str) -> Result<Paper> {
    let id = paper_id.trim().rsplit('/').next().unwrap_or_default();
    if id.is_empty() {
      return Err(PaperboardError::InvalidInput("paper id is required".into()));
    }
    let entries = self.entries(&ArxivQuery::new().id_list(id)).await?;
    entries
      .first()
      .and_then(|entry| Paper::from_entry(entry, Some(id)))
      .ok_or(PaperboardError::NotFound)
  }

  /// Papers matching `query` submitted between `start` and `end`, newest submission first.
  pub async fn date_search(
    &self,
    query: &str,
    start: NaiveDate,
    end: NaiveDate,
    max_results: Option<usize>,
  ) -> Result<Vec<Paper>> {
    if query.trim().is_empty() {
      return Err(PaperboardError::InvalidInput(
        "query, start date and end date are required".into(),
      ));
    }
    let query = ArxivQuery::new()
      .search_query(date_range_query(query.trim(), start, end))
      .start(0)
      .max_results(max_results.unwrap_or(DATE_SEARCH_MAX_RESULTS))
      .sort(SortBy::SubmittedDate, SortOrder::Descending);
    self.search(&query).await
  }

  /// Papers matching every keyword, newest submission first.
  pub async fn keyword_search<S: AsRef<str>>(
    &self,
    keywords: &[S],
    start: usize,
    max_results: Option<usize>,
  ) -> Result<Vec<Paper>> {
    let keywords: Vec<&str> =
      keywords.iter().map(|k| k.as_ref().trim()).filter(|k| !k.is_empty()).collect();
    if keywords.is_empty() {
      return Err(PaperboardError::InvalidInput("keywords are required".into()));
    }
    let query = ArxivQuery::new()
      .search_query(keyword_query(&keywords[..]))
      .start(start)
      .max_results(max_results.unwrap_or(KEYWORD_SEARCH_MAX_RESULTS))
      .sort(SortBy::SubmittedDate, SortOrder::Descending);
    self.search(&query).await
  }
}

/// Validates a feed body and extracts its entries.
pub fn parse_feed(body: &str) -> Result<Vec<Value>> {
  if body.trim().is_empty() {
    return Err(PaperboardError::EmptyResponse);
  }
  if body.contains("<error>") {
    let message = ERROR_ELEMENT
      .captures(body)
      .and_then(|c| c.get(1))
      .map_or("ArXiv API error", |m| m.as_str().trim());
    return Err(PaperboardError::ApiError(message.to_string()));
  }

  let tree = xml::to_tree(body)?;
  let entries: Vec<Value> = paper::as_sequence(tree.get("feed").and_then(|feed| feed.get("entry")))
    .into_iter()
    .cloned()
    .collect();

  if let Some(error) = entries.iter().find(|entry| is_error_entry(entry)) {
    let message = error
      .get("summary")
      .and_then(Value::as_str)
      .unwrap_or("ArXiv API error")
      .trim()
      .to_string();
    return Err(PaperboardError::ApiError(message));
  }
  Ok(entries)
}

/// Whether an entry is the upstream's way of reporting a bad request.
fn is_error_entry(entry: &Value) -> bool {
  entry.get("id").and_then(Value::as_str).is_some_and(|id| id.contains("/api/errors"))
}
