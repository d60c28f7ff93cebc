//! Extraction from the two HTML pages the dashboard links out to.
//!
//! - The newsletter archive lists one anchor per issue under `.email-list`, each carrying its
//!   publication date in a `.email-metadata` child. [`newsletter_url`] picks the issue for a day.
//! - The daily paper listing links every featured paper as `/papers/<arxiv id>`.
//!   [`listing_ids`] pulls those identifiers out in page order, without duplicates.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};

use super::*;

/// Date format used by the newsletter archive, e.g. `January 5, 2025`.
pub const NEWSLETTER_DATE_FORMAT: &str = "%B %-d, %Y";

/// Parses a CSS selector.
fn parse_selector(input: &str) -> Result<Selector> {
  Selector::parse(input).map_err(|e| PaperboardError::Selector(format!("{input}: {e}")))
}

/// Trimmed text content of an element.
fn element_text(element: &ElementRef<'_>) -> String {
  element.text().collect::<String>().trim().to_string()
}

/// Finds the archive link for the issue published on `date`.
///
/// ```
/// use chrono::NaiveDate;
/// use paperboard::scrape::newsletter_url;
///
/// let html = r#"<div class="email-list">
///   <a href="/ainews/archive/jan-6"><div class="email-metadata">January 6, 2025</div></a>
///   <a href="/ainews/archive/jan-5"><div class="email-metadata">January 5, 2025</div></a>
/// </div>"#;
/// let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
/// assert_eq!(newsletter_url(html, date).unwrap().as_deref(), Some("/ainews/archive/jan-5"));
/// ```
pub fn newsletter_url(html: &str, date: NaiveDate) -> Result<Option<String>> {
  let wanted = date.format(NEWSLETTER_DATE_FORMAT).to_string();
  let anchors = parse_selector(".email-list a")?;
  let metadata = parse_selector(".email-metadata")?;

  let document = Html::parse_document(html);
  let url = document
    .select(&anchors)
    .find(|anchor| anchor.select(&metadata).any(|m| element_text(&m) == wanted))
    .and_then(|anchor| anchor.value().attr("href"))
    .map(String::from);

  trace!("Newsletter for {wanted}: {url:?}");
  Ok(url)
}

/// Identifier carried by a listing link such as `/papers/2401.00001#community`.
fn listing_id(href: &str) -> &str {
  let last = href.rsplit('/').next().unwrap_or_default();
  last.split('#').next().unwrap_or_default().trim()
}

/// Collects the paper identifiers linked from a listing page, in page order, deduplicated.
pub fn listing_ids(html: &str) -> Result<Vec<String>> {
  let links = parse_selector(r#"a[href^="/papers/"]"#)?;
  let document = Html::parse_document(html);

  let mut seen = HashSet::new();
  let ids: Vec<String> = document
    .select(&links)
    .filter_map(|link| link.value().attr("href"))
    .map(listing_id)
    .filter(|id| !id.is_empty() && seen.insert(id.to_string()))
    .map(String::from)
    .collect();

  debug!("Listing page links {} papers", ids.len());
  Ok(ids)
}

#[cfg(test)]
mod tests {
  use super::*;

  const ARCHIVE: &str = r#"<html><body>
<div class="email-list">
  <a href="https://buttondown.com/ainews/archive/ainews-one/">
    <div class="email-subject">One</div>
    <div class="email-metadata">
      March 10, 2025
    </div>
  </a>
  <a href="https://buttondown.com/ainews/archive/ainews-two/">
    <div class="email-subject">Two</div>
    <div class="email-metadata">March 9, 2025</div>
  </a>
  <a href="https://buttondown.com/ainews/archive/ainews-three/">
    <div class="email-metadata">March 9, 2025</div>
  </a>
</div>
<a href="/elsewhere"><div class="email-metadata">March 8, 2025</div></a>
</body></html>"#;

  const LISTING: &str = r#"<html><body>
<article>
  <a href="/papers/2401.00001">First paper</a>
  <a href="/papers/2401.00001#community">12 comments</a>
</article>
<article>
  <a href="/papers/2401.00002">Second paper</a>
  <a href="/models/some-model">A model</a>
  <a href="/papers/">Broken</a>
</article>
<a href="https://arxiv.org/papers/2401.00003">External</a>
</body></html>"#;

  #[test]
  fn test_newsletter_date_match() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    assert_eq!(
      newsletter_url(ARCHIVE, date).unwrap().as_deref(),
      Some("https://buttondown.com/ainews/archive/ainews-one/")
    );
  }

  #[test]
  fn test_newsletter_first_match_wins() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
    assert_eq!(
      newsletter_url(ARCHIVE, date).unwrap().as_deref(),
      Some("https://buttondown.com/ainews/archive/ainews-two/")
    );
  }

  #[test]
  fn test_newsletter_missing() {
    // Anchors outside the list do not count
    let date = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
    assert_eq!(newsletter_url(ARCHIVE, date).unwrap(), None);
    assert_eq!(newsletter_url("", date).unwrap(), None);
  }

  #[test]
  fn test_listing_ids() {
    assert_eq!(listing_ids(LISTING).unwrap(), vec!["2401.00001", "2401.00002"]);
    assert!(listing_ids("<html></html>").unwrap().is_empty());
  }

  #[test]
  fn test_listing_id() {
    assert_eq!(listing_id("/papers/2401.00001#community"), "2401.00001");
    assert_eq!(listing_id("/papers/2401.00001"), "2401.00001");
    assert_eq!(listing_id("/papers/"), "");
  }
}
