//! Canonical paper records and the normalization of raw feed entries into them.
//!
//! The arXiv API answers with an Atom feed whose repeatable sub-elements (authors, categories,
//! links) come back either as a single object or as an array, depending on how many of them a
//! given entry has. After [`crate::xml::to_tree`] that variance is visible in the tree, and this
//! module flattens it into a [`Paper`]:
//!
//! - `id` is taken from an explicit identifier when the caller has one, otherwise from the
//!   entry's raw `id` URL, and any trailing version suffix (`v2`) is stripped
//! - `title` and `summary` have newlines replaced by spaces and are trimmed
//! - `authors` is always a list, even for a single author
//! - `category` is the first category's term, or `"Unknown"`
//! - `link` prefers the `text/html` link, falling back to the raw `id`
//!
//! Every multi-valued field goes through [`as_sequence`] before it is inspected, so the
//! single-versus-array question is answered in exactly one place.
//!
//! # Examples
//!
//! ```
//! use paperboard::{paper::Paper, xml::to_tree};
//!
//! let tree = to_tree(
//!   "<entry><id>http://arxiv.org/abs/2305.01234v2</id><title>A\nTitle</title>\
//!    <author><name>Ada Lovelace</name></author></entry>",
//! )
//! .unwrap();
//! let paper = Paper::from_entry(&tree["entry"], None).unwrap();
//! assert_eq!(paper.id, "2305.01234");
//! assert_eq!(paper.title, "A Title");
//! assert_eq!(paper.authors, vec!["Ada Lovelace"]);
//! assert_eq!(paper.category, "Unknown");
//! ```

use super::*;

/// Category reported when an entry carries no usable category term.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Link type that marks the human-readable abstract page.
pub const HTML_LINK_TYPE: &str = "text/html";

lazy_static! {
  /// Trailing version suffix of an arXiv identifier.
  static ref VERSION_SUFFIX: Regex = Regex::new(r"v\d+$").unwrap();
}

/// A paper as presented to callers.
///
/// Papers are rebuilt from upstream data on every request and never persisted; only their
/// identifiers are stored (in tags and digest results).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
  /// arXiv identifier without version suffix, e.g. `2305.01234`
  pub id:        String,
  /// Title with newlines collapsed
  pub title:     String,
  /// Author names in feed order
  pub authors:   Vec<String>,
  /// Abstract with newlines collapsed
  pub summary:   String,
  /// Link to the abstract page
  pub link:      String,
  /// Publication timestamp exactly as reported upstream
  pub published: String,
  /// Primary category term, e.g. `cs.LG`
  pub category:  String,
}

impl Paper {
  /// Normalizes one raw feed entry.
  ///
  /// `explicit_id` is used instead of the entry's own `id` field when the caller already knows
  /// which paper it asked for. Returns `None` when no identifier can be derived at all; such
  /// entries carry nothing a caller could link, tag or look up again.
  pub fn from_entry(entry: &Value, explicit_id: Option<&str>) -> Option<Self> {
    let raw_id = text_of(entry.get("id")).unwrap_or_default();
    let id = match explicit_id.map(str::trim).filter(|id| !id.is_empty()) {
      Some(id) => strip_version(id),
      None => strip_version(identifier_from_url(&raw_id)),
    };
    if id.is_empty() {
      trace!("Dropping entry without identifier: {entry}");
      return None;
    }

    Some(Self {
      id,
      title: text_of(entry.get("title")).map(|t| collapse_newlines(&t)).unwrap_or_default(),
      authors: authors(entry.get("author")),
      summary: text_of(entry.get("summary")).map(|s| collapse_newlines(&s)).unwrap_or_default(),
      link: link(entry.get("link")).unwrap_or(raw_id),
      published: text_of(entry.get("published")).unwrap_or_default(),
      category: category(entry.get("category")),
    })
  }

  /// Parses the publication timestamp, if it is RFC 3339.
  pub fn published_at(&self) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&self.published).ok().map(|dt| dt.with_timezone(&Utc))
  }

  /// Address of the PDF rendition on arXiv.
  pub fn pdf_url(&self) -> String { format!("https://arxiv.org/pdf/{}", self.id) }
}

/// Sorts papers newest first by publication date.
///
/// Papers whose timestamp does not parse sort last, keeping their relative order.
pub fn sort_by_published_desc(papers: &mut [Paper]) {
  papers.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
}

/// Views any value as a sequence.
///
/// Arrays are returned element by element, a missing value or JSON `null` as an empty sequence,
/// and anything else as a one-element sequence.
pub fn as_sequence(value: Option<&Value>) -> Vec<&Value> {
  match value {
    None | Some(Value::Null) => Vec::new(),
    Some(Value::Array(items)) => items.iter().collect(),
    Some(single) => vec![single],
  }
}

/// Removes a trailing `v<digits>` version suffix.
///
/// ```
/// use paperboard::paper::strip_version;
///
/// assert_eq!(strip_version("2305.01234v2"), "2305.01234");
/// assert_eq!(strip_version("2305.01234"), "2305.01234");
/// ```
pub fn strip_version(id: &str) -> String { VERSION_SUFFIX.replace(id, "").into_owned() }

/// Extracts the identifier part of an abstract URL such as `http://arxiv.org/abs/2305.01234v1`.
///
/// Inputs without an `/abs/` segment are returned unchanged.
pub fn identifier_from_url(url: &str) -> &str {
  url.split_once("/abs/").map_or(url, |(_, id)| id).trim()
}

/// Replaces every newline with a single space and trims the ends.
fn collapse_newlines(text: &str) -> String { text.replace('\n', " ").trim().to_string() }

/// Text content of an element, whether it collapsed to a string or kept attributes.
fn text_of(value: Option<&Value>) -> Option<String> {
  match value? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Object(map) => map.get(xml::TEXT_KEY).and_then(Value::as_str).map(String::from),
    _ => None,
  }
}

/// Attribute of an element, looked up with the tree's attribute prefix.
fn attribute<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
  value.get(format!("{}{name}", xml::ATTRIBUTE_PREFIX)).and_then(Value::as_str)
}

/// Author names; a lone author object becomes a one-element list.
fn authors(value: Option<&Value>) -> Vec<String> {
  as_sequence(value)
    .into_iter()
    .filter_map(|author| match author {
      Value::String(name) => Some(name.trim().to_string()),
      other => text_of(other.get("name")).map(|name| name.trim().to_string()),
    })
    .collect()
}

/// Term of the first category.
fn category(value: Option<&Value>) -> String {
  as_sequence(value)
    .first()
    .and_then(|first| attribute(first, "term"))
    .filter(|term| !term.is_empty())
    .unwrap_or(UNKNOWN_CATEGORY)
    .to_string()
}

/// Preferred link for an entry.
///
/// With several links only a `text/html` one is accepted; a lone link object is taken as is.
/// `None` tells the caller to fall back to the raw identifier.
fn link(value: Option<&Value>) -> Option<String> {
  let chosen = match value? {
    Value::Array(links) => links.iter().find(|l| attribute(l, "type") == Some(HTML_LINK_TYPE))?,
    single => single,
  };
  attribute(chosen, "href").filter(|href| !href.is_empty()).map(String::from)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn full_entry() -> Value {
    json!({
      "id": "http://arxiv.org/abs/2305.01234v3",
      "title": "Attention\nIs All You Need ",
      "summary": "\nWe propose\na new architecture.\n",
      "published": "2023-05-02T17:59:59Z",
      "author": [{ "name": "Ashish Vaswani" }, { "name": "Noam Shazeer" }],
      "category": [
        { "@term": "cs.CL", "@scheme": "http://arxiv.org/schemas/atom" },
        { "@term": "cs.LG", "@scheme": "http://arxiv.org/schemas/atom" }
      ],
      "link": [
        { "@href": "http://arxiv.org/abs/2305.01234v3", "@rel": "alternate", "@type": "text/html" },
        {
          "@title": "pdf",
          "@href": "http://arxiv.org/pdf/2305.01234v3",
          "@rel": "related",
          "@type": "application/pdf"
        }
      ]
    })
  }

  #[test]
  fn test_full_entry() {
    let paper = Paper::from_entry(&full_entry(), None).unwrap();
    assert_eq!(paper.id, "2305.01234");
    assert_eq!(paper.title, "Attention Is All You Need");
    assert_eq!(paper.summary, "We propose a new architecture.");
    assert_eq!(paper.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
    assert_eq!(paper.category, "cs.CL");
    assert_eq!(paper.link, "http://arxiv.org/abs/2305.01234v3");
    assert_eq!(paper.published, "2023-05-02T17:59:59Z");
  }

  #[test]
  fn test_single_author_object() {
    let entry = json!({ "id": "http://arxiv.org/abs/1", "author": { "name": "Solo Author" } });
    let paper = Paper::from_entry(&entry, None).unwrap();
    assert_eq!(paper.authors, vec!["Solo Author"]);
  }

  #[test]
  fn test_missing_fields_default() {
    let entry = json!({ "id": "http://arxiv.org/abs/2401.00001v1" });
    let paper = Paper::from_entry(&entry, None).unwrap();
    assert_eq!(paper.title, "");
    assert_eq!(paper.summary, "");
    assert_eq!(paper.published, "");
    assert!(paper.authors.is_empty());
    assert_eq!(paper.category, UNKNOWN_CATEGORY);
    assert_eq!(paper.link, "http://arxiv.org/abs/2401.00001v1");
  }

  #[test]
  fn test_version_stripping() {
    assert_eq!(strip_version("2305.01234v2"), "2305.01234");
    assert_eq!(strip_version("2305.01234v12"), "2305.01234");
    assert_eq!(strip_version("2305.01234"), "2305.01234");
    assert_eq!(strip_version("math.AG/0601001v1"), "math.AG/0601001");
    // Only a trailing suffix counts
    assert_eq!(strip_version("v2.0001"), "v2.0001");
  }

  #[test]
  fn test_explicit_id_wins() {
    let paper = Paper::from_entry(&full_entry(), Some("2305.01234v1")).unwrap();
    assert_eq!(paper.id, "2305.01234");

    let blank = Paper::from_entry(&full_entry(), Some("  ")).unwrap();
    assert_eq!(blank.id, "2305.01234");
  }

  #[test]
  fn test_html_link_preferred_over_pdf() {
    let entry = json!({
      "id": "http://arxiv.org/abs/1",
      "link": [
        { "@href": "http://arxiv.org/pdf/1", "@type": "application/pdf" },
        { "@href": "http://arxiv.org/abs/1-html", "@type": "text/html" }
      ]
    });
    assert_eq!(Paper::from_entry(&entry, None).unwrap().link, "http://arxiv.org/abs/1-html");
  }

  #[test]
  fn test_link_fallbacks() {
    let only_pdf = json!({
      "id": "http://arxiv.org/abs/2",
      "link": [
        { "@href": "http://arxiv.org/pdf/2", "@type": "application/pdf" },
        { "@href": "http://doi.org/x", "@rel": "related" }
      ]
    });
    assert_eq!(Paper::from_entry(&only_pdf, None).unwrap().link, "http://arxiv.org/abs/2");

    let single = json!({
      "id": "http://arxiv.org/abs/3",
      "link": { "@href": "http://arxiv.org/pdf/3", "@type": "application/pdf" }
    });
    assert_eq!(Paper::from_entry(&single, None).unwrap().link, "http://arxiv.org/pdf/3");
  }

  #[test]
  fn test_category_shapes() {
    let single = json!({ "id": "x", "category": { "@term": "math.PR" } });
    assert_eq!(Paper::from_entry(&single, None).unwrap().category, "math.PR");

    let no_term = json!({ "id": "x", "category": [{ "@scheme": "s" }, { "@term": "cs.AI" }] });
    assert_eq!(Paper::from_entry(&no_term, None).unwrap().category, UNKNOWN_CATEGORY);
  }

  #[test]
  fn test_title_with_attributes() {
    let entry = json!({ "id": "x", "title": { "@type": "html", "$text": "Typed\ntitle" } });
    assert_eq!(Paper::from_entry(&entry, None).unwrap().title, "Typed title");
  }

  #[test]
  fn test_unusable_entry() {
    assert!(Paper::from_entry(&json!({ "title": "No id" }), None).is_none());
    assert!(Paper::from_entry(&json!({ "id": "" }), None).is_none());
  }

  #[test]
  fn test_normalization_is_idempotent() {
    let entry = full_entry();
    assert_eq!(Paper::from_entry(&entry, None), Paper::from_entry(&entry, None));
  }

  #[test]
  fn test_as_sequence() {
    let array = json!([1, 2]);
    let single = json!({ "a": 1 });
    assert_eq!(as_sequence(Some(&array)).len(), 2);
    assert_eq!(as_sequence(Some(&single)).len(), 1);
    assert!(as_sequence(None).is_empty());
    assert!(as_sequence(Some(&Value::Null)).is_empty());
  }

  #[test]
  fn test_sort_by_published_desc() {
    let mut papers: Vec<Paper> = ["2023-01-01T00:00:00Z", "not a date", "2024-06-01T00:00:00Z"]
      .iter()
      .enumerate()
      .map(|(i, published)| Paper {
        id:        i.to_string(),
        title:     String::new(),
        authors:   Vec::new(),
        summary:   String::new(),
        link:      String::new(),
        published: published.to_string(),
        category:  UNKNOWN_CATEGORY.to_string(),
      })
      .collect();
    sort_by_published_desc(&mut papers);
    let order: Vec<_> = papers.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(order, vec!["2", "0", "1"]);
  }

  #[test]
  fn test_entry_from_feed_xml() {
    let tree = xml::to_tree(
      r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2301.07041v2</id>
    <published>2023-01-17T18:51:19Z</published>
    <title>Verifiable Fully Homomorphic
  Encryption</title>
    <summary>Fully Homomorphic Encryption (FHE) is seeing
increasing real-world deployment.</summary>
    <author><name>Alexander Viand</name></author>
    <author><name>Christian Knabenhans</name></author>
    <link href="http://arxiv.org/abs/2301.07041v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2301.07041v2" rel="related"
      type="application/pdf"/>
    <category term="cs.CR" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#,
    )
    .unwrap();
    let paper = Paper::from_entry(&tree["feed"]["entry"], None).unwrap();
    assert_eq!(paper.id, "2301.07041");
    assert_eq!(paper.title, "Verifiable Fully Homomorphic   Encryption");
    assert_eq!(paper.authors.len(), 2);
    assert_eq!(paper.category, "cs.CR");
    assert_eq!(paper.link, "http://arxiv.org/abs/2301.07041v2");
    assert_eq!(paper.pdf_url(), "https://arxiv.org/pdf/2301.07041");
  }
}
