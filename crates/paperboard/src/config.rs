//! Configuration for a [`Paperboard`](crate::Paperboard) instance.
//!
//! Settings are read from a TOML file, by default `paperboard/config.toml` under the platform
//! configuration directory. Every field is optional; missing ones take the values of
//! [`Config::default`]. A complete file looks like:
//!
//! ```toml
//! database_path = "/home/alice/.local/share/paperboard/paperboard.db"
//! user_id = "alice"
//! arxiv_api_url = "https://export.arxiv.org/api/query"
//! news_archive_url = "https://buttondown.com/ainews/archive/"
//! listing_url = "https://huggingface.co/papers"
//! digest_page_size = 20
//! production = false
//!
//! [retry]
//! max_retries = 3
//! initial_backoff = 1000
//! max_backoff = 30000
//! ```

use super::*;
use crate::{arxiv::DEFAULT_API_URL, fetch::RetryPolicy, store::Store};

/// Default newsletter archive page.
pub const DEFAULT_NEWS_ARCHIVE_URL: &str = "https://buttondown.com/ainews/archive/";

/// Default daily paper listing page.
pub const DEFAULT_LISTING_URL: &str = "https://huggingface.co/papers";

/// Default number of papers per digest page.
pub const DEFAULT_DIGEST_PAGE_SIZE: usize = 20;

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Location of the store file
  pub database_path:    PathBuf,
  /// User the command line acts as
  pub user_id:          Option<String>,
  /// arXiv query endpoint
  pub arxiv_api_url:    String,
  /// Newsletter archive page
  pub news_archive_url: String,
  /// Daily paper listing page
  pub listing_url:      String,
  /// Papers per digest page
  pub digest_page_size: usize,
  /// Whether session cookies are marked `Secure`
  pub production:       bool,
  /// Retry schedule for upstream calls
  pub retry:            RetryPolicy,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_path:    Store::default_path(),
      user_id:          None,
      arxiv_api_url:    DEFAULT_API_URL.to_string(),
      news_archive_url: DEFAULT_NEWS_ARCHIVE_URL.to_string(),
      listing_url:      DEFAULT_LISTING_URL.to_string(),
      digest_page_size: DEFAULT_DIGEST_PAGE_SIZE,
      production:       false,
      retry:            RetryPolicy::default(),
    }
  }
}

impl Config {
  /// Default location of the configuration file.
  ///
  /// - On Unix: `~/.config/paperboard/config.toml`
  /// - On macOS: `~/Library/Application Support/paperboard/config.toml`
  /// - On Windows: `%APPDATA%\paperboard\config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("paperboard").join("config.toml")
  }

  /// Parses a configuration from TOML text.
  pub fn from_toml_str(toml_str: &str) -> Result<Self> {
    let config: Self = toml::from_str(toml_str)?;
    config.validate()?;
    Ok(config)
  }

  /// Reads a configuration file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content)
  }

  /// Reads a configuration file, falling back to defaults when the file does not exist.
  pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if path.exists() {
      Self::load(path)
    } else {
      debug!("No configuration at {}, using defaults", path.display());
      Ok(Self::default())
    }
  }

  /// Writes the configuration, creating parent directories as needed.
  pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(self)?)?;
    debug!("Saved configuration to {}", path.display());
    Ok(())
  }

  /// Checks values that deserialize fine but cannot be used.
  pub fn validate(&self) -> Result<()> {
    if self.digest_page_size == 0 {
      return Err(PaperboardError::Config("digest_page_size must be at least 1".into()));
    }
    for url in [&self.arxiv_api_url, &self.news_archive_url, &self.listing_url] {
      url::Url::parse(url)?;
    }
    Ok(())
  }

  /// Sets the store location.
  pub fn with_database_path(mut self, path: impl AsRef<Path>) -> Self {
    self.database_path = path.as_ref().to_path_buf();
    self
  }

  /// Sets the user the command line acts as.
  pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
    self.user_id = Some(user_id.into());
    self
  }

  /// Sets the arXiv query endpoint.
  pub fn with_arxiv_api_url(mut self, url: impl Into<String>) -> Self {
    self.arxiv_api_url = url.into();
    self
  }

  /// Sets the newsletter archive page.
  pub fn with_news_archive_url(mut self, url: impl Into<String>) -> Self {
    self.news_archive_url = url.into();
    self
  }

  /// Sets the paper listing page.
  pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
    self.listing_url = url.into();
    self
  }

  /// Sets the digest page size.
  pub fn with_digest_page_size(mut self, size: usize) -> Self {
    self.digest_page_size = size;
    self
  }

  /// Marks the deployment as production.
  pub fn with_production(mut self, production: bool) -> Self {
    self.production = production;
    self
  }

  /// Sets the retry schedule.
  pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
    self.retry = retry;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.arxiv_api_url, "https://export.arxiv.org/api/query");
    assert_eq!(config.digest_page_size, 20);
    assert_eq!(config.retry.max_retries, 3);
    assert!(!config.production);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_partial_file() {
    let config = Config::from_toml_str(
      r#"
        user_id = "alice"
        production = true

        [retry]
        max_retries = 1
      "#,
    )
    .unwrap();
    assert_eq!(config.user_id.as_deref(), Some("alice"));
    assert!(config.production);
    assert_eq!(config.retry.max_retries, 1);
    assert_eq!(config.retry.initial_backoff, Duration::from_millis(1000));
    assert_eq!(config.listing_url, DEFAULT_LISTING_URL);
  }

  #[test]
  fn test_invalid_values() {
    assert!(matches!(
      Config::from_toml_str("digest_page_size = 0"),
      Err(PaperboardError::Config(_))
    ));
    assert!(matches!(
      Config::from_toml_str("listing_url = \"not a url\""),
      Err(PaperboardError::InvalidUrl(_))
    ));
    assert!(matches!(
      Config::from_toml_str("production = \"yes\""),
      Err(PaperboardError::TomlDe(_))
    ));
  }

  #[traced_test]
  #[test]
  fn test_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let config = Config::default()
      .with_database_path(dir.path().join("board.db"))
      .with_user("bob")
      .with_digest_page_size(5)
      .with_retry(RetryPolicy::immediate(0));

    config.save(&path).unwrap();
    assert_eq!(Config::load(&path).unwrap(), config);
    assert_eq!(
      Config::load_or_default(dir.path().join("missing.toml")).unwrap(),
      Config::default()
    );
  }
}
