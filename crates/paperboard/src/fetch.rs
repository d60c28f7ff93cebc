//! Upstream HTTP access with bounded exponential backoff.
//!
//! Every call to an upstream service (the arXiv query API, the newsletter archive, the paper
//! listing page) goes through a [`Fetcher`]. A call fails when the transport errors or when the
//! response status is outside the 2xx class. Failed calls are retried according to a
//! [`RetryPolicy`]:
//!
//! - attempt `n` (starting at zero) that fails waits `initial_backoff * 2^n`, capped at
//!   `max_backoff`, then tries again
//! - once `n` reaches `max_retries` the failure is returned to the caller
//!
//! so a single logical call makes at most `max_retries + 1` network attempts.
//!
//! # Examples
//!
//! ```no_run
//! use paperboard::fetch::{Fetcher, RetryPolicy};
//!
//! # async fn example() -> paperboard::error::Result<()> {
//! let fetcher = Fetcher::new(RetryPolicy::default());
//! let xml = fetcher
//!   .get_text("https://export.arxiv.org/api/query?id_list=2301.07041", &[(
//!     "Accept",
//!     "application/xml",
//!   )])
//!   .await?;
//! println!("{} bytes", xml.len());
//! # Ok(())
//! # }
//! ```

use std::future::Future;

use super::*;

/// Retry schedule applied to upstream calls.
///
/// Durations are (de)serialized as integer milliseconds so the policy can live in the TOML
/// configuration file:
///
/// ```toml
/// [retry]
/// max_retries = 3
/// initial_backoff = 1000
/// max_backoff = 30000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
  /// Number of retries after the first attempt
  pub max_retries:     u32,
  /// Wait before the first retry
  #[serde(with = "millis")]
  pub initial_backoff: Duration,
  /// Upper bound for any single wait
  #[serde(with = "millis")]
  pub max_backoff:     Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_retries:     3,
      initial_backoff: Duration::from_millis(1000),
      max_backoff:     Duration::from_secs(30),
    }
  }
}

impl RetryPolicy {
  /// A policy that retries `max_retries` times without waiting. Mostly useful for tests.
  pub fn immediate(max_retries: u32) -> Self {
    Self { max_retries, initial_backoff: Duration::ZERO, max_backoff: Duration::ZERO }
  }

  /// Total number of network attempts a single call may make.
  pub fn max_attempts(&self) -> u32 { self.max_retries.saturating_add(1) }

  /// The wait after failed attempt number `attempt` (zero based).
  pub fn backoff(&self, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
  }

  /// Runs `op` until it succeeds, fails terminally, or the retry budget is spent.
  ///
  /// `op` receives the zero-based attempt number. Errors for which
  /// [`PaperboardError::is_transient`] is false are returned immediately.
  pub async fn retry<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
  where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>, {
    let mut attempt = 0;
    loop {
      match op(attempt).await {
        Ok(value) => return Ok(value),
        Err(e) if !e.is_transient() => return Err(e),
        Err(e) if attempt >= self.max_retries => {
          warn!("Giving up on {label} after {} attempts: {e}", attempt + 1);
          return Err(e);
        },
        Err(e) => {
          let backoff = self.backoff(attempt);
          warn!(
            "Error fetching {label}, attempt {}/{}. Retrying in {}ms: {e}",
            attempt + 1,
            self.max_retries,
            backoff.as_millis()
          );
          tokio::time::sleep(backoff).await;
          attempt += 1;
        },
      }
    }
  }
}

/// HTTP client shared by every upstream call.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Fetcher {
  /// Internal web client used to connect to upstream services.
  client: reqwest::Client,
  /// Schedule applied to failed calls.
  policy: RetryPolicy,
}

impl Fetcher {
  /// Creates a fetcher with a fresh client.
  pub fn new(policy: RetryPolicy) -> Self { Self::with_client(reqwest::Client::new(), policy) }

  /// Creates a fetcher around an existing client.
  pub fn with_client(client: reqwest::Client, policy: RetryPolicy) -> Self {
    Self { client, policy }
  }

  /// The retry policy in use.
  pub fn policy(&self) -> &RetryPolicy { &self.policy }

  /// GETs `url` and returns the body of the first 2xx response.
  pub async fn get_text(&self, url: &str, headers: &[(&str, &str)]) -> Result<String> {
    self
      .policy
      .retry(url, |attempt| async move {
        trace!("GET {url} (attempt {attempt})");
        let mut request = self.client.get(url);
        for (key, value) in headers {
          request = request.header(*key, *value);
        }
        read_success(url, request.send().await?).await
      })
      .await
  }

  /// POSTs `body` as JSON to `url` and returns the body of the first 2xx response.
  pub async fn post_json<B>(&self, url: &str, body: &B) -> Result<String>
  where B: Serialize + ?Sized {
    self
      .policy
      .retry(url, |attempt| async move {
        trace!("POST {url} (attempt {attempt})");
        read_success(url, self.client.post(url).json(body).send().await?).await
      })
      .await
  }
}

/// Turns a response into its body text, treating statuses outside 2xx as failures.
async fn read_success(url: &str, response: reqwest::Response) -> Result<String> {
  let status = response.status();
  if !status.is_success() {
    return Err(PaperboardError::HttpStatus { status: status.as_u16(), url: url.to_string() });
  }
  let text = response.text().await?;
  debug!("Received {} bytes from {url}", text.len());
  Ok(text)
}

/// Serde adapter storing a [`Duration`] as whole milliseconds.
mod millis {
  use std::time::Duration;

  use serde::{Deserialize, Deserializer, Serializer};

  /// Writes the duration as milliseconds.
  pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
  }

  /// Reads milliseconds into a duration.
  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
  }
}
