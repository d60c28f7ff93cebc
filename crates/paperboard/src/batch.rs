//! Concurrent resolution of many identifiers.
//!
//! Views such as the reading list or a digest page only store paper identifiers; the papers
//! themselves are looked up again on every request. [`resolve_all`] issues one lookup per
//! identifier, all at once, and keeps whatever succeeded. A failed lookup is logged and dropped
//! so that one bad identifier never fails the whole view.
//!
//! Results come back in no particular order; callers sort them for presentation.
//!
//! When the consumer of a batch may go away before it completes (a user navigating elsewhere),
//! [`resolve_abortable`] returns a [`BatchHandle`] alongside the future. Aborting through the
//! handle makes the future finish with `None` instead of an error.

use std::future::Future;

use futures::future::{self, AbortHandle};

use super::*;

/// Resolves every identifier with `lookup`, concurrently, dropping failures.
///
/// # Examples
///
/// ```
/// use paperboard::{batch::resolve_all, error::PaperboardError};
///
/// # tokio_test::block_on(async {
/// let lengths = resolve_all(["a", "bb", ""], |id| async move {
///   if id.is_empty() { Err(PaperboardError::NotFound) } else { Ok(id.len()) }
/// })
/// .await;
/// assert_eq!(lengths.len(), 2);
/// # });
/// ```
pub async fn resolve_all<I, S, T, F, Fut>(ids: I, lookup: F) -> Vec<T>
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
  F: Fn(String) -> Fut,
  Fut: Future<Output = Result<T>>, {
  let pending: Vec<_> = ids
    .into_iter()
    .map(Into::into)
    .map(|id: String| {
      let lookup = lookup(id.clone());
      async move { (id, lookup.await) }
    })
    .collect();
  let requested = pending.len();

  let resolved: Vec<T> = future::join_all(pending)
    .await
    .into_iter()
    .filter_map(|(id, result)| match result {
      Ok(value) => Some(value),
      Err(e) => {
        warn!("Dropping {id} from batch: {e}");
        None
      },
    })
    .collect();

  debug!("Resolved {}/{requested} identifiers", resolved.len());
  resolved
}

/// Cancels an in-flight batch started with [`resolve_abortable`].
#[derive(Debug, Clone)]
pub struct BatchHandle(AbortHandle);

impl BatchHandle {
  /// Stops the batch. Its future resolves to `None` at its next poll.
  pub fn abort(&self) { self.0.abort() }

  /// Whether [`BatchHandle::abort`] has been called.
  pub fn is_aborted(&self) -> bool { self.0.is_aborted() }
}

/// Like [`resolve_all`], but cancellable through the returned handle.
pub fn resolve_abortable<I, S, T, F, Fut>(
  ids: I,
  lookup: F,
) -> (impl Future<Output = Option<Vec<T>>>, BatchHandle)
where
  I: IntoIterator<Item = S>,
  S: Into<String>,
  F: Fn(String) -> Fut,
  Fut: Future<Output = Result<T>>, {
  let (batch, handle) = future::abortable(resolve_all(ids, lookup));
  let batch = async move {
    match batch.await {
      Ok(values) => Some(values),
      Err(future::Aborted) => {
        debug!("Batch aborted");
        None
      },
    }
  };
  (batch, BatchHandle(handle))
}
