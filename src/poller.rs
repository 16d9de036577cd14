use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::ContributionApi;
use crate::model::BookRecord;

/// Last successfully fetched book list.
///
/// Every refresh replaces the snapshot wholesale; a failed refresh keeps the
/// previous one. Front-ends observe changes through [`BookList::subscribe`].
pub struct BookList {
    api: Arc<dyn ContributionApi>,
    snapshot: watch::Sender<Arc<Vec<BookRecord>>>,
}

impl BookList {
    pub fn new(api: Arc<dyn ContributionApi>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { api, snapshot }
    }

    pub fn current(&self) -> Arc<Vec<BookRecord>> {
        Arc::clone(&self.snapshot.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<BookRecord>>> {
        self.snapshot.subscribe()
    }

    /// Returns whether the fetch succeeded. Failures are logged only.
    ///
    /// Subscribers are notified only when the fetched list differs from the snapshot.
    pub async fn refresh(&self) -> bool {
        match self.api.list_books().await {
            Ok(books) => {
                let changed = self.snapshot.send_if_modified(|current| {
                    if **current == books {
                        return false;
                    }
                    *current = Arc::new(books);
                    true
                });
                tracing::debug!(changed, "book list refreshed");
                true
            }
            Err(err) => {
                tracing::warn!(
                    error = %format!("{err:#}"),
                    "book list refresh failed; keeping previous list"
                );
                false
            }
        }
    }

    /// Case-insensitive filename filter for display.
    pub fn search(&self, query: &str) -> Vec<BookRecord> {
        filter_books(&self.current(), query)
    }
}

pub fn filter_books(books: &[BookRecord], query: &str) -> Vec<BookRecord> {
    let needle = query.trim().to_lowercase();
    books
        .iter()
        .filter(|book| needle.is_empty() || book.filename.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Background refresh of a [`BookList`]: one fetch immediately, then one per
/// `interval` until stopped. Dropping the poller also stops it.
pub struct BookPoller {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl BookPoller {
    /// Must be called from within a tokio runtime.
    pub fn start(list: Arc<BookList>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::debug!(?interval, "book polling started");
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // A fetch still running at stop time is abandoned, never applied.
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = list.refresh() => {}
                }
            }
            tracing::debug!("book polling stopped");
        });
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancels and waits for the polling task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(err) = handle.await
        {
            tracing::warn!(error = %err, "book polling task ended abnormally");
        }
    }
}

impl Drop for BookPoller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
