use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ContributionApi;
use crate::book_file::select_book_file;
use crate::config::BOOK_POLL_INTERVAL;
use crate::detail::BookDetail;
use crate::error::ContribError;
use crate::model::{Ack, BookRecord, StatusBanner};
use crate::poller::{BookList, BookPoller};
use crate::preview::select_dataset_file;
use crate::submission::SubmissionClient;
use crate::view::{ContributeView, Mode, QaTab};

pub const MANUAL_SUCCESS: &str = "Successfully submitted entry!";
pub const MANUAL_FAILURE: &str = "Failed to submit. Please try again.";
pub const BULK_SUCCESS_FALLBACK: &str = "File uploaded successfully.";
pub const BULK_FAILURE: &str = "Failed to upload file. Please check the format.";
pub const BOOK_SUCCESS: &str = "Book uploaded successfully! Processing started.";
pub const BOOK_FAILURE: &str = "Failed to upload book.";

/// One open contribute page: view state, forms, and the book list it keeps fresh.
///
/// The book poller runs exactly while the session is in [`Mode::Books`].
pub struct ContributeSession {
    view: ContributeView,
    client: SubmissionClient,
    books: Arc<BookList>,
    poller: Option<BookPoller>,
    poll_interval: Duration,
}

impl ContributeSession {
    pub fn new(api: Arc<dyn ContributionApi>) -> Self {
        Self::with_poll_interval(api, BOOK_POLL_INTERVAL)
    }

    pub fn with_poll_interval(api: Arc<dyn ContributionApi>, poll_interval: Duration) -> Self {
        Self {
            view: ContributeView::default(),
            books: Arc::new(BookList::new(Arc::clone(&api))),
            client: SubmissionClient::new(api),
            poller: None,
            poll_interval,
        }
    }

    pub fn view(&self) -> &ContributeView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ContributeView {
        &mut self.view
    }

    pub fn banner(&self) -> Option<&StatusBanner> {
        self.view.banner()
    }

    pub fn client(&self) -> &SubmissionClient {
        &self.client
    }

    pub fn books(&self) -> &Arc<BookList> {
        &self.books
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(BookPoller::is_running)
    }

    /// Books currently displayed: the last snapshot, filtered by the search box.
    pub fn visible_books(&self) -> Vec<BookRecord> {
        self.books.search(&self.view.book_search)
    }

    /// Entering books starts polling; leaving it cancels the poller.
    pub fn switch_mode(&mut self, mode: Mode) {
        let previous = self.view.switch_mode(mode);
        if previous == mode {
            return;
        }
        match mode {
            Mode::Books => {
                self.poller = Some(BookPoller::start(
                    Arc::clone(&self.books),
                    self.poll_interval,
                ));
            }
            Mode::Qa => {
                // Dropping cancels the task before any further fetch.
                self.poller = None;
            }
        }
    }

    pub fn switch_tab(&mut self, tab: QaTab) {
        self.view.switch_tab(tab);
    }

    pub async fn submit_manual(&mut self) -> Option<&StatusBanner> {
        self.view.clear_banner();
        let result = self.client.submit_manual_entry(&self.view.form).await;
        let banner = match result {
            Ok(_) => {
                self.view.form.clear();
                Some(StatusBanner::success(MANUAL_SUCCESS))
            }
            Err(err) => banner_for_error(err, MANUAL_FAILURE),
        };
        self.apply(banner)
    }

    /// Parses a local preview. On failure the selection is dropped.
    pub async fn select_dataset(&mut self, path: &Path) -> Option<&StatusBanner> {
        self.view.clear_banner();
        self.view.dataset = None;
        match select_dataset_file(path).await {
            Ok(selection) => {
                self.view.dataset = Some(selection);
                None
            }
            Err(err) => {
                let banner = banner_for_error(err, BULK_FAILURE);
                self.apply(banner)
            }
        }
    }

    pub async fn submit_bulk(&mut self) -> Option<&StatusBanner> {
        self.view.clear_banner();
        let result = self.client.submit_bulk_file(self.view.dataset.as_ref()).await;
        let banner = match result {
            Ok(ack) => {
                self.view.dataset = None;
                let message = ack
                    .message
                    .unwrap_or_else(|| BULK_SUCCESS_FALLBACK.to_owned());
                Some(StatusBanner::success(message))
            }
            Err(err) => banner_for_error(err, BULK_FAILURE),
        };
        self.apply(banner)
    }

    /// Validates a PDF against the full (unfiltered) book list.
    pub async fn select_book(&mut self, path: &Path) -> Option<&StatusBanner> {
        let existing = self.books.current();
        match select_book_file(path, &existing).await {
            Ok(selection) => {
                self.view.clear_banner();
                self.view.book = Some(selection);
                None
            }
            Err(err) => {
                self.view.book = None;
                let banner = banner_for_error(err, BOOK_FAILURE);
                self.apply(banner)
            }
        }
    }

    /// Uploads the selected PDF, then refreshes the list whatever the outcome.
    pub async fn upload_book(&mut self) -> Option<&StatusBanner> {
        self.view.clear_banner();
        let result: Result<Ack, ContribError> = self
            .client
            .upload_book(self.view.book.as_ref(), self.view.skip_ocr)
            .await;
        let attempted = !matches!(&result, Err(err) if err.is_local());
        let banner = match result {
            Ok(_) => {
                self.view.book = None;
                Some(StatusBanner::success(BOOK_SUCCESS))
            }
            Err(err) => banner_for_error(err, BOOK_FAILURE),
        };
        if attempted {
            self.books.refresh().await;
        }
        self.apply(banner)
    }

    /// Opens the content view for `id` in its loading state. Nothing is fetched yet.
    pub fn open_book(&mut self, id: &str) -> &BookDetail {
        let summary = self
            .books
            .current()
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .unwrap_or_else(|| placeholder(id));
        self.view.detail.insert(BookDetail::loading(summary))
    }

    /// Fetches content for a loading detail view. Settled or closed views are left alone.
    pub async fn resolve_detail(&mut self) -> Option<&BookDetail> {
        let pending = match &self.view.detail {
            Some(detail) if detail.is_loading() => detail.clone(),
            _ => return self.view.detail.as_ref(),
        };
        let settled = pending.resolve(self.client.api().as_ref()).await;
        Some(self.view.detail.insert(settled))
    }

    pub fn close_book(&mut self) {
        self.view.detail = None;
    }

    /// Stops polling and waits for the task to exit.
    pub async fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
    }

    fn apply(&mut self, banner: Option<StatusBanner>) -> Option<&StatusBanner> {
        if let Some(banner) = banner {
            self.view.set_banner(banner);
        }
        self.view.banner()
    }
}

/// `None` for [`ContribError::Busy`]: the control is disabled, nothing to report.
fn banner_for_error(err: ContribError, transport_message: &str) -> Option<StatusBanner> {
    match err {
        ContribError::Busy => {
            tracing::debug!("ignoring action while a request is in flight");
            None
        }
        ContribError::Transport(err) => {
            tracing::warn!(error = %format!("{err:#}"), "request failed");
            Some(StatusBanner::error(transport_message))
        }
        ContribError::Parse(err) => {
            tracing::info!(reason = err.reason(), "preview parse failed");
            Some(StatusBanner::error(err.to_string()))
        }
        ContribError::Validation(err) => Some(StatusBanner::error(err.to_string())),
    }
}

fn placeholder(id: &str) -> BookRecord {
    BookRecord {
        id: id.to_owned(),
        filename: id.to_owned(),
        status: crate::model::BookStatus::Unknown,
        uploaded_at: String::new(),
        kept_lines: None,
        error: None,
        content: None,
    }
}
