use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::{ContributionApi, UploadFile};
use crate::book_file::{BookSelection, PDF_MIME};
use crate::error::{ContribError, ValidationError};
use crate::model::{Ack, ManualEntryForm};
use crate::preview::UploadSelection;

/// Per-form "request outstanding" flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl InFlight {
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn try_begin(&self) -> Option<InFlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Clears the flag on every exit path, including panics and dropped futures.
#[derive(Debug)]
pub struct InFlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Sends validated contributions to the backend.
///
/// The QA form (manual and bulk) and the book form each have their own
/// [`InFlight`] flag; a second request on a busy form fails with
/// [`ContribError::Busy`] without touching the network.
#[derive(Clone)]
pub struct SubmissionClient {
    api: Arc<dyn ContributionApi>,
    qa_form: InFlight,
    book_form: InFlight,
}

impl SubmissionClient {
    pub fn new(api: Arc<dyn ContributionApi>) -> Self {
        Self {
            api,
            qa_form: InFlight::default(),
            book_form: InFlight::default(),
        }
    }

    pub fn api(&self) -> &Arc<dyn ContributionApi> {
        &self.api
    }

    pub fn qa_busy(&self) -> bool {
        self.qa_form.is_busy()
    }

    pub fn book_busy(&self) -> bool {
        self.book_form.is_busy()
    }

    pub async fn submit_manual_entry(&self, form: &ManualEntryForm) -> Result<Ack, ContribError> {
        if form.instruction.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "Instruction",
            }
            .into());
        }
        if form.response.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "Response" }.into());
        }

        let _guard = self.qa_form.try_begin().ok_or(ContribError::Busy)?;
        let entry = form.to_entry();
        let ack = self.api.submit_entry(&entry).await?;
        tracing::info!(id = ?ack.id, "manual entry accepted");
        Ok(ack)
    }

    pub async fn submit_bulk_file(
        &self,
        selection: Option<&UploadSelection>,
    ) -> Result<Ack, ContribError> {
        let selection = selection.ok_or(ValidationError::NoSelection)?;

        let _guard = self.qa_form.try_begin().ok_or(ContribError::Busy)?;
        let file = UploadFile {
            file_name: selection.file_name.clone(),
            mime: selection.format.mime(),
            bytes: selection.bytes.clone(),
        };
        let ack = self.api.upload_dataset(file).await?;
        tracing::info!(
            filename = %selection.file_name,
            message = ?ack.message,
            "bulk file accepted"
        );
        Ok(ack)
    }

    /// `skip_ocr` stores the book without running server-side text extraction.
    pub async fn upload_book(
        &self,
        selection: Option<&BookSelection>,
        skip_ocr: bool,
    ) -> Result<Ack, ContribError> {
        let selection = selection.ok_or(ValidationError::NoSelection)?;

        let _guard = self.book_form.try_begin().ok_or(ContribError::Busy)?;
        let file = UploadFile {
            file_name: selection.file_name.clone(),
            mime: PDF_MIME,
            bytes: selection.bytes.clone(),
        };
        let ack = self.api.upload_book(file, skip_ocr).await?;
        tracing::info!(
            filename = %selection.file_name,
            book_id = ?ack.book_id,
            skip_ocr,
            "book accepted"
        );
        Ok(ack)
    }
}
