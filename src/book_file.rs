use std::path::{Path, PathBuf};

use crate::error::{ContribError, ValidationError};
use crate::model::BookRecord;
use crate::preview::file_name_of;

pub const PDF_MIME: &str = "application/pdf";

/// A PDF accepted for upload: right type, not already on the server.
#[derive(Debug, Clone)]
pub struct BookSelection {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Sniffs the content type from the file's leading bytes.
pub fn detect_mime(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.mime_type())
}

pub fn is_duplicate(file_name: &str, existing: &[BookRecord]) -> bool {
    existing.iter().any(|book| book.filename == file_name)
}

pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// `existing` must be the full, unfiltered book list.
///
/// The `.pdf` extension is required. Content sniffing only rejects files
/// recognised as some other type, so a PDF with a leading offset still passes.
pub async fn select_book_file(
    path: &Path,
    existing: &[BookRecord],
) -> Result<BookSelection, ContribError> {
    if !has_pdf_extension(path) {
        return Err(ValidationError::NotPdf { detected: None }.into());
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ValidationError::Unreadable {
            reason: format!("{}: {err}", path.display()),
        })?;

    if let Some(detected) = detect_mime(&bytes)
        && detected != PDF_MIME
    {
        return Err(ValidationError::NotPdf {
            detected: Some(detected.to_owned()),
        }
        .into());
    }

    let file_name = file_name_of(path);
    if is_duplicate(&file_name, existing) {
        tracing::info!(filename = %file_name, "rejecting duplicate book");
        return Err(ValidationError::DuplicateBook {
            filename: file_name,
        }
        .into());
    }

    Ok(BookSelection {
        path: path.to_path_buf(),
        file_name,
        bytes,
    })
}
