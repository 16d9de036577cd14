use std::fmt::Write as _;

use crate::detail::BookDetail;
use crate::model::{BannerKind, BookRecord, BookStatus, QaRecord, StatusBanner};
use crate::preview::Preview;

pub fn banner(banner: &StatusBanner) -> String {
    match banner.kind {
        BannerKind::Success => format!("✓ {}", banner.message),
        BannerKind::Error => format!("✗ {}", banner.message),
    }
}

pub fn book_status(book: &BookRecord) -> String {
    match book.status {
        BookStatus::Processing => "Processing...".to_owned(),
        BookStatus::Completed => match book.kept_lines {
            Some(lines) => format!("{lines} lines extracted"),
            None => "Completed".to_owned(),
        },
        BookStatus::Failed => format!("Failed: {}", book.error.as_deref().unwrap_or("unknown error")),
        BookStatus::Archived => "ARCHIVED".to_owned(),
        BookStatus::Unknown => "Unknown".to_owned(),
    }
}

fn uploaded_label(book: &BookRecord) -> String {
    match book.uploaded_at() {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None if book.uploaded_at.is_empty() => "-".to_owned(),
        None => book.uploaded_at.clone(),
    }
}

pub fn book_list(books: &[BookRecord]) -> String {
    if books.is_empty() {
        return "No books uploaded yet.\n".to_owned();
    }
    let mut out = String::new();
    for book in books {
        let _ = writeln!(
            out,
            "{}  {}  [{}]  uploaded {}",
            book.id,
            book.filename,
            book_status(book),
            uploaded_label(book)
        );
    }
    out
}

pub fn book_detail(detail: &BookDetail) -> String {
    let book = detail.summary();
    let mut out = format!("{} ({})\n", book.filename, book_status(book));
    match detail {
        BookDetail::Loading(_) => out.push_str("Loading content...\n"),
        BookDetail::Unavailable { .. } => out.push_str("No content available.\n"),
        BookDetail::Ready(_) => match detail.content() {
            Some(text) => {
                out.push('\n');
                out.push_str(text);
                if !text.ends_with('\n') {
                    out.push('\n');
                }
            }
            None => out.push_str("No content available.\n"),
        },
    }
    out
}

pub fn preview(file_name: &str, preview: &Preview) -> String {
    let mut out = format!(
        "Preview of {file_name}: showing {} of {} record(s)\n",
        preview.records.len(),
        preview.total
    );
    for (idx, record) in preview.records.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {record}", idx + 1);
    }
    out
}

pub fn records<'a>(records: impl IntoIterator<Item = &'a QaRecord>) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "[{}] source: {}", record.id, record.source);
        let _ = writeln!(out, "  Instruction (Tulu): {}", record.instruction);
        let _ = writeln!(out, "  Response (Tulu):    {}", record.response);
        if let Some(translation) = &record.translation {
            let _ = writeln!(out, "  Instruction (EN):   {}", translation.instruction);
            let _ = writeln!(out, "  Response (EN):      {}", translation.response);
        }
    }
    if out.is_empty() {
        out.push_str("No data found.\n");
    }
    out
}
