//! In-memory backend for unit tests.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt as _};
use tokio::sync::Semaphore;

use crate::api::{ContributionApi, UploadFile};
use crate::model::{Ack, BookRecord, BookStatus, QaEntry, QaRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListData,
    Submit(QaEntry),
    UploadDataset { file_name: String },
    ListBooks,
    UploadBook { file_name: String, skip_ocr: bool },
    GetBook(String),
    DownloadAll,
}

#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    books: Mutex<Vec<BookRecord>>,
    records: Mutex<Vec<QaRecord>>,
    list_books_calls: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    gate: Option<Arc<Semaphore>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Write calls wait for a permit on the returned semaphore before answering.
    pub fn gated() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let api = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (Arc::new(api), gate)
    }

    pub fn with_books(books: Vec<BookRecord>) -> Arc<Self> {
        let api = Self::default();
        *api.books.lock().unwrap() = books;
        Arc::new(api)
    }

    pub fn set_books(&self, books: Vec<BookRecord>) {
        *self.books.lock().unwrap() = books;
    }

    pub fn set_records(&self, records: Vec<QaRecord>) {
        *self.records.lock().unwrap() = records;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    Call::Submit(_) | Call::UploadDataset { .. } | Call::UploadBook { .. }
                )
            })
            .collect()
    }

    pub fn list_books_calls(&self) -> usize {
        self.list_books_calls.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn write_outcome(&self, ack: Ack) -> anyhow::Result<Ack> {
        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("POST failed (500 Internal Server Error): boom");
        }
        Ok(ack)
    }

    fn read_outcome(&self) -> anyhow::Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("GET failed: connection refused");
        }
        Ok(())
    }
}

pub fn book(id: &str, filename: &str, status: BookStatus) -> BookRecord {
    BookRecord {
        id: id.to_owned(),
        filename: filename.to_owned(),
        status,
        uploaded_at: "2024-05-01 10:22:31.123456".to_owned(),
        kept_lines: None,
        error: None,
        content: None,
    }
}

#[async_trait]
impl ContributionApi for FakeApi {
    async fn list_data(&self) -> anyhow::Result<Vec<QaRecord>> {
        self.record(Call::ListData);
        self.read_outcome()?;
        Ok(self.records.lock().unwrap().clone())
    }

    async fn submit_entry(&self, entry: &QaEntry) -> anyhow::Result<Ack> {
        self.record(Call::Submit(entry.clone()));
        self.write_outcome(Ack {
            message: Some("Submitted successfully".to_owned()),
            id: Some("qa-1".to_owned()),
            book_id: None,
        })
        .await
    }

    async fn upload_dataset(&self, file: UploadFile) -> anyhow::Result<Ack> {
        self.record(Call::UploadDataset {
            file_name: file.file_name,
        });
        self.write_outcome(Ack {
            message: Some("Successfully uploaded 2 pairs".to_owned()),
            ..Ack::default()
        })
        .await
    }

    async fn list_books(&self) -> anyhow::Result<Vec<BookRecord>> {
        self.record(Call::ListBooks);
        self.list_books_calls.fetch_add(1, Ordering::SeqCst);
        self.read_outcome()?;
        Ok(self.books.lock().unwrap().clone())
    }

    async fn upload_book(&self, file: UploadFile, skip_ocr: bool) -> anyhow::Result<Ack> {
        self.record(Call::UploadBook {
            file_name: file.file_name.clone(),
            skip_ocr,
        });
        let ack = self
            .write_outcome(Ack {
                message: Some("Book uploaded and processing started".to_owned()),
                book_id: Some(format!("id-{}", file.file_name)),
                ..Ack::default()
            })
            .await?;
        let status = if skip_ocr {
            BookStatus::Archived
        } else {
            BookStatus::Processing
        };
        self.books.lock().unwrap().insert(
            0,
            book(&format!("id-{}", file.file_name), &file.file_name, status),
        );
        Ok(ack)
    }

    async fn get_book(&self, id: &str) -> anyhow::Result<BookRecord> {
        self.record(Call::GetBook(id.to_owned()));
        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        self.read_outcome()?;
        let found = self
            .books
            .lock()
            .unwrap()
            .iter()
            .find(|book| book.id == id)
            .cloned();
        let mut book = found.ok_or_else(|| anyhow::anyhow!("GET failed (404): Book not found"))?;
        if book.status == BookStatus::Completed && book.content.is_none() {
            book.content = Some(format!("content of {}", book.filename));
        }
        Ok(book)
    }

    async fn download_all_books(
        &self,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> anyhow::Result<u64> {
        self.record(Call::DownloadAll);
        self.read_outcome()?;
        let body = b"\n\n--- Book: story.pdf ---\n\ntext";
        sink.write_all(body).await?;
        sink.flush().await?;
        Ok(body.len() as u64)
    }
}
