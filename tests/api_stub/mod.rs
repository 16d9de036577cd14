use std::io::Read as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is json")
    }
}

#[derive(Default)]
struct StubState {
    books: Mutex<Vec<Value>>,
    records: Mutex<Vec<Value>>,
    requests: Mutex<Vec<Recorded>>,
    fail_writes: AtomicBool,
    fail_download: AtomicBool,
}

/// Minimal stand-in for the collection backend.
pub struct ApiStub {
    pub base_url: String,
    state: Arc<StubState>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

#[allow(dead_code)]
impl ApiStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start api stub server");
        let base_url = format!("http://{}", server.server_addr());
        let state = Arc::new(StubState::default());
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                loop {
                    if shutdown_rx.try_recv().is_ok() {
                        break;
                    }
                    let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                        Ok(Some(req)) => req,
                        Ok(None) => continue,
                        Err(_) => break,
                    };

                    let mut body = Vec::new();
                    let _ = request.as_reader().read_to_end(&mut body);
                    let content_type = request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Content-Type"))
                        .map(|h| h.value.as_str().to_owned());
                    let recorded = Recorded {
                        method: request.method().to_string(),
                        url: request.url().to_owned(),
                        content_type,
                        body,
                    };
                    state.requests.lock().unwrap().push(recorded.clone());

                    let (status, body) = route(&state, &recorded);
                    if recorded.url == DOWNLOAD_PATH && status == 200 {
                        // No declared length: tiny_http sends it chunked.
                        let header = tiny_http::Header::from_bytes(
                            &b"Content-Type"[..],
                            &b"text/plain; charset=utf-8"[..],
                        )
                        .expect("build header");
                        let response = tiny_http::Response::new(
                            tiny_http::StatusCode(status),
                            vec![header],
                            std::io::Cursor::new(body.into_bytes()),
                            None,
                            None,
                        );
                        let _ = request.respond(response);
                        continue;
                    }

                    let header = tiny_http::Header::from_bytes(
                        &b"Content-Type"[..],
                        &b"application/json"[..],
                    )
                    .expect("build header");
                    let response = tiny_http::Response::from_string(body)
                        .with_status_code(status)
                        .with_header(header);
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            base_url,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn add_book(&self, id: &str, filename: &str, status: &str) {
        let kept_lines = if status == "completed" {
            json!(12)
        } else {
            Value::Null
        };
        self.state.books.lock().unwrap().push(json!({
            "_id": id,
            "filename": filename,
            "status": status,
            "uploaded_at": "2024-05-01 10:22:31.123456",
            "kept_lines": kept_lines,
        }));
    }

    pub fn add_book_with_content(&self, id: &str, filename: &str, content: &str) {
        self.add_book(id, filename, "completed");
        if let Some(book) = self.state.books.lock().unwrap().last_mut() {
            book["content"] = Value::String(content.to_owned());
        }
    }

    pub fn add_record(&self, record: Value) {
        self.state.records.lock().unwrap().push(record);
    }

    pub fn fail_writes(&self) {
        self.state.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_download(&self) {
        self.state.fail_download.store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|req| req.method == "POST")
            .collect()
    }
}

impl Drop for ApiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

const DOWNLOAD_PATH: &str = "/api/books/download/all";

fn book_content(book: &Value) -> String {
    match book["content"].as_str() {
        Some(content) => content.to_owned(),
        None => format!("content of {}", book["filename"].as_str().unwrap_or("")),
    }
}

fn route(state: &StubState, req: &Recorded) -> (u16, String) {
    let path = req.url.split('?').next().unwrap_or(&req.url);
    let query = req.url.split_once('?').map(|(_, q)| q).unwrap_or("");

    if req.method == "POST" && state.fail_writes.load(Ordering::SeqCst) {
        return (500, json!({ "detail": "database unavailable" }).to_string());
    }

    match (req.method.as_str(), path) {
        ("GET", "/api/data") => {
            let records = state.records.lock().unwrap().clone();
            (200, Value::Array(records).to_string())
        }
        ("POST", "/api/submit") => (
            200,
            json!({ "id": "qa-1", "message": "Submitted successfully" }).to_string(),
        ),
        ("POST", "/api/upload") => (
            200,
            json!({ "message": "Successfully uploaded 2 pairs" }).to_string(),
        ),
        ("GET", "/api/books") => {
            let books = state
                .books
                .lock()
                .unwrap()
                .iter()
                .map(|book| {
                    let mut book = book.clone();
                    if let Some(obj) = book.as_object_mut() {
                        obj.remove("content");
                    }
                    book
                })
                .collect::<Vec<_>>();
            (200, Value::Array(books).to_string())
        }
        ("POST", "/api/books/upload") => {
            let status = if query.contains("skip_ocr=true") {
                "archived"
            } else {
                "processing"
            };
            let filename =
                multipart_filename(&req.body).unwrap_or_else(|| "unknown.pdf".to_owned());
            state.books.lock().unwrap().insert(
                0,
                json!({
                    "_id": "new-1",
                    "filename": filename,
                    "status": status,
                    "uploaded_at": "2024-05-02 08:00:00",
                }),
            );
            (
                200,
                json!({ "message": "Book uploaded and processing started", "book_id": "new-1" })
                    .to_string(),
            )
        }
        ("GET", DOWNLOAD_PATH) => {
            if state.fail_download.load(Ordering::SeqCst) {
                return (503, json!({ "detail": "storage offline" }).to_string());
            }
            let mut text = String::new();
            for book in state.books.lock().unwrap().iter() {
                if book["status"] == "completed" {
                    let filename = book["filename"].as_str().unwrap_or("");
                    text.push_str(&format!("\n\n--- Book: {filename} ---\n\n"));
                    text.push_str(&book_content(book));
                }
            }
            (200, text)
        }
        ("GET", p) if p.starts_with("/api/books/") => {
            let id = &p["/api/books/".len()..];
            let found = state
                .books
                .lock()
                .unwrap()
                .iter()
                .find(|book| book["_id"] == id)
                .cloned();
            match found {
                Some(mut book) => {
                    book["content"] = Value::String(book_content(&book));
                    (200, book.to_string())
                }
                None => (404, json!({ "detail": "Book not found" }).to_string()),
            }
        }
        _ => (404, json!({ "detail": "Not Found" }).to_string()),
    }
}

fn multipart_filename(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let start = text.find("filename=\"")? + "filename=\"".len();
    let rest = &text[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_owned())
}
