use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tokio::io::{AsyncWrite, AsyncWriteExt as _};

use crate::config::ApiConfig;
use crate::model::{Ack, BookRecord, QaEntry, QaRecord};

/// A file body headed for a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// The remote collection service. Front-ends and tests only ever see this trait.
#[async_trait]
pub trait ContributionApi: Send + Sync {
    async fn list_data(&self) -> anyhow::Result<Vec<QaRecord>>;
    async fn submit_entry(&self, entry: &QaEntry) -> anyhow::Result<Ack>;
    async fn upload_dataset(&self, file: UploadFile) -> anyhow::Result<Ack>;
    async fn list_books(&self) -> anyhow::Result<Vec<BookRecord>>;
    async fn upload_book(&self, file: UploadFile, skip_ocr: bool) -> anyhow::Result<Ack>;
    async fn get_book(&self, id: &str) -> anyhow::Result<BookRecord>;
    /// Streams the text of every completed book into `sink`; returns the byte count.
    async fn download_all_books(
        &self,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpApi {
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tulu-contrib/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let url = self.config.endpoint(path)?;
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let raw = read_success_body(resp, "GET", &url).await?;
        serde_json::from_str(&raw).with_context(|| format!("parse response of GET {url}"))
    }

    async fn post_multipart(&self, url: url::Url, file: UploadFile) -> anyhow::Result<Ack> {
        let size = file.bytes.len();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name.clone())
            .mime_str(file.mime)
            .context("build multipart part")?;
        let form = Form::new().part("file", part);

        tracing::info!(url = %url, filename = %file.file_name, bytes = size, "uploading file");
        let resp = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        let raw = read_success_body(resp, "POST", &url).await?;
        Ok(Ack::from_body(&raw))
    }
}

async fn read_success_body(
    resp: reqwest::Response,
    method: &str,
    url: &url::Url,
) -> anyhow::Result<String> {
    let status = resp.status();
    let raw = resp
        .text()
        .await
        .with_context(|| format!("read response body of {method} {url}"))?;
    if !status.is_success() {
        return Err(status_error(method, url, status, raw));
    }
    Ok(raw)
}

fn status_error(
    method: &str,
    url: &url::Url,
    status: reqwest::StatusCode,
    raw: String,
) -> anyhow::Error {
    let detail = parse_error_detail(&raw).unwrap_or(raw);
    anyhow::anyhow!("{method} {url} failed ({status}): {detail}")
}

/// FastAPI errors arrive as `{"detail": "..."}`.
fn parse_error_detail(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl ContributionApi for HttpApi {
    async fn list_data(&self) -> anyhow::Result<Vec<QaRecord>> {
        self.get_json("/api/data").await
    }

    async fn submit_entry(&self, entry: &QaEntry) -> anyhow::Result<Ack> {
        let url = self.config.endpoint("/api/submit")?;
        tracing::info!(url = %url, has_translation = entry.translation.is_some(), "submitting entry");
        let resp = self
            .client
            .post(url.clone())
            .json(entry)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?;
        let raw = read_success_body(resp, "POST", &url).await?;
        Ok(Ack::from_body(&raw))
    }

    async fn upload_dataset(&self, file: UploadFile) -> anyhow::Result<Ack> {
        let url = self.config.endpoint("/api/upload")?;
        self.post_multipart(url, file).await
    }

    async fn list_books(&self) -> anyhow::Result<Vec<BookRecord>> {
        self.get_json("/api/books").await
    }

    async fn upload_book(&self, file: UploadFile, skip_ocr: bool) -> anyhow::Result<Ack> {
        let mut url = self.config.endpoint("/api/books/upload")?;
        url.query_pairs_mut()
            .append_pair("skip_ocr", if skip_ocr { "true" } else { "false" });
        self.post_multipart(url, file).await
    }

    async fn get_book(&self, id: &str) -> anyhow::Result<BookRecord> {
        let mut url = self.config.endpoint("/api/books")?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("api url cannot be a base"))?
            .push(id);
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let raw = read_success_body(resp, "GET", &url).await?;
        serde_json::from_str(&raw).with_context(|| format!("parse book {id}"))
    }

    async fn download_all_books(
        &self,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> anyhow::Result<u64> {
        let url = self.config.endpoint("/api/books/download/all")?;
        let mut resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            let raw = resp
                .text()
                .await
                .with_context(|| format!("read response body of GET {url}"))?;
            return Err(status_error("GET", &url, status, raw));
        }

        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await.context("read response chunk")? {
            sink.write_all(&chunk).await.context("write download chunk")?;
            written += chunk.len() as u64;
        }
        sink.flush().await.context("flush download")?;
        tracing::debug!(url = %url, bytes = written, "download finished");
        Ok(written)
    }
}
