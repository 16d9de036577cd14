use std::time::Duration;

use anyhow::Context as _;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://major-project-initial-ui.onrender.com";
pub const API_URL_ENV: &str = "TULU_CONTRIB_API_URL";

/// Cadence of the background book-list refresh while the books view is open.
pub const BOOK_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
}

impl ApiConfig {
    /// Flag wins over `TULU_CONTRIB_API_URL`, which wins over the compiled-in default.
    pub fn resolve(flag: Option<&str>) -> anyhow::Result<Self> {
        if let Some(raw) = flag {
            return Self::parse(raw).context("invalid --api-url");
        }
        match std::env::var(API_URL_ENV) {
            Ok(raw) if !raw.trim().is_empty() => {
                Self::parse(&raw).with_context(|| format!("invalid {API_URL_ENV}={raw:?}"))
            }
            _ => Self::parse(DEFAULT_API_BASE_URL).context("invalid built-in api url"),
        }
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            anyhow::bail!("api url is empty");
        }
        let base_url = Url::parse(trimmed).with_context(|| format!("parse url: {trimmed}"))?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            anyhow::bail!("api url scheme must be http/https: {trimmed}");
        }
        if base_url.host_str().is_none() {
            anyhow::bail!("api url must include host: {trimmed}");
        }
        Ok(Self { base_url })
    }

    /// Joins `path` (e.g. `/api/books`) onto the base url, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}")).with_context(|| format!("build endpoint url: {path}"))
    }
}
