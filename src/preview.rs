use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ContribError, ParseError, ValidationError};

/// Number of records shown before a bulk upload.
pub const PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Json,
    Csv,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Result<Self, ValidationError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(ValidationError::UnsupportedFormat { extension }),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    /// At most [`PREVIEW_LIMIT`] records, in file order.
    pub records: Vec<Value>,
    pub total: usize,
}

impl Preview {
    fn from_records(mut records: Vec<Value>) -> Self {
        let total = records.len();
        records.truncate(PREVIEW_LIMIT);
        Self { records, total }
    }

    pub fn is_truncated(&self) -> bool {
        self.total > self.records.len()
    }
}

/// A bulk file picked for upload, with its bytes and local preview.
#[derive(Debug, Clone)]
pub struct UploadSelection {
    pub path: PathBuf,
    pub file_name: String,
    pub format: DatasetFormat,
    pub bytes: Vec<u8>,
    pub preview: Preview,
}

pub fn parse_preview(format: DatasetFormat, text: &str) -> Result<Preview, ParseError> {
    match format {
        DatasetFormat::Json => parse_json(text),
        DatasetFormat::Csv => parse_csv(text),
    }
}

fn parse_json(text: &str) -> Result<Preview, ParseError> {
    let value: Value = serde_json::from_str(text).map_err(|err| ParseError::Json {
        reason: err.to_string(),
    })?;
    let records = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    Ok(Preview::from_records(records))
}

fn parse_csv(text: &str) -> Result<Preview, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| ParseError::Csv {
            reason: err.to_string(),
        })?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| ParseError::Csv {
            reason: err.to_string(),
        })?;
        let mut object = Map::new();
        for (key, field) in headers.iter().zip(row.iter()) {
            object.insert(key.to_owned(), Value::String(field.to_owned()));
        }
        records.push(Value::Object(object));
    }
    Ok(Preview::from_records(records))
}

/// Reads and previews a local dataset file. Nothing leaves the machine.
pub async fn select_dataset_file(path: &Path) -> Result<UploadSelection, ContribError> {
    let format = DatasetFormat::from_path(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ValidationError::Unreadable {
            reason: format!("{}: {err}", path.display()),
        })?;
    let text = String::from_utf8(bytes).map_err(|err| match format {
        DatasetFormat::Json => ParseError::Json {
            reason: err.to_string(),
        },
        DatasetFormat::Csv => ParseError::Csv {
            reason: err.to_string(),
        },
    })?;
    let preview = parse_preview(format, &text)?;
    tracing::debug!(
        path = %path.display(),
        total = preview.total,
        shown = preview.records.len(),
        "parsed dataset preview"
    );

    Ok(UploadSelection {
        path: path.to_path_buf(),
        file_name: file_name_of(path),
        format,
        bytes: text.into_bytes(),
        preview,
    })
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
