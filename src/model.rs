use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub instruction: String,
    pub response: String,
}

/// Outgoing QA pair. `translation_en` is omitted entirely when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaEntry {
    pub instruction: String,
    pub response: String,
    pub source: String,
    #[serde(rename = "translation_en", skip_serializing_if = "Option::is_none", default)]
    pub translation: Option<Translation>,
}

/// Text fields of the manual entry form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualEntryForm {
    pub instruction: String,
    pub response: String,
    pub translation_instruction: String,
    pub translation_response: String,
}

impl ManualEntryForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// The translation travels if either English field has content; both fields go as typed.
    pub fn to_entry(&self) -> QaEntry {
        let has_translation = !self.translation_instruction.trim().is_empty()
            || !self.translation_response.trim().is_empty();
        QaEntry {
            instruction: self.instruction.clone(),
            response: self.response.clone(),
            source: "manual".to_owned(),
            translation: has_translation.then(|| Translation {
                instruction: self.translation_instruction.clone(),
                response: self.translation_response.clone(),
            }),
        }
    }
}

/// A stored QA pair as listed by `GET /api/data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    #[serde(default)]
    pub id: String,
    pub instruction: String,
    pub response: String,
    #[serde(rename = "translation_en", default)]
    pub translation: Option<Translation>,
    #[serde(default = "unknown_source")]
    pub source: String,
}

fn unknown_source() -> String {
    "unknown".to_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookStatus {
    Processing,
    Completed,
    Failed,
    Archived,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub filename: String,
    pub status: BookStatus,
    #[serde(default)]
    pub uploaded_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kept_lines: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl BookRecord {
    /// Server timestamps are naive local times (`2024-05-01 10:22:31.123456`);
    /// RFC 3339 is accepted as well.
    pub fn uploaded_at(&self) -> Option<NaiveDateTime> {
        let raw = self.uploaded_at.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|dt| dt.naive_local())
            })
    }
}

/// Response body of submit/upload endpoints. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub book_id: Option<String>,
}

impl Ack {
    pub fn from_body(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub kind: BannerKind,
    pub message: String,
}

impl StatusBanner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }
}
