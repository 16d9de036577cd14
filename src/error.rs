use thiserror::Error;

/// Everything a contribution action can fail with, as seen by the user.
#[derive(Debug, Error)]
pub enum ContribError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Network failure or a non-success status. Detail is logged, never shown.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),

    #[error("another request from this form is still in flight")]
    Busy,
}

impl ContribError {
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Parse(_) | Self::Busy)
    }
}

/// Detected before any request is made. `Display` is the banner text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required.")]
    EmptyField { field: &'static str },

    #[error("Unsupported file format. Please upload .json or .csv")]
    UnsupportedFormat { extension: Option<String> },

    #[error("Please upload a PDF file.")]
    NotPdf { detected: Option<String> },

    #[error("This book has already been uploaded.")]
    DuplicateBook { filename: String },

    #[error("Please select a file first.")]
    NoSelection,

    #[error("Could not read the selected file.")]
    Unreadable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Error parsing JSON file")]
    Json { reason: String },

    #[error("Error parsing CSV file")]
    Csv { reason: String },
}

impl ParseError {
    pub fn reason(&self) -> &str {
        match self {
            Self::Json { reason } | Self::Csv { reason } => reason,
        }
    }
}
