use std::fmt::{Display, Formatter};

use comex_pdf_layout::LayoutError;
use thiserror::Error;

/// Failures at the edges of a run: loading inputs and writing outputs.
#[derive(Debug, Error)]
pub enum ComexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid exchange-rate table: {0}")]
    RateTable(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("unreadable document: {0}")]
    Document(#[from] DocumentError),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// Why a single document could not be read. Never aborts a batch; the
/// pipelines turn it into that document's error row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    Unreadable(String),
    NoPages(String),
    Ambiguous(String),
    Config(String),
}

impl DocumentError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unreadable(_) => "unreadable",
            Self::NoPages(_) => "no_pages",
            Self::Ambiguous(_) => "ambiguous_table",
            Self::Config(_) => "invalid_option",
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unreadable(message)
            | Self::NoPages(message)
            | Self::Ambiguous(message)
            | Self::Config(message) => message,
        }
    }
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for DocumentError {}

impl From<LayoutError> for DocumentError {
    fn from(error: LayoutError) -> Self {
        let message = error.to_string();
        match error {
            LayoutError::PdfLoad(_) | LayoutError::PdfExtract(_) => Self::Unreadable(message),
            LayoutError::NoPages => Self::NoPages(message),
            LayoutError::AmbiguousTable { .. } => Self::Ambiguous(message),
            LayoutError::InvalidOption(_) => Self::Config(message),
        }
    }
}
