use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("failed to extract PDF text: {0}")]
    PdfExtract(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("table on page {page} is too ambiguous (confidence={confidence:.2})")]
    AmbiguousTable { page: u32, confidence: f32 },
}
