use std::fmt;

/// Non-fatal conditions met while reading the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    /// The table kept (or skipped) scored below the confidence threshold.
    LowConfidence,
    NoTablesDetected,
    /// The page yielded no positioned text spans.
    NoTextOnPage,
    /// Spans held no table, so the plain-text extraction was split instead.
    TextFallback,
}

impl WarningCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowConfidence => "low_confidence",
            Self::NoTablesDetected => "no_tables_detected",
            Self::NoTextOnPage => "no_text_on_page",
            Self::TextFallback => "text_fallback",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadWarning {
    pub code: WarningCode,
    pub message: String,
    pub page: Option<u32>,
    pub confidence: Option<f32>,
}

impl ReadWarning {
    #[must_use]
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            page: None,
            confidence: None,
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
