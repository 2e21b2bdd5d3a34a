use comex_pdf_layout::{
    LineSpans, ReadOptions, ReadWarning, TableGrid, read_first_page_lines, read_first_table,
};
use tracing::debug;

use crate::error::DocumentError;

/// Source of the raw page structure the field extractors work on. Only the
/// first page of a document is ever read.
pub trait DocumentReader {
    /// First table of the first page, header row first. `Ok(None)` when the
    /// page has no table.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] when the bytes cannot be read as a PDF.
    fn read_table(&self, pdf: &[u8]) -> Result<Option<TableGrid>, DocumentError>;

    /// Text spans of the first page grouped into lines.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] when the bytes cannot be read as a PDF.
    fn read_lines(&self, pdf: &[u8]) -> Result<LineSpans, DocumentError>;
}

fn log_warnings(warnings: &[ReadWarning]) {
    for warning in warnings {
        debug!(code = %warning.code, page = ?warning.page, "{}", warning.message);
    }
}

/// Reader backed by `comex-pdf-layout`.
#[derive(Debug, Clone, Default)]
pub struct LopdfReader {
    options: ReadOptions,
}

impl LopdfReader {
    #[must_use]
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }
}

impl DocumentReader for LopdfReader {
    fn read_table(&self, pdf: &[u8]) -> Result<Option<TableGrid>, DocumentError> {
        let read = read_first_table(pdf, &self.options)?;
        debug!(tables = read.table_count, "read first page table");
        log_warnings(&read.warnings);
        Ok(read.table)
    }

    fn read_lines(&self, pdf: &[u8]) -> Result<LineSpans, DocumentError> {
        let read = read_first_page_lines(pdf, &self.options)?;
        log_warnings(&read.warnings);
        Ok(read.lines)
    }
}
