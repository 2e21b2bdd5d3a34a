mod error;
mod header;
mod model;
mod options;
mod pdf_reader;
mod span_table;
mod table_detect;
mod table_parse;
mod warning;

use lopdf::Document;
use tracing::debug;

use crate::pdf_reader::{
    extract_page_spans, first_page, first_page_text, group_spans_into_lines, load_document,
};
use crate::model::TextSpan;
use crate::span_table::detect_span_tables;
use crate::table_detect::{detect_tables_in_page, select_first_table};
use crate::table_parse::pad_rows;

pub use error::LayoutError;
pub use header::{BLANK_HEADER, unique_headers_by_count, unique_headers_by_position};
pub use model::{LineSpans, PageText, TableGrid};
pub use options::{QualityMode, ReadOptions};
pub use warning::{ReadWarning, WarningCode};

/// Outcome of a table-mode read of the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRead {
    /// First table of the page, padded to its widest row. `None` when the
    /// page holds no table.
    pub table: Option<TableGrid>,
    pub table_count: usize,
    pub warnings: Vec<ReadWarning>,
}

/// Outcome of a span-mode read of the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRead {
    pub lines: LineSpans,
    pub warnings: Vec<ReadWarning>,
}

fn first_page_spans(
    document: &Document,
    tolerance: f32,
) -> Result<(u32, Vec<Vec<TextSpan>>), LayoutError> {
    let (page_number, page_id) = first_page(document)?;
    let spans = extract_page_spans(document, page_id).unwrap_or_default();
    Ok((page_number, group_spans_into_lines(&spans, tolerance)))
}

/// Reads the first table of the first page.
///
/// Cells come from the positioned text spans of the page, each placed in the
/// column its x position falls in; when those yield no table the best
/// plain-text extraction of the page is split instead.
///
/// # Errors
///
/// Fails when the options are invalid, the bytes are not a loadable PDF, the
/// document has no pages, or the first table is ambiguous in
/// [`QualityMode::Strict`].
pub fn read_first_table(pdf: &[u8], options: &ReadOptions) -> Result<TableRead, LayoutError> {
    options.validate()?;
    let document = load_document(pdf)?;
    let (page, lines) = first_page_spans(&document, options.line_tolerance)?;

    let mut warnings = Vec::new();
    let mut tables = detect_span_tables(page, &lines, options.min_cols);

    if tables.is_empty()
        && let Ok(text_page) = first_page_text(pdf, &document)
    {
        let fallback_tables = detect_tables_in_page(&text_page, options.min_cols);
        if !fallback_tables.is_empty() {
            debug!(page = text_page.page_number, "span grid held no table; used page text");
            warnings.push(
                ReadWarning::new(
                    WarningCode::TextFallback,
                    "no table in positioned spans; retried with plain page text",
                )
                .with_page(text_page.page_number),
            );
            tables = fallback_tables;
        }
    }

    let table_count = tables.len();
    if tables.is_empty() {
        warnings.push(
            ReadWarning::new(WarningCode::NoTablesDetected, "no table detected on the first page")
                .with_page(page),
        );
    }

    let table = select_first_table(tables, options.quality_mode, &mut warnings)?.map(|table| {
        let width = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        TableGrid {
            page: table.page,
            rows: pad_rows(table.rows, width),
            confidence: table.confidence,
        }
    });

    Ok(TableRead {
        table,
        table_count,
        warnings,
    })
}

/// Reads the first page as lines of text spans, top to bottom.
///
/// # Errors
///
/// Fails when the options are invalid, the bytes are not a loadable PDF, or
/// the document has no pages.
pub fn read_first_page_lines(pdf: &[u8], options: &ReadOptions) -> Result<LineRead, LayoutError> {
    options.validate()?;
    let document = load_document(pdf)?;
    let (page, spans) = first_page_spans(&document, options.line_tolerance)?;
    let lines = LineSpans {
        page,
        lines: spans
            .into_iter()
            .map(|line| line.into_iter().map(|span| span.text).collect())
            .collect(),
    };

    let mut warnings = Vec::new();
    if lines.is_empty() {
        warnings.push(
            ReadWarning::new(WarningCode::NoTextOnPage, "first page holds no text spans")
                .with_page(lines.page),
        );
    }

    Ok(LineRead { lines, warnings })
}
