use crate::error::LayoutError;
use crate::model::{DetectedTable, PageText};
use crate::options::QualityMode;
use crate::table_parse::{modal_width, split_line_into_cells, split_on_words};
use crate::warning::{ReadWarning, WarningCode};

pub(crate) const LOW_CONFIDENCE_THRESHOLD: f32 = 0.60;

/// Share of rows at the modal width, weighted 3:1 against the spread between
/// the narrowest and widest row.
#[allow(clippy::cast_precision_loss)]
fn table_confidence(rows: &[Vec<String>]) -> f32 {
    let modal = modal_width(rows);
    if rows.len() < 2 || modal == 0 {
        return 0.0;
    }

    let widths = rows.iter().map(Vec::len);
    let widest = widths.clone().max().unwrap_or(modal);
    let narrowest = widths.min().unwrap_or(modal);
    let at_modal = rows.iter().filter(|row| row.len() == modal).count();

    let consistency = at_modal as f32 / rows.len() as f32;
    let spread = (widest - narrowest) as f32 / widest as f32;
    (0.75 * consistency + 0.25 * (1.0 - spread)).clamp(0.0, 1.0)
}

/// Cells of one page line for table detection. A line that does not split
/// into enough cells is retried word by word when it looks like a row of a
/// single-spaced grid rather than prose.
fn row_cells(line: &str, min_cols: usize) -> Vec<String> {
    let cells = split_line_into_cells(line);
    if cells.len() >= min_cols || line.contains('\t') {
        return cells;
    }

    let words = split_on_words(line);
    let is_prose = line.trim_end().ends_with(['.', '!', '?']);
    let has_figure = words.iter().any(|word| word.bytes().any(|b| b.is_ascii_digit()));
    if words.len() >= min_cols && !is_prose && (has_figure || words.len() <= 6) {
        words
    } else {
        cells
    }
}

fn close_table(page: u32, rows: &mut Vec<Vec<String>>, tables: &mut Vec<DetectedTable>) {
    let rows = std::mem::take(rows);
    if rows.len() >= 2 {
        tables.push(DetectedTable {
            page,
            confidence: table_confidence(&rows),
            rows,
        });
    }
}

/// Groups runs of consecutive lines with at least `min_cols` cells into
/// tables of two or more rows.
pub(crate) fn detect_tables_in_page(page: &PageText, min_cols: usize) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    let mut run = Vec::new();

    for line in page.text.lines() {
        let cells = row_cells(line, min_cols);
        if cells.len() >= min_cols {
            run.push(cells);
        } else {
            close_table(page.page_number, &mut run, &mut tables);
        }
    }
    close_table(page.page_number, &mut run, &mut tables);

    tables
}

/// Picks the first table of the page according to `mode`.
pub(crate) fn select_first_table(
    tables: Vec<DetectedTable>,
    mode: QualityMode,
    warnings: &mut Vec<ReadWarning>,
) -> Result<Option<DetectedTable>, LayoutError> {
    for table in tables {
        if table.confidence >= LOW_CONFIDENCE_THRESHOLD {
            return Ok(Some(table));
        }

        match mode {
            QualityMode::BestEffort => {
                warnings.push(
                    ReadWarning::new(
                        WarningCode::LowConfidence,
                        "table confidence is low; kept in best-effort mode",
                    )
                    .with_page(table.page)
                    .with_confidence(table.confidence),
                );
                return Ok(Some(table));
            }
            QualityMode::Strict => {
                return Err(LayoutError::AmbiguousTable {
                    page: table.page,
                    confidence: table.confidence,
                });
            }
            QualityMode::SkipAmbiguous => {
                warnings.push(
                    ReadWarning::new(WarningCode::LowConfidence, "skipping low-confidence table")
                        .with_page(table.page)
                        .with_confidence(table.confidence),
                );
            }
        }
    }

    Ok(None)
}
