//! The DUAS and Percepciones pipelines: read each document in upload order,
//! extract rows, normalize amounts, consolidate per document, enrich and
//! publish the fixed schema.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::consolidate::consolidate_by_source;
use crate::duas::extract_duas_rows;
use crate::enrich::{enrich_duas, enrich_percepcion};
use crate::error::DocumentError;
use crate::models::{AccountingCodes, DuasRow, PercepcionRow, UploadedPdf};
use crate::normalize::amount_cell;
use crate::organize::{organize_duas, organize_percepciones};
use crate::percepciones::extract_percepcion_rows;
use crate::progress::Progress;
use crate::rates::ExchangeRateTable;
use crate::reader::DocumentReader;
use crate::table::Table;

/// Runs one reader call, turning a panic inside the PDF stack into a
/// document error.
fn guarded<T>(read: impl FnOnce() -> Result<T, DocumentError>) -> Result<T, DocumentError> {
    panic::catch_unwind(AssertUnwindSafe(read)).unwrap_or_else(|_| {
        Err(DocumentError::Unreadable(
            "PDF reader panicked on malformed input".to_string(),
        ))
    })
}

fn read_failure_message(error: &DocumentError) -> String {
    format!("Error reading the PDF: {}", error.message())
}

fn report(progress: &mut impl Progress, index: usize, total: usize, filename: &str) {
    info!(index, total, filename, "document read");
    progress.document_read(index, total, filename);
}

fn duas_rows_for(document: &UploadedPdf, reader: &impl DocumentReader) -> Vec<DuasRow> {
    match guarded(|| reader.read_table(&document.bytes)) {
        Ok(Some(grid)) => {
            let rows = extract_duas_rows(&document.name, &grid);
            if rows.is_empty() {
                vec![DuasRow::failed(&document.name, "")]
            } else {
                rows
            }
        }
        Ok(None) => {
            debug!(source_file = %document.name, "no table on first page");
            vec![DuasRow::failed(&document.name, "")]
        }
        Err(error) => {
            warn!(source_file = %document.name, code = error.code(), "{}", error.message());
            vec![DuasRow::failed(&document.name, read_failure_message(&error))]
        }
    }
}

fn percepcion_rows_for(document: &UploadedPdf, reader: &impl DocumentReader) -> Vec<PercepcionRow> {
    match guarded(|| reader.read_lines(&document.bytes)) {
        Ok(lines) if !lines.is_empty() => extract_percepcion_rows(&document.name, &lines),
        Ok(_) => {
            debug!(source_file = %document.name, "no text on first page");
            vec![PercepcionRow::failed(&document.name, "")]
        }
        Err(error) => {
            warn!(source_file = %document.name, code = error.code(), "{}", error.message());
            vec![PercepcionRow::failed(&document.name, read_failure_message(&error))]
        }
    }
}

/// DUAS pipeline. Returns `None` for an empty upload; otherwise one row per
/// distinct document name, unreadable documents included.
pub fn process_duas(
    documents: &[UploadedPdf],
    reader: &impl DocumentReader,
    rates: Option<&ExchangeRateTable>,
    codes: &AccountingCodes,
    progress: &mut impl Progress,
) -> Option<Table> {
    if documents.is_empty() {
        return None;
    }

    let total = documents.len();
    let mut rows = Vec::new();
    for (index, document) in documents.iter().enumerate() {
        rows.extend(duas_rows_for(document, reader));
        report(progress, index + 1, total, &document.name);
    }

    for row in &mut rows {
        row.ad_valorem = amount_cell(&row.ad_valorem);
        row.imp_prom_municipal = amount_cell(&row.imp_prom_municipal);
        row.imp_gene_a_las_ventas = amount_cell(&row.imp_gene_a_las_ventas);
        row.percepcion = amount_cell(&row.percepcion);
    }

    let records = consolidate_by_source(rows)
        .into_iter()
        .map(|row| enrich_duas(row, rates, codes))
        .collect::<Vec<_>>();
    Some(organize_duas(&records))
}

/// Percepciones pipeline. Returns `None` for an empty upload; otherwise one
/// row per distinct document name, unreadable documents included.
pub fn process_percepciones(
    documents: &[UploadedPdf],
    reader: &impl DocumentReader,
    codes: &AccountingCodes,
    progress: &mut impl Progress,
) -> Option<Table> {
    if documents.is_empty() {
        return None;
    }

    let total = documents.len();
    let mut rows = Vec::new();
    for (index, document) in documents.iter().enumerate() {
        rows.extend(percepcion_rows_for(document, reader));
        report(progress, index + 1, total, &document.name);
    }

    for row in &mut rows {
        row.monto = amount_cell(&row.monto);
    }

    let records = consolidate_by_source(rows)
        .into_iter()
        .map(|row| enrich_percepcion(row, codes))
        .collect::<Vec<_>>();
    Some(organize_percepciones(&records))
}
