use std::collections::HashMap;

use crate::models::{DuasRow, PercepcionRow};
use crate::table::Cell;

/// A row that can be merged with later rows of the same source document.
pub trait Consolidate {
    fn source_file(&self) -> &str;

    /// Fills every blank field of `self` from `later`.
    fn fill_from(&mut self, later: Self);
}

fn fill_text(slot: &mut String, later: String) {
    if slot.trim().is_empty() && !later.trim().is_empty() {
        *slot = later;
    }
}

fn fill_cell(slot: &mut Cell, later: Cell) {
    if slot.is_blank() && !later.is_blank() {
        *slot = later;
    }
}

impl Consolidate for DuasRow {
    fn source_file(&self) -> &str {
        &self.source_file
    }

    fn fill_from(&mut self, later: Self) {
        fill_text(&mut self.concepto, later.concepto);
        fill_text(&mut self.declaracion, later.declaracion);
        fill_text(&mut self.fecha, later.fecha);
        fill_cell(&mut self.ad_valorem, later.ad_valorem);
        fill_cell(&mut self.imp_prom_municipal, later.imp_prom_municipal);
        fill_cell(&mut self.imp_gene_a_las_ventas, later.imp_gene_a_las_ventas);
        fill_cell(&mut self.percepcion, later.percepcion);
        fill_text(&mut self.pec, later.pec);
        fill_text(&mut self.error, later.error);
    }
}

impl Consolidate for PercepcionRow {
    fn source_file(&self) -> &str {
        &self.source_file
    }

    fn fill_from(&mut self, later: Self) {
        fill_text(&mut self.no_liquidacion, later.no_liquidacion);
        fill_text(&mut self.cda, later.cda);
        fill_text(&mut self.fecha, later.fecha);
        fill_cell(&mut self.monto, later.monto);
        fill_text(&mut self.error, later.error);
    }
}

/// One row per distinct source document, in order of first appearance. Each
/// field holds the first non-blank value among that document's rows.
pub fn consolidate_by_source<R: Consolidate>(rows: Vec<R>) -> Vec<R> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<R> = Vec::new();

    for row in rows {
        if let Some(&index) = positions.get(row.source_file()) {
            out[index].fill_from(row);
        } else {
            positions.insert(row.source_file().to_string(), out.len());
            out.push(row);
        }
    }

    out
}
