//! Turns consolidated rows into final records: rate join, derived IGV,
//! accounting codes and the unreadable-document marker.

use tracing::debug;

use crate::models::{
    AccountingCodes, DUAS_UNREADABLE, DuasRecord, DuasRow, PERCEPCION_UNREADABLE,
    PercepcionRecord, PercepcionRow,
};
use crate::normalize::round2;
use crate::rates::ExchangeRateTable;

/// Rate charged on every Percepciones record.
pub const PERCEPCION_RATE: f64 = 1.00;

fn resolve_error(error: String, key: &str, generic: &str) -> String {
    if !error.trim().is_empty() {
        error
    } else if key.trim().is_empty() {
        generic.to_string()
    } else {
        String::new()
    }
}

fn codes_for(key: &str, codes: &AccountingCodes) -> Option<AccountingCodes> {
    (!key.trim().is_empty()).then(|| codes.clone())
}

/// `rates` of `None` (or an empty table) leaves the record without a rate
/// column; a date missing from the table leaves the rate empty.
#[must_use]
pub fn enrich_duas(
    row: DuasRow,
    rates: Option<&ExchangeRateTable>,
    codes: &AccountingCodes,
) -> DuasRecord {
    let tasa = rates.filter(|table| !table.is_empty()).map(|table| {
        let rate = table.rate_for(&row.fecha);
        if rate.is_none() && !row.fecha.is_empty() {
            debug!(source_file = %row.source_file, fecha = %row.fecha, "no exchange rate for date");
        }
        rate
    });

    let imp_prom_municipal = row.imp_prom_municipal.as_number();
    let imp_gene_a_las_ventas = row.imp_gene_a_las_ventas.as_number();
    let igv = round2(imp_prom_municipal.unwrap_or(0.0) + imp_gene_a_las_ventas.unwrap_or(0.0));

    DuasRecord {
        codes: codes_for(&row.declaracion, codes),
        error: resolve_error(row.error, &row.declaracion, DUAS_UNREADABLE),
        source_file: row.source_file,
        declaracion: row.declaracion,
        fecha: row.fecha,
        ad_valorem: row.ad_valorem.as_number(),
        imp_prom_municipal,
        imp_gene_a_las_ventas,
        igv,
        percepcion: row.percepcion.as_number(),
        pec: row.pec,
        tasa,
    }
}

#[must_use]
pub fn enrich_percepcion(row: PercepcionRow, codes: &AccountingCodes) -> PercepcionRecord {
    PercepcionRecord {
        codes: codes_for(&row.no_liquidacion, codes),
        error: resolve_error(row.error, &row.no_liquidacion, PERCEPCION_UNREADABLE),
        fecha: row.fecha.replace('/', ""),
        source_file: row.source_file,
        no_liquidacion: row.no_liquidacion,
        cda: row.cda,
        monto: row.monto.as_number(),
        tasa: PERCEPCION_RATE,
    }
}
