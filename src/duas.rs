//! DUAS field extraction: one [`DuasRow`] per data row of the first table.

use comex_pdf_layout::{TableGrid, unique_headers_by_position};
use regex::Regex;

use crate::models::{DUAS_RESERVED_COLUMNS, DuasRow};
use crate::table::Cell;

const CONCEPTO: &str = "CONCEPTO";
const CONCEPTO_MARKERS: [&str; 3] = ["XML", "CRAMIREZ", "NTAPIA"];
const REFERENCE_MARKER: &str = "REF:";
const REFERENCE_COLUMN: &str = "Col17";

const ORDER_LABEL: &str = "No ORDEN";
const DECLARATION_LABEL: &str = "Declaraci";
const DECLARATION_PREFIX: &str = "No Declaración";
const DATE_ROW_LABEL: &str = "4.6 Imp.Gene";
const DATE_LABEL: &str = "Fecha";
const DATE_PREFIX: &str = "6.2 Fecha";
const AD_VALOREM_LABEL: &str = "4.1 Ad/Valorem";
const MUNICIPAL_LABEL: &str = "4.5 Imp.Prom.Municipal";
const SALES_TAX_LABEL: &str = "4.6 Imp.Gene.a las Ventas";
const ANTIDUMPING_LABEL: &str = "4.7 Derechos Antidumping";
const PERCEPTION_LABEL: &str = "Percepción";
const PERCEPTION_PREFIX: &str = "Percepción IGV S/: ";

/// Renames marker headers to `CONCEPTO` and `REF:` headers to `Col17`. When
/// no header is a `CONCEPTO` the first column takes that role.
#[must_use]
pub fn standardize_headers(headers: &[String]) -> Vec<String> {
    let mut found_concepto = false;
    let mut standardized = headers
        .iter()
        .map(|header| {
            if CONCEPTO_MARKERS.iter().any(|marker| header.contains(marker)) {
                found_concepto = true;
                CONCEPTO.to_string()
            } else if header.contains(REFERENCE_MARKER) {
                REFERENCE_COLUMN.to_string()
            } else {
                header.clone()
            }
        })
        .collect::<Vec<_>>();

    if !found_concepto && let Some(first) = standardized.first_mut() {
        *first = CONCEPTO.to_string();
    }
    standardized
}

/// Header labels of a raw table, unique and standardized. The header is
/// widened to the widest data row.
#[must_use]
pub fn table_headers(grid: &TableGrid) -> Vec<String> {
    let mut raw = grid.header().map(<[String]>::to_vec).unwrap_or_default();
    let width = grid.width();
    if raw.len() < width {
        raw.resize(width, String::new());
    }
    standardize_headers(&unique_headers_by_position(&raw))
}

/// A data row addressed by header label.
struct LabelledRow<'a> {
    cells: Vec<(&'a str, &'a str)>,
}

impl<'a> LabelledRow<'a> {
    fn new(headers: &'a [String], values: &'a [String]) -> Self {
        let cells = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let value = values.get(index).map_or("", String::as_str);
                (header.as_str(), value)
            })
            .collect();
        Self { cells }
    }

    fn value(&self, column: &str) -> Option<&'a str> {
        self.cells
            .iter()
            .find(|(header, _)| *header == column)
            .map(|(_, value)| *value)
    }

    fn concepto(&self) -> &'a str {
        self.value(CONCEPTO).unwrap_or_default()
    }

    /// First non-reserved cell whose text contains `label`.
    fn sibling_containing(&self, label: &str) -> Option<&'a str> {
        self.cells
            .iter()
            .filter(|(header, _)| !DUAS_RESERVED_COLUMNS.contains(header))
            .find(|(_, value)| value.contains(label))
            .map(|(_, value)| *value)
    }

    fn tail_amount(&self) -> Cell {
        ["Col_7", "Col_6"]
            .iter()
            .filter_map(|column| self.value(column))
            .find(|value| !value.trim().is_empty())
            .map_or(Cell::Missing, |value| Cell::text(value.trim()))
    }
}

/// Reduces `118-0165-10-016559` to `118-016559`.
#[must_use]
pub fn reduce_declaration(raw: &str) -> Option<String> {
    let declaration_re = Regex::new(r"(\d{3})-\d{4}-10-(\d{6})").ok()?;
    declaration_re
        .captures(raw)
        .map(|capture| format!("{}-{}", &capture[1], &capture[2]))
}

fn pec_number(text: &str) -> Option<String> {
    let pec_re = Regex::new(r"PEC\s*\d+").ok()?;
    pec_re.find(text).map(|found| found.as_str().to_string())
}

/// Keeps the `PEC <code>` token with a single space after `PEC`.
#[must_use]
pub fn normalize_pec(raw: &str) -> String {
    let Ok(token_re) = Regex::new(r"PEC\s*\S*") else {
        return String::new();
    };
    let Some(token) = token_re.find(raw) else {
        return String::new();
    };
    let code = token.as_str()["PEC".len()..].trim_start();
    if code.is_empty() {
        "PEC".to_string()
    } else {
        format!("PEC {code}")
    }
}

fn resolve_pec(row: &LabelledRow<'_>, source_file: &str) -> String {
    let concepto = row.concepto();
    let upper = concepto.to_uppercase();

    let raw = if upper.contains("IMPORTE") {
        pec_number(concepto)
    } else if upper.contains("MARITIMA") {
        row.sibling_containing("PEC").map(str::to_string)
    } else if !concepto.trim().is_empty() {
        pec_number(source_file)
    } else {
        None
    };

    raw.map(|value| normalize_pec(&value)).unwrap_or_default()
}

fn extract_row(source_file: &str, row: &LabelledRow<'_>) -> DuasRow {
    let concepto = row.concepto();

    let declaracion = if concepto.contains(ORDER_LABEL) {
        row.sibling_containing(DECLARATION_LABEL)
            .map(|value| value.replace(DECLARATION_PREFIX, ""))
            .and_then(|value| reduce_declaration(value.trim()))
            .unwrap_or_default()
    } else {
        String::new()
    };

    let fecha = if concepto.contains(DATE_ROW_LABEL) {
        row.sibling_containing(DATE_LABEL)
            .map(|value| value.replace(DATE_PREFIX, "").trim().to_string())
            .unwrap_or_default()
    } else {
        String::new()
    };

    let amount_for = |label: &str| {
        if concepto.contains(label) {
            row.tail_amount()
        } else {
            Cell::Missing
        }
    };

    let percepcion = if concepto.contains(ANTIDUMPING_LABEL) {
        row.sibling_containing(PERCEPTION_LABEL)
            .map_or(Cell::Missing, |value| {
                Cell::non_blank(value.replace(PERCEPTION_PREFIX, "").trim())
            })
    } else {
        Cell::Missing
    };

    DuasRow {
        source_file: source_file.to_string(),
        concepto: concepto.trim().to_string(),
        declaracion,
        fecha,
        ad_valorem: amount_for(AD_VALOREM_LABEL),
        imp_prom_municipal: amount_for(MUNICIPAL_LABEL),
        imp_gene_a_las_ventas: amount_for(SALES_TAX_LABEL),
        percepcion,
        pec: resolve_pec(row, source_file),
        error: String::new(),
    }
}

/// Extracts one row of business fields per data row of `grid`.
#[must_use]
pub fn extract_duas_rows(source_file: &str, grid: &TableGrid) -> Vec<DuasRow> {
    let headers = table_headers(grid);
    grid.data_rows()
        .iter()
        .map(|values| extract_row(source_file, &LabelledRow::new(&headers, values)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        extract_duas_rows, normalize_pec, reduce_declaration, standardize_headers, table_headers,
    };
    use crate::table::Cell;
    use comex_pdf_layout::TableGrid;
    use pretty_assertions::assert_eq;

    fn grid(rows: &[&[&str]]) -> TableGrid {
        TableGrid {
            page: 1,
            rows: rows
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
            confidence: 1.0,
        }
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    const HEADER: &[&str] = &["XML CRAMIREZ", "", "", "", "", "", "", "", "REF: 771"];

    #[test]
    fn standardizes_marker_and_reference_headers() {
        let headers = standardize_headers(&labels(&["NTAPIA 2024", "Monto", "REF: 1"]));
        assert_eq!(headers, vec!["CONCEPTO", "Monto", "Col17"]);
    }

    #[test]
    fn first_column_becomes_concepto_without_markers() {
        let headers = standardize_headers(&labels(&["Detalle", "Monto"]));
        assert_eq!(headers, vec!["CONCEPTO", "Monto"]);
    }

    #[test]
    fn blank_headers_become_positional_columns() {
        let headers = table_headers(&grid(&[HEADER, &["x"; 9]]));
        assert_eq!(
            headers,
            vec![
                "CONCEPTO", "Col", "Col_2", "Col_3", "Col_4", "Col_5", "Col_6", "Col_7", "Col17"
            ]
        );
    }

    #[test]
    fn header_is_widened_to_the_widest_row() {
        let headers = table_headers(&grid(&[&["XML"], &["a", "b", "c"]]));
        assert_eq!(headers, vec!["CONCEPTO", "Col", "Col_2"]);
    }

    #[test]
    fn reduces_declaration_numbers() {
        assert_eq!(reduce_declaration("118-0165-10-016559").as_deref(), Some("118-016559"));
        assert_eq!(
            reduce_declaration("DUA 235-2024-10-123456 X").as_deref(),
            Some("235-123456")
        );
        assert_eq!(reduce_declaration("118-0165-40-016559"), None);
    }

    #[test]
    fn normalizes_pec_spacing() {
        assert_eq!(normalize_pec("PEC123"), "PEC 123");
        assert_eq!(normalize_pec("ref PEC   77 extra"), "PEC 77");
        assert_eq!(normalize_pec("no code"), "");
    }

    #[test]
    fn extracts_fields_from_labelled_rows() {
        let table = grid(&[
            HEADER,
            &["No ORDEN 1", "No Declaración 118-0165-10-016559", "", "", "", "", "", "", ""],
            &["4.1 Ad/Valorem", "", "", "", "", "", "1.250,00", "", ""],
            &["4.5 Imp.Prom.Municipal", "", "", "", "", "", "", "210,50", ""],
            &["4.6 Imp.Gene.a las Ventas", "6.2 Fecha 15/03/2024", "", "", "", "", "", "840,00", ""],
            &["4.7 Derechos Antidumping", "Percepción IGV S/: 88,40", "", "", "", "", "", "", ""],
        ]);

        let rows = extract_duas_rows("duas-1.pdf", &table);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].declaracion, "118-016559");
        assert_eq!(rows[1].ad_valorem, Cell::text("1.250,00"));
        assert_eq!(rows[2].imp_prom_municipal, Cell::text("210,50"));
        assert_eq!(rows[3].fecha, "15/03/2024");
        assert_eq!(rows[3].imp_gene_a_las_ventas, Cell::text("840,00"));
        assert_eq!(rows[4].percepcion, Cell::text("88,40"));
        assert!(rows.iter().all(|row| row.source_file == "duas-1.pdf"));
    }

    #[test]
    fn pec_tiers_follow_concepto() {
        let table = grid(&[
            &["XML", "Detalle"],
            &["IMPORTE TOTAL PEC123", ""],
            &["VIA MARITIMA", "Ref PEC 456"],
            &["Otro", ""],
            &["", "PEC 999"],
        ]);

        let rows = extract_duas_rows("DUA PEC 789.pdf", &table);
        let pecs = rows.iter().map(|row| row.pec.as_str()).collect::<Vec<_>>();
        assert_eq!(pecs, vec!["PEC 123", "PEC 456", "PEC 789", ""]);
    }

    #[test]
    fn importe_without_code_does_not_fall_back() {
        let table = grid(&[&["XML"], &["IMPORTE TOTAL"]]);
        let rows = extract_duas_rows("PEC 789.pdf", &table);
        assert_eq!(rows[0].pec, "");
    }

    #[test]
    fn reserved_columns_are_not_scanned() {
        let table = grid(&[
            &["XML", "Fecha", "Col"],
            &["4.6 Imp.Gene.a las Ventas", "Fecha 01/01/2020", "6.2 Fecha 02/02/2024"],
        ]);
        let rows = extract_duas_rows("a.pdf", &table);
        assert_eq!(rows[0].fecha, "02/02/2024");
    }
}
