//! Final column layout of both pipelines.

use crate::models::{
    AccountingCodes, DUAS_COLUMNS, DuasRecord, PERCEPCIONES_COLUMNS, PercepcionRecord,
};
use crate::normalize::compact_date;
use crate::table::{Cell, Table};

/// Reorders `table` so that the `schema` columns it has come first, in schema
/// order, followed by its other columns in their original order. Schema
/// columns the table lacks are left out.
#[must_use]
pub fn organize_columns(table: &Table, schema: &[&str]) -> Table {
    let mut order = schema
        .iter()
        .filter_map(|column| table.column_index(column))
        .collect::<Vec<_>>();
    let extras = (0..table.headers.len())
        .filter(|index| !order.contains(index))
        .collect::<Vec<_>>();
    order.extend(extras);

    Table {
        headers: order.iter().map(|&index| table.headers[index].clone()).collect(),
        rows: table
            .rows
            .iter()
            .map(|row| {
                order
                    .iter()
                    .map(|&index| row.get(index).cloned().unwrap_or_default())
                    .collect()
            })
            .collect(),
    }
}

/// Accounting code columns; blank text when the record carries no codes.
fn code_cells(codes: Option<&AccountingCodes>, fields: [CodeField; 5]) -> Vec<Cell> {
    fields
        .iter()
        .map(|field| Cell::text(codes.map_or("", |codes| field.of(codes))))
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum CodeField {
    Supplier,
    Currency,
    Authorization,
    InvoiceType,
    Account,
}

impl CodeField {
    fn of(self, codes: &AccountingCodes) -> &str {
        match self {
            Self::Supplier => &codes.supplier,
            Self::Currency => &codes.currency,
            Self::Authorization => &codes.authorization,
            Self::InvoiceType => &codes.invoice_type,
            Self::Account => &codes.account,
        }
    }
}

/// DUAS records in the order their fields are produced. The `Tasa` column
/// is present only when the records carry a rate.
#[must_use]
pub fn duas_table(records: &[DuasRecord]) -> Table {
    let with_rate = records.iter().any(|record| record.tasa.is_some());
    let mut headers = vec![
        "source_file",
        "Declaracion",
        "Fecha",
        "Ad_Valorem",
        "Imp_Prom_Municipal",
        "Imp_Gene_a_las_Ventas",
        "Percepcion",
        "PEC",
        "Error",
    ];
    if with_rate {
        headers.push("Tasa");
    }
    headers.extend([
        "IGV",
        "COD PROVEEDOR",
        "COD Moneda",
        "Cód. de Autorización",
        "Tipo de Factura",
        "Cuenta",
    ]);

    let mut table = Table::new(headers);
    for record in records {
        let mut row = vec![
            Cell::text(&record.source_file),
            Cell::text(&record.declaracion),
            Cell::text(&record.fecha),
            Cell::number(record.ad_valorem),
            Cell::number(record.imp_prom_municipal),
            Cell::number(record.imp_gene_a_las_ventas),
            Cell::number(record.percepcion),
            Cell::text(&record.pec),
            Cell::text(&record.error),
        ];
        if with_rate {
            row.push(Cell::number(record.tasa.flatten()));
        }
        row.push(Cell::Number(record.igv));
        row.extend(code_cells(
            record.codes.as_ref(),
            [
                CodeField::Supplier,
                CodeField::Currency,
                CodeField::Authorization,
                CodeField::InvoiceType,
                CodeField::Account,
            ],
        ));
        table.push_row(row);
    }
    table
}

/// Publishes DUAS records in their fixed schema with `ddmmyy` dates.
#[must_use]
pub fn organize_duas(records: &[DuasRecord]) -> Table {
    let mut table = organize_columns(&duas_table(records), &DUAS_COLUMNS);
    table.map_column("Fecha", |cell| Cell::text(compact_date(&cell.render())));
    table
}

/// Percepciones records in the order their fields are produced.
#[must_use]
pub fn percepciones_table(records: &[PercepcionRecord]) -> Table {
    let mut table = Table::new([
        "Source_File",
        "No_Liquidacion",
        "CDA",
        "Fecha",
        "Monto",
        "Error",
        "Tasa",
        "COD PROVEEDOR",
        "COD MONEDA",
        "Cód. de Autorización",
        "Cuenta",
        "Tipo de Factura",
    ]);
    for record in records {
        let mut row = vec![
            Cell::text(&record.source_file),
            Cell::text(&record.no_liquidacion),
            Cell::text(&record.cda),
            Cell::text(&record.fecha),
            Cell::number(record.monto),
            Cell::text(&record.error),
            Cell::Number(record.tasa),
        ];
        row.extend(code_cells(
            record.codes.as_ref(),
            [
                CodeField::Supplier,
                CodeField::Currency,
                CodeField::Authorization,
                CodeField::Account,
                CodeField::InvoiceType,
            ],
        ));
        table.push_row(row);
    }
    table
}

#[must_use]
pub fn organize_percepciones(records: &[PercepcionRecord]) -> Table {
    organize_columns(&percepciones_table(records), &PERCEPCIONES_COLUMNS)
}
