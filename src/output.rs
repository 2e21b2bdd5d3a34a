use std::io::Write;
use std::str::FromStr;

use csv::WriterBuilder;
use serde_json::{Map, Value};

use crate::error::ComexError;
use crate::table::{Cell, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("invalid output format '{other}', expected csv or json")),
        }
    }
}

/// Writes `table` as delimited text. Missing values are empty fields.
///
/// # Errors
///
/// Fails when the underlying writer fails.
pub fn write_csv<W: Write>(writer: W, table: &Table, delimiter: u8) -> Result<(), ComexError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::render))?;
    }
    writer.flush()?;
    Ok(())
}

/// # Errors
///
/// Fails when the table cannot be rendered as UTF-8.
pub fn write_csv_to_string(table: &Table, delimiter: u8) -> Result<String, ComexError> {
    let mut bytes = Vec::new();
    write_csv(&mut bytes, table, delimiter)?;
    String::from_utf8(bytes)
        .map_err(|error| ComexError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

/// One JSON object per row, keyed by header in column order. Missing values
/// are `null`.
#[must_use]
pub fn table_to_json(table: &Table) -> Value {
    Value::Array(
        table
            .rows
            .iter()
            .map(|row| {
                let object = table
                    .headers
                    .iter()
                    .zip(row)
                    .map(|(header, cell)| {
                        (header.clone(), serde_json::to_value(cell).unwrap_or(Value::Null))
                    })
                    .collect::<Map<_, _>>();
                Value::Object(object)
            })
            .collect(),
    )
}

/// # Errors
///
/// Fails when the writer fails.
pub fn write_json<W: Write>(writer: W, table: &Table) -> Result<(), ComexError> {
    serde_json::to_writer_pretty(writer, &table_to_json(table))?;
    Ok(())
}
