//! Date to sell-rate ("Venta") reference table used by the DUAS enricher.

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use comex_pdf_layout::unique_headers_by_count;
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::error::ComexError;
use crate::normalize::parse_day_first;
use crate::reader::DocumentReader;

const DATE_COLUMN: &str = "Data";
const RATE_COLUMN: &str = "Venta";
const DAY_COLUMN: &str = "Dia";

fn parse_rate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite())
}

/// Read-only after loading. A date with no entry has no rate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExchangeRateTable {
    rates: BTreeMap<NaiveDate, f64>,
}

impl ExchangeRateTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rate of `date`; a later insert for the same date wins.
    pub fn insert(&mut self, date: NaiveDate, rate: f64) {
        self.rates.insert(date, rate);
    }

    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.rates.get(&date).copied()
    }

    /// Rate of a raw day-first date string.
    #[must_use]
    pub fn rate_for(&self, raw_date: &str) -> Option<f64> {
        parse_day_first(raw_date).and_then(|date| self.get(date))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Entries in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.rates.iter().map(|(date, rate)| (*date, *rate))
    }

    pub fn merge(&mut self, other: Self) {
        self.rates.extend(other.rates);
    }

    /// Loads a `Data,Venta` CSV. Rows whose date or rate does not parse are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Fails on malformed CSV or when either column is absent.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, ComexError> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = reader.headers()?.clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| ComexError::RateTable(format!("missing '{name}' column")))
        };
        let date_index = position(DATE_COLUMN)?;
        let rate_index = position(RATE_COLUMN)?;

        let mut table = Self::new();
        for record in reader.records() {
            let record = record?;
            let date = record.get(date_index).and_then(parse_day_first);
            let rate = record.get(rate_index).and_then(parse_rate);
            match (date, rate) {
                (Some(date), Some(rate)) => table.insert(date, rate),
                _ => debug!(?record, "skipping unparseable exchange-rate row"),
            }
        }
        Ok(table)
    }

    /// # Errors
    ///
    /// Fails when the file cannot be opened or is not a valid rate CSV.
    pub fn from_csv_path(path: &Path) -> Result<Self, ComexError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Loads one month of a sell-rate grid whose header repeats
    /// `Dia | Compra | Venta` blocks side by side. Each `Dia` column is paired
    /// with the `Venta` column of the same block.
    ///
    /// # Errors
    ///
    /// Fails when the month is out of range or the header has no
    /// `Dia`/`Venta` pair.
    pub fn from_month_grid(year: i32, month: u32, rows: &[Vec<String>]) -> Result<Self, ComexError> {
        if !(1..=12).contains(&month) {
            return Err(ComexError::RateTable(format!("month {month} is out of range")));
        }
        let Some((header, data)) = rows.split_first() else {
            return Err(ComexError::RateTable("rate grid is empty".to_string()));
        };

        let labels = unique_headers_by_count(
            &header
                .iter()
                .map(|label| label.trim().to_string())
                .collect::<Vec<_>>(),
        );
        let pairs = labels
            .iter()
            .enumerate()
            .filter_map(|(day_index, label)| {
                let suffix = label.strip_prefix(DAY_COLUMN)?;
                let rate_label = format!("{RATE_COLUMN}{suffix}");
                let rate_index = labels.iter().position(|other| *other == rate_label)?;
                Some((day_index, rate_index))
            })
            .collect::<Vec<_>>();
        if pairs.is_empty() {
            return Err(ComexError::RateTable(
                "no Dia/Venta column pair in rate grid".to_string(),
            ));
        }

        let mut table = Self::new();
        for row in data {
            for &(day_index, rate_index) in &pairs {
                let Some(day) = row.get(day_index).map(|day| day.trim()) else {
                    continue;
                };
                if day.is_empty() || !day.chars().all(|ch| ch.is_ascii_digit()) {
                    continue;
                }
                let raw_date = format!("{day:0>2}/{month:02}/{year}");
                let date = NaiveDate::parse_from_str(&raw_date, "%d/%m/%Y").ok();
                let rate = row.get(rate_index).and_then(|rate| parse_rate(rate));
                if let (Some(date), Some(rate)) = (date, rate) {
                    table.insert(date, rate);
                }
            }
        }
        Ok(table)
    }

    /// Loads the month grid printed on the first page of a sell-rate PDF.
    ///
    /// # Errors
    ///
    /// Fails when the PDF cannot be read, holds no table, or the table is not
    /// a rate grid.
    pub fn from_month_pdf(
        reader: &impl DocumentReader,
        pdf: &[u8],
        year: i32,
        month: u32,
    ) -> Result<Self, ComexError> {
        let grid = reader
            .read_table(pdf)?
            .ok_or_else(|| ComexError::RateTable("no table in rate PDF".to_string()))?;
        Self::from_month_grid(year, month, &grid.rows)
    }

    /// Writes the table as a `Data,Venta` CSV with `dd/mm/yyyy` dates.
    ///
    /// # Errors
    ///
    /// Fails when the writer fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ComexError> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record([DATE_COLUMN, RATE_COLUMN])?;
        for (date, rate) in self.iter() {
            writer.write_record([date.format("%d/%m/%Y").to_string(), rate.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl FromIterator<(NaiveDate, f64)> for ExchangeRateTable {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
