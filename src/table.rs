use serde::Serialize;

/// One output value. `Missing` is a true absent marker, distinct from an
/// empty string.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(f64),
    #[default]
    Missing,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// `Missing` for `None`, a number otherwise.
    #[must_use]
    pub fn number(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }

    /// `Missing` for an empty or whitespace-only value, text otherwise.
    pub fn non_blank(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Missing
        } else {
            Self::Text(value)
        }
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::Number(_) => false,
            Self::Missing => true,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Field rendering used by delimited output.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => format_number(*value),
            Self::Missing => String::new(),
        }
    }
}

/// Amounts print with two decimals; values that need more precision, such
/// as exchange rates, print in full.
#[allow(clippy::float_cmp)]
fn format_number(value: f64) -> String {
    let two_places = format!("{value:.2}");
    if two_places.parse::<f64>().is_ok_and(|parsed| parsed == value) {
        two_places
    } else {
        value.to_string()
    }
}

/// A flat result table with named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding it with `Missing` up to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Missing);
        self.rows.push(row);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Applies `map` to every cell of `column`. Returns `false` when the
    /// column does not exist.
    pub fn map_column(&mut self, column: &str, mut map: impl FnMut(&Cell) -> Cell) -> bool {
        let Some(index) = self.column_index(column) else {
            return false;
        };
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = map(cell);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, Table};

    #[test]
    fn renders_amounts_with_two_decimals() {
        assert_eq!(Cell::Number(100.0).render(), "100.00");
        assert_eq!(Cell::Number(8428.74).render(), "8428.74");
        assert_eq!(Cell::Number(3.718).render(), "3.718");
        assert_eq!(Cell::Missing.render(), "");
    }

    #[test]
    fn blank_cells() {
        assert!(Cell::text("  ").is_blank());
        assert!(Cell::Missing.is_blank());
        assert!(!Cell::Number(0.0).is_blank());
        assert_eq!(Cell::non_blank(" "), Cell::Missing);
    }

    #[test]
    fn pads_short_rows_and_maps_columns() {
        let mut table = Table::new(["Fecha", "Monto"]);
        table.push_row(vec![Cell::text("15/03/24")]);
        assert_eq!(table.cell(0, "Monto"), Some(&Cell::Missing));

        let mapped = table.map_column("Fecha", |cell| Cell::text(cell.render().replace('/', "")));
        assert!(mapped);
        assert_eq!(table.cell(0, "Fecha"), Some(&Cell::text("150324")));
        assert!(!table.map_column("Tasa", Clone::clone));
    }
}
