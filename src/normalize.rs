//! String cleanup and locale-aware coercion shared by both pipelines.

use chrono::NaiveDate;

use crate::table::Cell;

// Two-digit years go first: `%Y` would also accept `24` as the year 24.
const DAY_FIRST_FORMATS: [&str; 6] = [
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
];

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses an amount written with either `.` or `,` as decimal separator and
/// rounds it to two decimals.
///
/// When both separators appear the rightmost one is the decimal point. A
/// lone separator is a decimal point unless it repeats, or unless it is a
/// single comma followed by exactly three digits (`1,250`). Anything other
/// than digits, separators and a leading sign yields `None`.
#[must_use]
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    if body.is_empty()
        || !body.chars().any(|ch| ch.is_ascii_digit())
        || !body.chars().all(|ch| ch.is_ascii_digit() || ch == '.' || ch == ',')
    {
        return None;
    }

    let last_dot = body.rfind('.');
    let last_comma = body.rfind(',');
    let canonical = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            if dot > comma {
                body.replace(',', "")
            } else {
                body.replace('.', "").replace(',', ".")
            }
        }
        (None, Some(comma)) => {
            let commas = body.matches(',').count();
            let digits_after = body.len() - comma - 1;
            if commas > 1 || digits_after == 3 {
                body.replace(',', "")
            } else {
                body.replace(',', ".")
            }
        }
        (Some(_), None) => {
            if body.matches('.').count() > 1 {
                body.replace('.', "")
            } else {
                body.to_string()
            }
        }
        (None, None) => body.to_string(),
    };

    let value = canonical.parse::<f64>().ok()?;
    let value = if negative { -value } else { value };
    Some(round2(value))
}

/// Turns raw amount text into a number, or `Missing` when it does not parse.
/// Cells that are already numbers or missing pass through.
#[must_use]
pub fn amount_cell(cell: &Cell) -> Cell {
    match cell {
        Cell::Text(raw) => Cell::number(parse_amount(raw)),
        other => other.clone(),
    }
}

fn strip_diacritic(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}

/// Canonical form used for label matching: zero-width characters dropped,
/// no-break spaces treated as spaces, whitespace collapsed, accents removed,
/// upper-cased.
#[must_use]
pub fn normalize_label(raw: &str) -> String {
    let cleaned = raw
        .chars()
        .filter(|ch| !matches!(ch, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'))
        .map(|ch| match ch {
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => ' ',
            other => strip_diacritic(other),
        })
        .collect::<String>();

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Replaces the Unicode dash family with an ASCII hyphen.
#[must_use]
pub fn unify_dashes(raw: &str) -> String {
    raw.chars()
        .map(|ch| match ch {
            '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => '-',
            other => other,
        })
        .collect()
}

/// Parses a calendar date, day first.
#[must_use]
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// `dd/mm/yyyy` or `dd-mm-yyyy` becomes `ddmmyy`; anything else keeps its
/// text with slashes removed.
#[must_use]
pub fn compact_date(raw: &str) -> String {
    ["%d/%m/%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map_or_else(|| raw.replace('/', ""), |date| date.format("%d%m%y").to_string())
}
