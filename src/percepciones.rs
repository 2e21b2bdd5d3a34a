//! Percepciones field extraction over the span lines of a receipt's first
//! page. The first span of a line is its text; the remaining spans are its
//! sibling columns.

use chrono::NaiveDate;
use comex_pdf_layout::LineSpans;
use regex::Regex;

use crate::models::PercepcionRow;
use crate::normalize::{normalize_label, unify_dashes};
use crate::table::Cell;

const LIQUIDATION_MARKER: &str = "NUMERO DE LIQU";
const AMOUNT_MARKER: &str = "SUNAT PERCEPCION IGV";

type Line<'a> = &'a [String];

/// Minimum shape of a candidate value: at least one digit and `min_len`
/// characters.
#[derive(Debug, Clone, Copy)]
struct Shape {
    min_len: usize,
}

const LIQUIDATION_SHAPE: Shape = Shape { min_len: 8 };
const CDA_SHAPE: Shape = Shape { min_len: 5 };

impl Shape {
    fn accepts(self, value: &str) -> bool {
        value.chars().any(|ch| ch.is_ascii_digit()) && value.chars().count() >= self.min_len
    }
}

fn clean_candidate(value: &str) -> &str {
    value.trim().trim_start_matches(':').trim()
}

type Strategy = fn(Line<'_>, Option<Line<'_>>, Shape) -> Option<String>;

fn from_sibling_column(line: Line<'_>, _next: Option<Line<'_>>, shape: Shape) -> Option<String> {
    line.get(1..)?
        .iter()
        .map(|value| clean_candidate(value))
        .find(|value| shape.accepts(value))
        .map(str::to_string)
}

fn from_after_colon(line: Line<'_>, _next: Option<Line<'_>>, shape: Shape) -> Option<String> {
    let (_, after) = line.first()?.split_once(':')?;
    let after = clean_candidate(after);
    shape.accepts(after).then(|| after.to_string())
}

fn from_next_line(_line: Line<'_>, next: Option<Line<'_>>, shape: Shape) -> Option<String> {
    next?
        .iter()
        .take(3)
        .map(|value| clean_candidate(value))
        .find(|value| shape.accepts(value))
        .map(str::to_string)
}

const LOCATE_VALUE: [Strategy; 3] = [from_sibling_column, from_after_colon, from_next_line];

fn locate_value(line: Line<'_>, next: Option<Line<'_>>, shape: Shape) -> Option<String> {
    LOCATE_VALUE
        .iter()
        .find_map(|strategy| strategy(line, next, shape))
}

/// Drops a trailing two-digit year suffix: `118-016559-26` becomes
/// `118-016559`.
#[must_use]
pub fn clean_liquidation(raw: &str) -> String {
    let value = unify_dashes(raw.trim());
    match Regex::new(r"-\s*2[3-7]$") {
        Ok(suffix_re) => suffix_re.replace(&value, "").trim().to_string(),
        Err(_) => value,
    }
}

/// Normalizes a CDA identifier. A value made of a 2-3 digit group and a
/// later group of six or more digits becomes `<group>-<group>`; anything else
/// loses its whitespace.
#[must_use]
pub fn clean_cda(raw: &str) -> String {
    let value = unify_dashes(raw.trim());
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if let Ok(shape_re) = Regex::new(r"\b(\d{2,3})\D+.*?(\d{6,})\b")
        && let Some(capture) = shape_re.captures(&collapsed)
    {
        return format!("{}-{}", &capture[1], &capture[2]);
    }
    collapsed.split_whitespace().collect()
}

fn is_cda_label(normalized: &str) -> bool {
    Regex::new(r"(?:^|[^A-Z0-9])C[\s.]*D[\s.]*A(?:[^A-Z0-9]|$)")
        .is_ok_and(|cda_re| cda_re.is_match(normalized))
}

fn reformat_date(raw: &str, formats: &[&str]) -> Option<String> {
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| date.format("%d/%m/%y").to_string())
}

/// Issue date of the receipt as `dd/mm/yy`.
fn extract_date(line: Line<'_>) -> Option<String> {
    let joined = normalize_label(&line.join(" "));
    let labelled_re = Regex::new(r"DE FECHA\s*:\s*(\d{2}[/-]\d{2}[/-]\d{4})").ok()?;
    if let Some(capture) = labelled_re.captures(&joined) {
        return reformat_date(&capture[1], &["%d/%m/%Y", "%d-%m-%Y"]);
    }

    let compact_re = Regex::new(r"\b(\d{8})\b").ok()?;
    let sibling = line.get(1)?;
    let capture = compact_re.captures(sibling)?;
    reformat_date(&capture[1], &["%Y%m%d"])
}

fn extract_line(source_file: &str, line: Line<'_>, next: Option<Line<'_>>) -> PercepcionRow {
    let text = line.first().map(|text| normalize_label(text)).unwrap_or_default();

    let no_liquidacion = if text.contains(LIQUIDATION_MARKER) {
        locate_value(line, next, LIQUIDATION_SHAPE)
            .map(|value| clean_liquidation(&value))
            .unwrap_or_default()
    } else {
        String::new()
    };

    let cda = if is_cda_label(&text) {
        locate_value(line, next, CDA_SHAPE)
            .map(|value| clean_cda(&value))
            .unwrap_or_default()
    } else {
        String::new()
    };

    let monto = if text.contains(AMOUNT_MARKER) {
        next.and_then(<[String]>::first)
            .map_or(Cell::Missing, |raw| Cell::non_blank(raw.trim()))
    } else {
        Cell::Missing
    };

    PercepcionRow {
        source_file: source_file.to_string(),
        no_liquidacion,
        cda,
        fecha: extract_date(line).unwrap_or_default(),
        monto,
        error: String::new(),
    }
}

/// Extracts one row of business fields per span line.
#[must_use]
pub fn extract_percepcion_rows(source_file: &str, lines: &LineSpans) -> Vec<PercepcionRow> {
    lines
        .lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let next = lines.lines.get(index + 1).map(Vec::as_slice);
            extract_line(source_file, line, next)
        })
        .collect()
}
