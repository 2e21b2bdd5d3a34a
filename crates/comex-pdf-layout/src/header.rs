use std::collections::{HashMap, HashSet};

/// Label given to blank header cells.
pub const BLANK_HEADER: &str = "Col";

/// Makes header labels unique by position: blank labels become `Col`, and a
/// label already seen gets its column index appended (`Col_7`).
#[must_use]
pub fn unique_headers_by_position(headers: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());

    for (index, header) in headers.iter().enumerate() {
        let trimmed = header.trim();
        let mut label = if trimmed.is_empty() {
            BLANK_HEADER.to_string()
        } else {
            trimmed.to_string()
        };
        if seen.contains(&label) {
            label = format!("{label}_{index}");
        }
        seen.insert(label.clone());
        out.push(label);
    }

    out
}

/// Makes header labels unique by occurrence: the second `Venta` becomes
/// `Venta.1`, the third `Venta.2`.
#[must_use]
pub fn unique_headers_by_count(headers: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::with_capacity(headers.len());

    for header in headers {
        let count = counts.entry(header.as_str()).or_insert(0);
        if *count == 0 {
            out.push(header.clone());
        } else {
            out.push(format!("{header}.{count}"));
        }
        *count += 1;
    }

    out
}
