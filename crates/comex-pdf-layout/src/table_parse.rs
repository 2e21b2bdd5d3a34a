use std::collections::HashMap;

fn collapse_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pieces of `line` separated by runs of two or more whitespace characters.
fn split_on_gaps(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut gap_start = 0;
    let mut gap_len = 0_usize;

    for (index, ch) in line.char_indices() {
        if ch.is_whitespace() {
            if gap_len == 0 {
                gap_start = index;
            }
            gap_len += 1;
            continue;
        }
        if gap_len >= 2 {
            pieces.push(&line[start..gap_start]);
            start = index;
        }
        gap_len = 0;
    }
    pieces.push(&line[start..]);
    pieces
}

/// Cells of a text line. A line holding tabs is split on tabs only; any other
/// line is split on runs of two or more spaces. Blank cells are dropped.
pub(crate) fn split_line_into_cells(line: &str) -> Vec<String> {
    let pieces = if line.contains('\t') {
        line.split('\t').collect()
    } else {
        split_on_gaps(line)
    };
    pieces
        .into_iter()
        .map(collapse_spaces)
        .filter(|cell| !cell.is_empty())
        .collect()
}

/// One cell per word, for space-aligned grids printed with single spaces.
pub(crate) fn split_on_words(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Pads every row with blank cells up to `width`.
pub(crate) fn pad_rows(rows: Vec<Vec<String>>, width: usize) -> Vec<Vec<String>> {
    rows.into_iter()
        .map(|mut row| {
            if row.len() < width {
                row.resize(width, String::new());
            }
            row
        })
        .collect()
}

/// Most frequent row width; the wider one wins a tie.
pub(crate) fn modal_width(rows: &[Vec<String>]) -> usize {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.len()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(width, count)| (count, width))
        .map_or(0, |(width, _)| width)
}
