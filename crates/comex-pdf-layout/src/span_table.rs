//! Table detection over positioned spans. Every span keeps its place: a
//! column slot is derived from the x-clusters of the table, and cells that
//! hold no text stay in the row as blanks.

use crate::model::{DetectedTable, TextSpan};

/// Short lines kept inside a table when another wide line follows them.
const MAX_BRIDGED_LINES: usize = 2;

/// Starts closer than this many ems belong to the same column.
const COLUMN_JOIN_EM: f32 = 2.0;

const MAX_SLOTS: usize = 48;

/// Left edges of the columns of `lines`, sorted.
fn column_starts(lines: &[&[TextSpan]]) -> Vec<f32> {
    let mut spans = lines.iter().flat_map(|line| line.iter()).collect::<Vec<_>>();
    spans.sort_by(|left, right| left.x.total_cmp(&right.x));

    // (start, reach) of each cluster
    let mut starts: Vec<(f32, f32)> = Vec::new();
    for span in spans {
        let reach = span.x + COLUMN_JOIN_EM * span.font_size;
        match starts.last_mut() {
            Some((_, last_reach)) if span.x <= *last_reach => {
                *last_reach = last_reach.max(reach);
            }
            _ => starts.push((span.x, reach)),
        }
    }
    starts.into_iter().map(|(start, _)| start).collect()
}

/// Slot index of every column start. Wide gaps between two columns get empty
/// slots, counted in multiples of the narrowest column pitch.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn slot_indexes(starts: &[f32]) -> Vec<usize> {
    let pitch = starts
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold(f32::INFINITY, f32::min);

    let mut slots = Vec::with_capacity(starts.len());
    let mut slot = 0_usize;
    for (index, start) in starts.iter().enumerate() {
        if index > 0 {
            let steps = ((start - starts[index - 1]) / pitch).round().max(1.0) as usize;
            slot += steps;
        }
        slots.push(slot);
    }

    if slots.last().is_some_and(|last| *last >= MAX_SLOTS) {
        (0..starts.len()).collect()
    } else {
        slots
    }
}

/// Column of `span`: the last column starting at or left of it, or the first
/// one when it starts left of every column.
fn column_of(starts: &[f32], span: &TextSpan) -> usize {
    let reach = COLUMN_JOIN_EM * span.font_size;
    starts
        .iter()
        .rposition(|start| *start <= span.x + reach * 0.5)
        .unwrap_or(0)
}

/// Lays `lines` out on a slot grid. Returns the rows and how many spans had
/// to share a slot with another span.
fn slot_rows(lines: &[&[TextSpan]]) -> (Vec<Vec<String>>, usize) {
    let starts = column_starts(lines);
    let slots = slot_indexes(&starts);
    let width = slots.last().map_or(0, |last| last + 1);

    let mut collisions = 0;
    let rows = lines
        .iter()
        .map(|line| {
            let mut row = vec![String::new(); width];
            for span in *line {
                let cell = &mut row[slots[column_of(&starts, span)]];
                if !cell.is_empty() {
                    collisions += 1;
                    cell.push(' ');
                }
                cell.push_str(&span.text);
            }
            row
        })
        .collect();
    (rows, collisions)
}

#[allow(clippy::cast_precision_loss)]
fn close_table(page: u32, run: &mut Vec<&[TextSpan]>, tables: &mut Vec<DetectedTable>) {
    let lines = std::mem::take(run);
    if lines.len() < 2 {
        return;
    }

    let (rows, collisions) = slot_rows(&lines);
    let spans = lines.iter().map(|line| line.len()).sum::<usize>();
    tables.push(DetectedTable {
        page,
        rows,
        confidence: (1.0 - collisions as f32 / spans as f32).clamp(0.0, 1.0),
    });
}

/// Groups runs of lines with at least `min_cols` spans into tables of two or
/// more rows. Up to two narrower lines between wide ones stay in the table
/// as rows of their own.
pub(crate) fn detect_span_tables(
    page: u32,
    lines: &[Vec<TextSpan>],
    min_cols: usize,
) -> Vec<DetectedTable> {
    let mut tables = Vec::new();
    let mut run: Vec<&[TextSpan]> = Vec::new();
    let mut pending: Vec<&[TextSpan]> = Vec::new();

    for line in lines {
        if line.len() >= min_cols {
            run.append(&mut pending);
            run.push(line);
        } else if !run.is_empty() && pending.len() < MAX_BRIDGED_LINES {
            pending.push(line);
        } else {
            pending.clear();
            close_table(page, &mut run, &mut tables);
        }
    }
    close_table(page, &mut run, &mut tables);

    tables
}
