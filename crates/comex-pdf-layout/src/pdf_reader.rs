use std::collections::BTreeMap;
use std::panic;

use encoding_rs::{UTF_16BE, WINDOWS_1252};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::error::LayoutError;
use crate::model::{PageText, TextSpan};
use crate::table_parse::{split_line_into_cells, split_on_words};

/// Splits extracted text on form feeds, one entry per page.
fn split_text_into_pages(raw_text: &str) -> Vec<String> {
    let raw_text = raw_text.strip_suffix('\u{000C}').unwrap_or(raw_text);
    if raw_text.is_empty() {
        return Vec::new();
    }
    raw_text.split('\u{000C}').map(str::to_string).collect()
}

/// Text that is mostly replacement or control characters, or that carries
/// pdf-extract's marker for an unsupported CID encoding.
fn looks_decoding_broken(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let (mut total, mut replacement, mut control) = (0_usize, 0_usize, 0_usize);
    for ch in text.chars() {
        total += 1;
        if ch == '\u{FFFD}' {
            replacement += 1;
        } else if ch.is_control() && !matches!(ch, '\n' | '\r' | '\t') {
            control += 1;
        }
    }
    total > 0 && (replacement * 8 > total || control * 5 > total)
}

fn utf16_text(raw: &[u8]) -> Option<String> {
    let (text, had_errors) = UTF_16BE.decode_without_bom_handling(raw);
    (!had_errors && !text.is_empty()).then(|| text.into_owned())
}

fn windows_1252_text(raw: &[u8]) -> Option<String> {
    let (text, _, had_errors) = WINDOWS_1252.decode(raw);
    (!had_errors && !text.is_empty()).then(|| text.into_owned())
}

/// Decodes a string operand with the font's declared encoding. A broken
/// result is retried as UTF-16BE (on a BOM or a Unicode encoding name), then
/// as Windows-1252 for WinAnsi fonts, then as lossy UTF-8.
fn decode_pdf_bytes(encoding: Option<&str>, bytes: &[u8]) -> String {
    let declared = Document::decode_text(encoding, bytes);
    if !looks_decoding_broken(&declared) {
        return declared;
    }

    let name = encoding.map(str::to_ascii_lowercase).unwrap_or_default();
    let unicode_named = ["utf16", "ucs2", "identity-h", "unicode"]
        .iter()
        .any(|marker| name.contains(marker));
    let winansi_named = name.contains("winansi") || name.contains("1252");

    bytes
        .strip_prefix(&[0xFE, 0xFF])
        .and_then(utf16_text)
        .or_else(|| unicode_named.then(|| utf16_text(bytes)).flatten())
        .or_else(|| winansi_named.then(|| windows_1252_text(bytes)).flatten())
        .unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
}

fn extraction_quality_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return i64::MIN / 4;
    }

    let mut non_empty_lines = 0_i64;
    let mut multi_cell_lines = 0_i64;
    let mut figure_lines = 0_i64;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        non_empty_lines += 1;

        if split_line_into_cells(line).len() >= 2 || split_on_words(line).len() >= 3 {
            multi_cell_lines += 1;
        }

        // dates (15/03/2024) and amounts (1,250.00)
        let has_digit = line.chars().any(|ch| ch.is_ascii_digit());
        if has_digit && (line.contains('/') || line.contains(',')) {
            figure_lines += 1;
        }
    }

    let broken_penalty = if looks_decoding_broken(text) { 800 } else { 0 };
    multi_cell_lines * 50 + figure_lines * 15 + non_empty_lines - broken_penalty
}

fn choose_best_text(candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .max_by_key(|text| extraction_quality_score(text))
        .cloned()
}

fn collect_text(text: &mut String, encoding: Option<&str>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => {
                text.push_str(&decode_pdf_bytes(encoding, bytes));
            }
            Object::Array(items) => {
                collect_text(text, encoding, items);
            }
            Object::Integer(value) => {
                if *value < -100 {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn operand_f32(operands: &[Object], index: usize) -> Option<f32> {
    match operands.get(index)? {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

fn page_encodings(document: &Document, page_id: ObjectId) -> BTreeMap<Vec<u8>, &str> {
    document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect()
}

/// Average advance of one glyph, in ems. Exact for Courier and close enough
/// for proportional fonts to tell a word gap from a column gap.
const GLYPH_WIDTH_EM: f32 = 0.6;

/// Largest horizontal gap, in ems, between two runs on one baseline that
/// still belong to the same span: a word space plus some slack.
const SPAN_JOIN_GAP_EM: f32 = 1.0;

/// Text state tracked through the positioning operators. `line_x`/`line_y`
/// is the start of the current text line; `x` advances as text is shown.
/// Only the translation and the uniform scale of `Tm` are kept.
#[derive(Debug, Clone, Copy)]
struct TextCursor {
    line_x: f32,
    line_y: f32,
    x: f32,
    leading: f32,
    font_size: f32,
    scale: f32,
}

impl Default for TextCursor {
    fn default() -> Self {
        Self {
            line_x: 0.0,
            line_y: 0.0,
            x: 0.0,
            leading: 0.0,
            font_size: 12.0,
            scale: 1.0,
        }
    }
}

impl TextCursor {
    fn begin_text(&mut self) {
        *self = Self {
            leading: self.leading,
            font_size: self.font_size,
            ..Self::default()
        };
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_x += tx * self.scale;
        self.line_y += ty * self.scale;
        self.x = self.line_x;
    }

    fn set_matrix(&mut self, scale: f32, e: f32, f: f32) {
        self.scale = scale;
        self.line_x = e;
        self.line_y = f;
        self.x = e;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn glyph_width(&self) -> f32 {
        GLYPH_WIDTH_EM * self.font_size * self.scale
    }

    /// Span for `text` drawn at the cursor, which then advances past it.
    #[allow(clippy::cast_precision_loss)]
    fn show(&mut self, text: &str) -> Option<TextSpan> {
        let glyph = self.glyph_width();
        let leading_blanks = text.chars().take_while(|ch| ch.is_whitespace()).count();
        let start = self.x + leading_blanks as f32 * glyph;
        self.x += text.chars().count() as f32 * glyph;

        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| TextSpan {
            text: trimmed.to_string(),
            x: start,
            y: self.line_y,
            width: trimmed.chars().count() as f32 * glyph,
            font_size: self.font_size * self.scale,
        })
    }
}

pub(crate) fn extract_page_spans(document: &Document, page_id: ObjectId) -> Option<Vec<TextSpan>> {
    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let encodings = page_encodings(document, page_id);

    let mut spans = Vec::new();
    let mut cursor = TextCursor::default();
    let mut current_encoding = None;

    let mut show = |cursor: &mut TextCursor, encoding: Option<&str>, operands: &[Object]| {
        let mut text = String::new();
        collect_text(&mut text, encoding, operands);
        spans.extend(cursor.show(&text));
    };

    for operation in &content.operations {
        let operands = operation.operands.as_slice();
        match operation.operator.as_str() {
            "BT" => cursor.begin_text(),
            "Tf" => {
                if let Some(font_name) = operands.first().and_then(|operand| operand.as_name().ok())
                {
                    current_encoding = encodings.get(font_name).copied();
                }
                if let Some(size) = operand_f32(operands, 1) {
                    cursor.font_size = size.abs();
                }
            }
            "TL" => {
                if let Some(leading) = operand_f32(operands, 0) {
                    cursor.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (operand_f32(operands, 0), operand_f32(operands, 1)) {
                    if operation.operator == "TD" {
                        cursor.leading = -ty;
                    }
                    cursor.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let (Some(a), Some(b), Some(e), Some(f)) = (
                    operand_f32(operands, 0),
                    operand_f32(operands, 1),
                    operand_f32(operands, 4),
                    operand_f32(operands, 5),
                ) {
                    cursor.set_matrix(a.hypot(b), e, f);
                }
            }
            "T*" => cursor.next_line(),
            "Tj" | "TJ" => show(&mut cursor, current_encoding, operands),
            "'" => {
                cursor.next_line();
                show(&mut cursor, current_encoding, operands);
            }
            "\"" => {
                cursor.next_line();
                show(&mut cursor, current_encoding, operands.get(2..).unwrap_or_default());
            }
            _ => {}
        }
    }

    Some(spans)
}

/// Whether `next`, starting at or right of `span` on the same line, continues
/// it: the gap between them is at most one em.
fn continues(span: &TextSpan, next: &TextSpan) -> bool {
    let size = span.font_size.max(next.font_size);
    next.x - span.right() <= SPAN_JOIN_GAP_EM * size
}

/// Appends `next` to `span`, with a space when the two do not touch.
fn join_span(span: &mut TextSpan, next: &TextSpan) {
    let gap = next.x - span.right();
    if gap > 0.25 * GLYPH_WIDTH_EM * span.font_size {
        span.text.push(' ');
    }
    span.text.push_str(&next.text);
    span.width = span.right().max(next.right()) - span.x;
}

/// Groups spans into lines in drawing order: a span whose baseline is within
/// `tolerance` of the current line joins it, anything else starts a new line.
/// Spans of a line are ordered left to right, and runs drawn a word or a
/// kerned chunk at a time are joined back into one span.
pub(crate) fn group_spans_into_lines(spans: &[TextSpan], tolerance: f32) -> Vec<Vec<TextSpan>> {
    let mut lines: Vec<(f32, Vec<&TextSpan>)> = Vec::new();

    for span in spans {
        match lines.last_mut() {
            Some((line_y, members)) if (span.y - *line_y).abs() <= tolerance => {
                members.push(span);
            }
            _ => lines.push((span.y, vec![span])),
        }
    }

    lines
        .into_iter()
        .map(|(_, mut members)| {
            members.sort_by(|left, right| left.x.total_cmp(&right.x));
            let mut joined: Vec<TextSpan> = Vec::new();
            for span in members {
                match joined.last_mut() {
                    Some(last) if continues(last, span) => join_span(last, span),
                    _ => joined.push(span.clone()),
                }
            }
            joined
        })
        .collect()
}

fn extract_text_from_page_content(document: &Document, page_id: ObjectId) -> Option<String> {
    let raw_content = document.get_page_content(page_id).ok()?;
    let content = Content::decode(&raw_content).ok()?;
    let encodings = page_encodings(document, page_id);

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_encoding = None;
    for operation in content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                if let Some(font_name) = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                {
                    current_encoding = encodings.get(font_name).copied();
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                collect_text(&mut current, current_encoding, &operation.operands);
                current.push(' ');
            }
            "T*" | "Td" | "TD" | "Tm" | "ET" => {
                if !current.trim().is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn pdf_extract_first_page(pdf: &[u8], page_count: usize) -> Option<String> {
    // pdf-extract panics on some malformed font programs
    let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(pdf))
        .ok()?
        .ok()?;
    let pages = split_text_into_pages(&text);
    if pages.len() == page_count {
        pages.into_iter().next()
    } else {
        Some(text)
    }
}

pub(crate) fn load_document(pdf: &[u8]) -> Result<Document, LayoutError> {
    Ok(Document::load_mem(pdf)?)
}

pub(crate) fn first_page(document: &Document) -> Result<(u32, ObjectId), LayoutError> {
    document
        .get_pages()
        .into_iter()
        .next()
        .ok_or(LayoutError::NoPages)
}

/// Best plain-text rendering of the first page across the available
/// extraction back ends.
pub(crate) fn first_page_text(pdf: &[u8], document: &Document) -> Result<PageText, LayoutError> {
    let (page_number, page_id) = first_page(document)?;
    let page_count = document.get_pages().len();

    let mut candidates = Vec::new();
    if let Some(text) = pdf_extract_first_page(pdf, page_count).filter(|t| !t.trim().is_empty()) {
        candidates.push(text);
    }
    if let Some(text) = extract_text_from_page_content(document, page_id) {
        candidates.push(text);
    }
    if let Some(text) = document
        .extract_text(&[page_number])
        .ok()
        .filter(|text| !text.trim().is_empty())
    {
        candidates.push(text);
    }

    let text = choose_best_text(&candidates).ok_or_else(|| {
        LayoutError::PdfExtract(format!("no text could be extracted from page {page_number}"))
    })?;
    Ok(PageText { page_number, text })
}

#[cfg(test)]
mod tests {
    use super::{decode_pdf_bytes, group_spans_into_lines, split_text_into_pages};
    use crate::model::TextSpan;

    fn span(text: &str, x: f32, y: f32) -> TextSpan {
        #[allow(clippy::cast_precision_loss)]
        let width = text.chars().count() as f32 * 6.0;
        TextSpan {
            text: text.to_string(),
            x,
            y,
            width,
            font_size: 10.0,
        }
    }

    fn texts(lines: &[Vec<TextSpan>]) -> Vec<Vec<&str>> {
        lines
            .iter()
            .map(|line| line.iter().map(|span| span.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn splits_form_feed_delimited_pages() {
        let pages = split_text_into_pages("p1\u{000C}p2\u{000C}");
        assert_eq!(pages, vec!["p1", "p2"]);
    }

    #[test]
    fn decodes_winansi_accents_when_default_decoding_breaks() {
        let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode("Percepción");
        assert!(!had_errors);
        let decoded = decode_pdf_bytes(Some("WinAnsiEncoding"), &bytes);
        assert_eq!(decoded, "Percepción");
    }

    #[test]
    fn groups_spans_sharing_a_baseline() {
        let spans = vec![
            span("NUMERO DE LIQUIDACION", 50.0, 700.0),
            span("118-016559-26", 250.0, 700.4),
            span("C.D.A.", 50.0, 684.0),
            span("18 010 016559", 250.0, 684.0),
        ];
        let lines = group_spans_into_lines(&spans, 2.0);
        assert_eq!(
            texts(&lines),
            vec![
                vec!["NUMERO DE LIQUIDACION", "118-016559-26"],
                vec!["C.D.A.", "18 010 016559"],
            ]
        );
    }

    #[test]
    fn orders_spans_left_to_right_within_a_line() {
        let spans = vec![span("B", 200.0, 500.0), span("A", 100.0, 500.0)];
        let lines = group_spans_into_lines(&spans, 2.0);
        assert_eq!(texts(&lines), vec![vec!["A", "B"]]);
    }

    #[test]
    fn joins_words_drawn_separately() {
        let spans = vec![
            span("NUMERO DE", 50.0, 700.0),
            span("LIQUIDACION", 110.0, 700.0),
            span("118-016559-26", 300.0, 700.0),
            span("PERCEP", 50.0, 680.0),
            span("CION", 86.0, 680.0),
        ];
        let lines = group_spans_into_lines(&spans, 2.0);
        assert_eq!(
            texts(&lines),
            vec![vec!["NUMERO DE LIQUIDACION", "118-016559-26"], vec!["PERCEPCION"]]
        );
        assert_eq!(lines[0][0].right(), 176.0);
    }
}
