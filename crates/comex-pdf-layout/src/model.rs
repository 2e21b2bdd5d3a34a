#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

/// A run of text on one baseline. `x` is where its first glyph starts and
/// `width` is estimated from the glyph count at the drawn font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
}

impl TextSpan {
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedTable {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
    pub confidence: f32,
}

/// First detected table of a page. The first row is the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
    pub confidence: f32,
}

impl TableGrid {
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    #[must_use]
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Span text of a page grouped into lines, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSpans {
    pub page: u32,
    pub lines: Vec<Vec<String>>,
}

impl LineSpans {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
