use std::fmt;

/// Byte range `[start, end)` into the script source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Span {
    pub(crate) fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub(crate) fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }
}

/// A resolved point in the script source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// 0-based byte offset.
    pub offset: usize,
}

/// Source range covered by a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    /// First offending character.
    pub start: Position,
    /// End of the offending token (exclusive).
    pub end: Position,
}

/// The script did not match the grammar.
///
/// Parsing stops at the first mismatch, so there is exactly one of these per failed parse.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, thiserror::Error)]
#[error("syntax error at {}: {message}", .location.start)]
pub struct SyntaxError {
    /// Human-readable message naming the expected construct.
    pub message: String,
    /// Where the mismatch happened.
    pub location: Location,
}

impl SyntaxError {
    pub(crate) fn at(src: &str, span: Span, message: impl Into<String>) -> Self {
        let index = LineIndex::new(src);
        Self {
            message: message.into(),
            location: Location {
                start: index.position(src, span.start),
                end: index.position(src, span.end.max(span.start)),
            },
        }
    }

    /// Render the error with the offending source line and a caret underline.
    ///
    /// `origin` names the script (usually its path) in the header line.
    pub fn render(&self, src: &str, origin: &str) -> String {
        let start = self.location.start;
        let line_text = src.lines().nth(start.line.saturating_sub(1)).unwrap_or("");
        let width = if self.location.end.line == start.line {
            self.location.end.column.saturating_sub(start.column).max(1)
        } else {
            line_text
                .chars()
                .count()
                .saturating_sub(start.column.saturating_sub(1))
                .max(1)
        };
        let gutter = start.line.to_string().len();

        let mut out = String::new();
        out.push_str(&format!("error: {}\n", self.message));
        out.push_str(&format!(
            "{:gutter$}--> {origin}:{}:{}\n",
            "", start.line, start.column
        ));
        out.push_str(&format!("{:gutter$} |\n", ""));
        out.push_str(&format!("{} | {line_text}\n", start.line));
        out.push_str(&format!(
            "{:gutter$} | {}{}\n",
            "",
            " ".repeat(start.column.saturating_sub(1)),
            "^".repeat(width)
        ));
        out
    }
}

/// Offsets of line starts, used to turn byte offsets into line/column pairs.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(src: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(src.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn position(&self, src: &str, offset: usize) -> Position {
        let offset = clamp_to_char_boundary(src, offset);
        let line_idx = self.starts.partition_point(|&s| s <= offset) - 1;
        let line_start = self.starts[line_idx];
        Position {
            line: line_idx + 1,
            column: src[line_start..offset].chars().count() + 1,
            offset,
        }
    }
}

fn clamp_to_char_boundary(src: &str, offset: usize) -> usize {
    let mut offset = offset.min(src.len());
    while !src.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
