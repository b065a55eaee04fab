//! Conversions between byte offsets and row/column points
//!
//! Points follow tree-sitter's convention: zero-based rows, and columns
//! measured in bytes from the start of the row.

use ropey::Rope;
use tree_sitter::{Node, Point};

/// A half-open span between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub start: Point,
    pub end: Point,
}

impl TextRange {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// A zero-width range at `point`.
    pub fn empty(point: Point) -> Self {
        Self { start: point, end: point }
    }

    pub fn of_node(node: &Node) -> Self {
        Self {
            start: node.start_position(),
            end: node.end_position(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when `point` lies within the range, both ends inclusive.
    pub fn contains(&self, point: Point) -> bool {
        self.start <= point && point <= self.end
    }

    /// True when `other` lies entirely within this range.
    pub fn encloses(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Byte offset of `point`, clamping the column to the row's length and the row to the last row.
pub fn point_to_byte(rope: &Rope, point: Point) -> usize {
    if point.row >= rope.len_lines() {
        return rope.len_bytes();
    }
    let line_start = rope.line_to_byte(point.row);
    line_start + point.column.min(line_content_len(rope, point.row))
}

/// Byte length of a row without its line terminator.
pub fn line_content_len(rope: &Rope, row: usize) -> usize {
    let line = rope.line(row);
    let mut len = line.len_bytes();
    let chars = line.len_chars();
    if chars > 0 && line.char(chars - 1) == '\n' {
        len -= 1;
        if chars > 1 && line.char(chars - 2) == '\r' {
            len -= 1;
        }
    }
    len
}

/// Point at byte offset `byte`, clamped to the end of the text.
pub fn byte_to_point(rope: &Rope, byte: usize) -> Point {
    let byte = byte.min(rope.len_bytes());
    let row = rope.byte_to_line(byte);
    Point::new(row, byte - rope.line_to_byte(row))
}

/// The point reached after writing `text` starting at `start`.
pub fn advance_point(start: Point, text: &str) -> Point {
    match text.rfind('\n') {
        Some(last_newline) => Point::new(
            start.row + text.matches('\n').count(),
            text.len() - last_newline - 1,
        ),
        None => Point::new(start.row, start.column + text.len()),
    }
}

/// Whether `node` starts at-or-before and ends at-or-after `point`.
pub fn node_encloses(node: &Node, point: Point) -> bool {
    node.start_position() <= point && point <= node.end_position()
}
