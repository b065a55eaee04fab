//! Text documents as seen by the syntax layer
//!
//! [`TextDocument`] is the read side the cache and analyses need from a host
//! buffer. [`SourceDocument`] is a rope-backed implementation that also turns
//! host change events into tree edits.

use ropey::Rope;
use tree_sitter::{InputEdit, Point};

use crate::parsers::position_utils::{advance_point, byte_to_point, line_content_len, point_to_byte, TextRange};

/// A byte-level edit description for an existing syntax tree.
pub type TreeEdit = InputEdit;

/// One change event from the host: replace `old_len` bytes at `byte_offset` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChange {
    pub byte_offset: usize,
    pub old_len: usize,
    pub new_text: String,
}

impl ContentChange {
    pub fn insert(byte_offset: usize, text: impl Into<String>) -> Self {
        Self {
            byte_offset,
            old_len: 0,
            new_text: text.into(),
        }
    }

    pub fn delete(byte_offset: usize, len: usize) -> Self {
        Self {
            byte_offset,
            old_len: len,
            new_text: String::new(),
        }
    }

    pub fn replace(byte_offset: usize, old_len: usize, text: impl Into<String>) -> Self {
        Self {
            byte_offset,
            old_len,
            new_text: text.into(),
        }
    }
}

pub trait TextDocument {
    /// Stable identity, typically a URI.
    fn uri(&self) -> &str;

    /// Editor language identifier, e.g. `typescriptreact`.
    fn language_id(&self) -> &str;

    fn text(&self) -> String;

    fn line_count(&self) -> usize;

    fn text_in_range(&self, range: TextRange) -> String;

    /// Text of row `row` without its line terminator; empty past the end.
    fn line_text(&self, row: usize) -> String;

    /// Byte length of row `row` without its line terminator.
    fn line_len(&self, row: usize) -> usize {
        self.line_text(row).len()
    }

    /// Byte offset of `point`, clamped into the text.
    fn offset_at(&self, point: Point) -> usize;

    fn point_at(&self, offset: usize) -> Point;
}

/// A document held in a rope.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    uri: String,
    language_id: String,
    version: i32,
    rope: Rope,
}

impl SourceDocument {
    pub fn new(uri: impl Into<String>, language_id: impl Into<String>, text: &str) -> Self {
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
            version: 0,
            rope: Rope::from_str(text),
        }
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Apply one change to the text and describe it as a tree edit.
    ///
    /// Offsets past the end of the text are clamped. Changes in a batch must
    /// be applied in the order the host produced them.
    pub fn apply_change(&mut self, change: &ContentChange) -> TreeEdit {
        let len = self.rope.len_bytes();
        let start_byte = change.byte_offset.min(len);
        let old_end_byte = start_byte.saturating_add(change.old_len).min(len);

        let start_position = byte_to_point(&self.rope, start_byte);
        let old_end_position = byte_to_point(&self.rope, old_end_byte);

        let start_char = self.rope.byte_to_char(start_byte);
        let old_end_char = self.rope.byte_to_char(old_end_byte);
        self.rope.remove(start_char..old_end_char);
        self.rope.insert(start_char, &change.new_text);
        self.version += 1;

        TreeEdit {
            start_byte,
            old_end_byte,
            new_end_byte: start_byte + change.new_text.len(),
            start_position,
            old_end_position,
            new_end_position: advance_point(start_position, &change.new_text),
        }
    }

    /// Apply a batch of changes in order, returning the matching tree edits.
    pub fn apply_changes(&mut self, changes: &[ContentChange]) -> Vec<TreeEdit> {
        changes.iter().map(|change| self.apply_change(change)).collect()
    }

    /// Replace the whole text. No tree edit is produced; callers reparse fully.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.version += 1;
    }
}

impl TextDocument for SourceDocument {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn language_id(&self) -> &str {
        &self.language_id
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn text_in_range(&self, range: TextRange) -> String {
        let start = self.rope.byte_to_char(point_to_byte(&self.rope, range.start));
        let end = self.rope.byte_to_char(point_to_byte(&self.rope, range.end));
        if end <= start {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    fn line_text(&self, row: usize) -> String {
        if row >= self.rope.len_lines() {
            return String::new();
        }
        let start = self.rope.line_to_byte(row);
        let end = start + line_content_len(&self.rope, row);
        self.rope
            .slice(self.rope.byte_to_char(start)..self.rope.byte_to_char(end))
            .to_string()
    }

    fn line_len(&self, row: usize) -> usize {
        if row >= self.rope.len_lines() {
            return 0;
        }
        line_content_len(&self.rope, row)
    }

    fn offset_at(&self, point: Point) -> usize {
        point_to_byte(&self.rope, point)
    }

    fn point_at(&self, offset: usize) -> Point {
        byte_to_point(&self.rope, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_produces_edit() {
        let mut doc = SourceDocument::new("file:///a.ts", "typescript", "const y = ;");
        let edit = doc.apply_change(&ContentChange::insert(10, "2"));

        assert_eq!(doc.text(), "const y = 2;");
        assert_eq!(edit.start_byte, 10);
        assert_eq!(edit.old_end_byte, 10);
        assert_eq!(edit.new_end_byte, 11);
        assert_eq!(edit.start_position, Point::new(0, 10));
        assert_eq!(edit.new_end_position, Point::new(0, 11));
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_multiline_replace_positions() {
        let mut doc = SourceDocument::new("file:///a.py", "python", "a = 1\nb = 2\nc = 3\n");
        // replace "1\nb" with "10\n\nbb"
        let edit = doc.apply_change(&ContentChange::replace(4, 3, "10\n\nbb"));

        assert_eq!(doc.text(), "a = 10\n\nbb = 2\nc = 3\n");
        assert_eq!(edit.start_position, Point::new(0, 4));
        assert_eq!(edit.old_end_position, Point::new(1, 1));
        assert_eq!(edit.new_end_position, Point::new(2, 2));
        assert_eq!(edit.new_end_byte, 4 + "10\n\nbb".len());
    }

    #[test]
    fn test_delete_clamps_to_end() {
        let mut doc = SourceDocument::new("file:///a.go", "go", "package main");
        let edit = doc.apply_change(&ContentChange::delete(8, 100));
        assert_eq!(doc.text(), "package ");
        assert_eq!(edit.old_end_byte, 12);
        assert_eq!(edit.new_end_byte, 8);
    }

    #[test]
    fn test_line_access() {
        let doc = SourceDocument::new("file:///a.rs", "rust", "fn main() {\r\n}\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_text(0), "fn main() {");
        assert_eq!(doc.line_len(0), 11);
        assert_eq!(doc.line_text(1), "}");
        assert_eq!(doc.line_text(7), "");
        assert_eq!(
            doc.text_in_range(TextRange::new(Point::new(0, 3), Point::new(0, 7))),
            "main"
        );
    }
}
