#![allow(dead_code)]

use syntax_query::config::EngineConfig;
use syntax_query::document::SourceDocument;
use syntax_query::SyntaxEngine;
use tree_sitter::Point;

/// Cursor placeholder used in test sources.
pub const CURSOR: &str = "█";

pub fn engine() -> SyntaxEngine {
    SyntaxEngine::new(EngineConfig::default())
}

pub fn engine_with_capacity(capacity: usize) -> SyntaxEngine {
    SyntaxEngine::new(EngineConfig {
        cache_capacity: capacity,
        ..EngineConfig::default()
    })
}

pub fn document(uri: &str, language_id: &str, text: &str) -> SourceDocument {
    SourceDocument::new(uri, language_id, text)
}

/// Strip the cursor placeholder from `text`, returning the clean text and the
/// point where the placeholder was.
pub fn split_cursor(text: &str) -> (String, Point) {
    let offset = text.find(CURSOR).expect("source has no cursor placeholder");
    let before = &text[..offset];
    let row = before.matches('\n').count();
    let column = before.len() - before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    (text.replacen(CURSOR, "", 1), Point::new(row, column))
}

/// Point of the first occurrence of `needle`, plus `shift` columns.
pub fn point_of(text: &str, needle: &str, shift: usize) -> Point {
    let offset = text.find(needle).expect("needle not found");
    let before = &text[..offset];
    let row = before.matches('\n').count();
    let column = before.len() - before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    Point::new(row, column + shift)
}
