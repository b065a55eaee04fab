//! Analyses derived from a parsed document
//!
//! These sit on top of the query layer and answer the questions a completion
//! provider asks at the cursor: how much surrounding code fits a budget, which
//! identifiers were used recently, and what kind of position the cursor is in.

use tree_sitter::{Node, Point, Tree};
use tracing::trace;

use crate::document::TextDocument;
use crate::parsers::position_utils::TextRange;
use crate::tree_sitter::{DocumentQuerySdk, IntentCapture};

/// Minimum length an identifier needs to be worth reporting.
const MIN_IDENTIFIER_CHARS: usize = 3;

/// Largest node around `position` whose text is at most `char_limit` characters.
///
/// Starts from the deepest node at the cursor and climbs while the parent
/// still fits. When not even the deepest node fits, the result is a
/// zero-width range at `position`. With `expand_to_full_line`, a chosen node
/// range is widened to start at column 0 and end at the end of its last line.
pub fn enclosing_node_within_char_limit(
    tree: &Tree,
    document: &impl TextDocument,
    position: Point,
    char_limit: usize,
    expand_to_full_line: bool,
) -> TextRange {
    let source = document.text();
    let Some(mut node) = tree.root_node().descendant_for_point_range(position, position) else {
        return TextRange::empty(position);
    };

    let mut fitting: Option<Node> = None;
    loop {
        if char_count(&node, source.as_bytes()) > char_limit {
            break;
        }
        fitting = Some(node);
        match node.parent() {
            Some(parent) => node = parent,
            None => break,
        }
    }

    let Some(node) = fitting else {
        trace!("No node within {} chars at {:?}", char_limit, position);
        return TextRange::empty(position);
    };

    let range = TextRange::of_node(&node);
    if !expand_to_full_line {
        return range;
    }
    TextRange::new(
        Point::new(range.start.row, 0),
        Point::new(range.end.row, document.line_len(range.end.row)),
    )
}

fn char_count(node: &Node, source: &[u8]) -> usize {
    node.utf8_text(source)
        .map(|text| text.chars().count())
        .unwrap_or(usize::MAX)
}

/// The `n` most recent distinct identifiers before `position`.
///
/// Looks back `window_lines` rows. Identifiers of two characters or fewer are
/// skipped; the nearest occurrence of each name comes first.
pub fn last_n_identifiers(
    sdk: &DocumentQuerySdk,
    position: Point,
    n: usize,
    window_lines: usize,
) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let start = Point::new(position.row.saturating_sub(window_lines), 0);
    let captures = sdk.graph_context_identifiers(start, position);

    let mut identifiers: Vec<String> = Vec::new();
    for capture in captures.iter().rev() {
        let text = capture.text(sdk.source());
        if text.chars().count() < MIN_IDENTIFIER_CHARS {
            continue;
        }
        if identifiers.iter().any(|seen| seen == text) {
            continue;
        }
        identifiers.push(text.to_string());
        if identifiers.len() == n {
            break;
        }
    }
    identifiers
}

/// Completion intent for a cursor placed by the host.
///
/// When the document text before the cursor ends with the language's block
/// opener, ignoring whitespace and newlines, the intent is resolved at that
/// opener. This covers a blank line just below `{`. Otherwise it is resolved
/// one column to the left, at the character just typed.
pub fn completion_intent_at_cursor<'a>(
    sdk: &DocumentQuerySdk<'a>,
    document: &impl TextDocument,
    position: Point,
) -> Option<IntentCapture<'a>> {
    let block_start = sdk.language().config().block_start;
    let prefix = document.text_in_range(TextRange::new(Point::new(0, 0), position));
    let trimmed = prefix.trim_end();

    let anchor = match trimmed.ends_with(block_start) {
        true => document.point_at(trimmed.len() - block_start.len()),
        false => Point::new(position.row, position.column.saturating_sub(1)),
    };
    trace!("Resolving intent at {:?} for cursor {:?}", anchor, position);
    sdk.completion_intent(anchor, anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::document::SourceDocument;
    use crate::grammars::{GrammarRegistry, SupportedLanguage};
    use crate::parsers::parser_pool::ParserPool;
    use crate::queries::{CompiledPatternStore, PatternCatalog};
    use crate::tree_sitter::{CompletionIntent, QueryEngine};

    async fn setup(language: SupportedLanguage, text: &str) -> (QueryEngine, Tree, SourceDocument) {
        let store = Arc::new(CompiledPatternStore::new(Arc::new(PatternCatalog::builtin())));
        let pool = ParserPool::new(Arc::clone(&store));
        let parser = pool
            .load_parser(&GrammarRegistry::default().handle(language))
            .await
            .unwrap();
        let tree = parser.parse(text, None).unwrap();
        let document = SourceDocument::new("file:///test", language.as_str(), text);
        (QueryEngine::new(store), tree, document)
    }

    #[tokio::test]
    async fn test_enclosing_node_zero_width_when_nothing_fits() {
        let literal = format!("const s = \"{}\";", "x".repeat(88));
        let (_, tree, document) = setup(SupportedLanguage::JavaScript, &literal).await;
        let cursor = Point::new(0, 20);

        let range = enclosing_node_within_char_limit(&tree, &document, cursor, 1, false);
        assert_eq!(range, TextRange::empty(cursor));
    }

    #[tokio::test]
    async fn test_enclosing_node_climbs_within_budget() {
        let text = "function f() {\n  const total = a + b;\n  return total;\n}\n";
        let (_, tree, document) = setup(SupportedLanguage::JavaScript, text).await;
        let cursor = Point::new(1, 18);

        let tight = enclosing_node_within_char_limit(&tree, &document, cursor, 5, false);
        let wide = enclosing_node_within_char_limit(&tree, &document, cursor, 25, false);
        let everything = enclosing_node_within_char_limit(&tree, &document, cursor, 1000, false);

        assert!(wide.encloses(&tight));
        assert!(everything.encloses(&wide));
        assert_eq!(document.text_in_range(wide), "const total = a + b;");
        assert_eq!(everything.start, Point::new(0, 0));
    }

    #[tokio::test]
    async fn test_enclosing_node_expands_to_full_lines() {
        let text = "let a = 1;\nlet b = foo(a, 2);\n";
        let (_, tree, document) = setup(SupportedLanguage::JavaScript, text).await;

        let range = enclosing_node_within_char_limit(&tree, &document, Point::new(1, 13), 8, true);
        assert_eq!(range, TextRange::new(Point::new(1, 0), Point::new(1, 18)));
    }

    #[tokio::test]
    async fn test_last_n_identifiers_nearest_first_and_deduped() {
        let text = "import { readFile } from 'fs';\nconst data = readFile(path);\nconsole.log(data);\nparse(data);\nreadFile(other);\n";
        let (engine, tree, _) = setup(SupportedLanguage::JavaScript, text).await;
        let sdk = engine.for_document(SupportedLanguage::JavaScript, tree.root_node(), text.as_bytes());

        let identifiers = last_n_identifiers(&sdk, Point::new(5, 0), 3, 100);
        assert_eq!(identifiers, vec!["readFile", "parse", "log"]);
        assert!(last_n_identifiers(&sdk, Point::new(5, 0), 0, 100).is_empty());
    }

    #[tokio::test]
    async fn test_intent_after_block_start() {
        let text = "function foo() {\n}\n";
        let (engine, tree, document) = setup(SupportedLanguage::JavaScript, text).await;
        let sdk = engine.for_document(SupportedLanguage::JavaScript, tree.root_node(), text.as_bytes());

        let intent = completion_intent_at_cursor(&sdk, &document, Point::new(0, 16)).unwrap();
        assert_eq!(intent.intent, CompletionIntent::FunctionBody);
    }

    #[tokio::test]
    async fn test_intent_on_blank_line_below_block_start() {
        let text = "function foo() {\n    \n}\n";
        let (engine, tree, document) = setup(SupportedLanguage::JavaScript, text).await;
        let sdk = engine.for_document(SupportedLanguage::JavaScript, tree.root_node(), text.as_bytes());

        let intent = completion_intent_at_cursor(&sdk, &document, Point::new(1, 4)).unwrap();
        assert_eq!(intent.intent, CompletionIntent::FunctionBody);
        assert_eq!(intent.node.kind(), "statement_block");
    }

    #[tokio::test]
    async fn test_intent_on_blank_line_below_python_def() {
        let text = "def foo():\n    \n    pass\n";
        let (engine, tree, document) = setup(SupportedLanguage::Python, text).await;
        let sdk = engine.for_document(SupportedLanguage::Python, tree.root_node(), text.as_bytes());

        let intent = completion_intent_at_cursor(&sdk, &document, Point::new(1, 4));
        assert_eq!(intent.map(|i| i.intent), Some(CompletionIntent::FunctionBody));
    }

    #[tokio::test]
    async fn test_intent_inside_comment() {
        let text = "// explain the thing\nconst x = 1;\n";
        let (engine, tree, document) = setup(SupportedLanguage::TypeScript, text).await;
        let sdk = engine.for_document(SupportedLanguage::TypeScript, tree.root_node(), text.as_bytes());

        let intent = completion_intent_at_cursor(&sdk, &document, Point::new(0, 10)).unwrap();
        assert_eq!(intent.intent, CompletionIntent::Comment);
    }
}
