//! Capture processors for turning raw query captures into answers
//!
//! Every function here is pure: it takes the captures of one query run (in
//! document order) and a position, and selects or pairs captures according to
//! the rules of one query purpose.

use tree_sitter::Point;
use tracing::trace;

use super::query_types::{CaptureBucket, CompletionIntent, IntentCapture, QueryCapture};

/// Label of captures that mark existing documentation.
pub const COMMENT_LABEL: &str = "comment";
/// Label of Python's docstring insertion block.
pub const INSERTION_LABEL: &str = "insertion";
pub const BLOCK_START_LABEL: &str = "block_start";
pub const TRIGGER_LABEL: &str = "trigger";

/// A symbol and the range it names, as paired from one query run.
#[derive(Debug, Clone)]
pub struct SymbolRangePair<'tree> {
    pub symbol: Option<QueryCapture<'tree>>,
    pub range: Option<QueryCapture<'tree>>,
    /// Number of `range.*` captures enclosing the position
    pub candidate_ranges: usize,
}

impl SymbolRangePair<'_> {
    /// Whether the paired symbol was captured as a function.
    pub fn is_function(&self) -> bool {
        self.symbol
            .as_ref()
            .and_then(|symbol| symbol.base_name().split('.').nth(1))
            .is_some_and(|kind| kind == "function")
    }
}

/// Processor for query captures
pub struct CaptureProcessor;

impl CaptureProcessor {
    /// Select the innermost `range.*` capture enclosing `position`.
    ///
    /// Captures arrive in document order, so when several ranges enclose the
    /// position the last one is the most specific.
    pub fn nearest_enclosing<'tree>(
        captures: &[QueryCapture<'tree>],
        position: Point,
    ) -> Option<QueryCapture<'tree>> {
        captures
            .iter()
            .filter(|capture| capture.bucket() == Some(CaptureBucket::Range))
            .filter(|capture| capture.encloses(position))
            .last()
            .cloned()
    }

    /// Classify the cursor position from an `intents` query run.
    ///
    /// # Arguments
    /// * `captures` - Captures from the intents query, in document order
    /// * `position` - Position the intent is resolved for
    ///
    /// # Returns
    /// The intent and the node it applies to, or `None` if nothing matched
    pub fn completion_intent<'tree>(
        captures: &[QueryCapture<'tree>],
        position: Point,
    ) -> Option<IntentCapture<'tree>> {
        Self::cursor_intent(captures, position).or_else(|| Self::atomic_intent(captures, position))
    }

    fn cursor_intent<'tree>(captures: &[QueryCapture<'tree>], position: Point) -> Option<IntentCapture<'tree>> {
        let (marker_index, intent) = captures
            .iter()
            .enumerate()
            .filter(|(_, capture)| capture.is_cursor_marker() && capture.start() == position)
            .filter_map(|(index, capture)| {
                capture
                    .base_name()
                    .parse::<CompletionIntent>()
                    .ok()
                    .map(|intent| (index, intent))
            })
            .min_by_key(|(_, intent)| intent.priority())?;

        let same_label = |capture: &&QueryCapture<'tree>| {
            !capture.is_cursor_marker() && !capture.is_atomic() && capture.name == intent.as_str()
        };
        // A marker may come before the node it tags, e.g. Python's `:` ahead
        // of the `block` body. Only then is a later capture used.
        let target = captures[..marker_index]
            .iter()
            .filter(same_label)
            .last()
            .or_else(|| captures[marker_index..].iter().find(same_label))?;

        trace!("Cursor intent {} at {:?}", intent, position);
        Some(IntentCapture {
            intent,
            node: target.node,
        })
    }

    fn atomic_intent<'tree>(captures: &[QueryCapture<'tree>], position: Point) -> Option<IntentCapture<'tree>> {
        let mut best: Option<(CompletionIntent, &QueryCapture<'tree>)> = None;
        for capture in captures.iter().filter(|c| c.is_atomic() && c.encloses(position)) {
            let Ok(intent) = capture.base_name().parse::<CompletionIntent>() else {
                continue;
            };
            // ties go to the later capture
            let better = match best {
                Some((current, _)) => intent.priority() <= current.priority(),
                None => true,
            };
            if better {
                best = Some((intent, capture));
            }
        }

        best.map(|(intent, capture)| IntentCapture {
            intent,
            node: capture.node,
        })
    }

    /// Pair the symbol on the cursor row with the innermost range around the cursor.
    pub fn pair_symbol_range<'tree>(
        captures: &[QueryCapture<'tree>],
        position: Point,
    ) -> Option<SymbolRangePair<'tree>> {
        let symbol = captures
            .iter()
            .filter(|capture| capture.bucket() == Some(CaptureBucket::Symbol))
            .filter(|capture| capture.start().row == position.row && capture.encloses(position))
            .last()
            .cloned();

        let ranges: Vec<_> = captures
            .iter()
            .filter(|capture| capture.bucket() == Some(CaptureBucket::Range))
            .filter(|capture| capture.encloses(position))
            .collect();

        if symbol.is_none() && ranges.is_empty() {
            return None;
        }

        Some(SymbolRangePair {
            symbol,
            range: ranges.last().map(|range| (*range).clone()),
            candidate_ranges: ranges.len(),
        })
    }

    /// Whether a comment capture ends directly above `range`.
    ///
    /// Line comments that swallow their newline end at column 0 of the range's
    /// own row, which also counts as directly above.
    pub fn documented_above(captures: &[QueryCapture], range: &QueryCapture) -> bool {
        let range_start = range.start();
        captures
            .iter()
            .filter(|capture| capture.name == COMMENT_LABEL)
            .any(|comment| {
                let end = comment.end();
                end.row + 1 == range_start.row || end == Point::new(range_start.row, 0)
            })
    }

    /// Start of the `insertion` capture that belongs directly to `range`.
    pub fn insertion_point(captures: &[QueryCapture], range: &QueryCapture) -> Option<Point> {
        captures
            .iter()
            .filter(|capture| capture.name == INSERTION_LABEL)
            .find(|capture| capture.node.parent() == Some(range.node))
            .map(QueryCapture::start)
    }

    /// Whether a comment capture (a docstring) starts exactly at `insertion`.
    pub fn documented_at(captures: &[QueryCapture], insertion: Point) -> bool {
        captures
            .iter()
            .any(|capture| capture.name == COMMENT_LABEL && capture.start() == insertion)
    }

    /// The trigger whose block opens at `position` and is still empty.
    ///
    /// A block counts as empty when it has no named children, or when its last
    /// child was inserted by error recovery (an unclosed brace).
    pub fn singleline_trigger<'tree>(
        captures: &[QueryCapture<'tree>],
        position: Point,
    ) -> Option<QueryCapture<'tree>> {
        let block_start = captures
            .iter()
            .find(|capture| capture.name == BLOCK_START_LABEL && capture.start() == position)?;
        let block = block_start.node.parent()?;

        let trigger = captures
            .iter()
            .find(|capture| capture.name == TRIGGER_LABEL && capture.node.end_byte() == block.end_byte())?;

        let mut walker = block.walk();
        let last_child_missing = block
            .children(&mut walker)
            .last()
            .is_some_and(|child| child.is_missing());

        (block.named_child_count() == 0 || last_child_missing).then(|| trigger.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::{Node, Parser, Tree};

    fn parse_ts(source: &str) -> Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    fn find<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut walker = node.walk();
        let children: Vec<_> = node.children(&mut walker).collect();
        children.into_iter().find_map(|child| find(child, kind))
    }

    #[test]
    fn test_nearest_enclosing_prefers_later_range() {
        let tree = parse_ts("function outer() { const f = () => { g(); }; }");
        let root = tree.root_node();
        let outer = find(root, "function_declaration").unwrap();
        let arrow = find(root, "arrow_function").unwrap();
        let captures = vec![
            QueryCapture::new("range.function", outer, 0),
            QueryCapture::new("symbol.function", outer.child_by_field_name("name").unwrap(), 0),
            QueryCapture::new("range.function", arrow, 1),
        ];

        let inside_arrow = Point::new(0, 38);
        let chosen = CaptureProcessor::nearest_enclosing(&captures, inside_arrow).unwrap();
        assert_eq!(chosen.node, arrow);

        let only_outer = Point::new(0, 16);
        let chosen = CaptureProcessor::nearest_enclosing(&captures, only_outer).unwrap();
        assert_eq!(chosen.node, outer);
    }

    #[test]
    fn test_atomic_intent_uses_priority_then_last() {
        let tree = parse_ts("foo(1, 2)");
        let root = tree.root_node();
        let arguments = find(root, "arguments").unwrap();
        let number = find(arguments, "number").unwrap();
        let captures = vec![
            QueryCapture::new("string!", arguments, 0),
            QueryCapture::new("argument!", number, 1),
        ];

        let intent = CaptureProcessor::completion_intent(&captures, Point::new(0, 4)).unwrap();
        assert_eq!(intent.intent, CompletionIntent::Argument);
        assert_eq!(intent.node, number);
    }

    #[test]
    fn test_cursor_marker_beats_atomic() {
        let tree = parse_ts("foo(1)");
        let root = tree.root_node();
        let arguments = find(root, "arguments").unwrap();
        let open_paren = arguments.child(0).unwrap();
        let captures = vec![
            QueryCapture::new("arguments", arguments, 0),
            QueryCapture::new("arguments.cursor", open_paren, 0),
            QueryCapture::new("argument!", arguments.named_child(0).unwrap(), 1),
        ];

        let intent = CaptureProcessor::completion_intent(&captures, Point::new(0, 3)).unwrap();
        assert_eq!(intent.intent, CompletionIntent::Arguments);
        assert_eq!(intent.node, arguments);
    }

    #[test]
    fn test_cursor_intent_takes_closest_preceding_capture() {
        let tree = parse_ts("function a() {}\nfunction b() {}");
        let root = tree.root_node();
        let mut walker = root.walk();
        let bodies: Vec<_> = root
            .children(&mut walker)
            .filter_map(|function| function.child_by_field_name("body"))
            .collect();
        let (body_a, body_b) = (bodies[0], bodies[1]);
        let brace_b = body_b.child(0).unwrap();

        let captures = vec![
            QueryCapture::new("function.body", body_a, 0),
            QueryCapture::new("function.body", body_b, 0),
            QueryCapture::new("function.body.cursor", brace_b, 0),
            QueryCapture::new("function.body", body_a, 1),
        ];
        let intent = CaptureProcessor::completion_intent(&captures, Point::new(1, 13)).unwrap();
        assert_eq!(intent.intent, CompletionIntent::FunctionBody);
        assert_eq!(intent.node, body_b);

        // marker ahead of its node: the first following capture is used
        let captures = vec![
            QueryCapture::new("function.body.cursor", brace_b, 0),
            QueryCapture::new("function.body", body_b, 0),
            QueryCapture::new("function.body", body_a, 1),
        ];
        let intent = CaptureProcessor::completion_intent(&captures, Point::new(1, 13)).unwrap();
        assert_eq!(intent.node, body_b);
    }

    #[test]
    fn test_pairing_requires_symbol_on_row() {
        let tree = parse_ts("function foo() {\n  return 1;\n}");
        let root = tree.root_node();
        let function = find(root, "function_declaration").unwrap();
        let name = function.child_by_field_name("name").unwrap();
        let captures = vec![
            QueryCapture::new("symbol.function", name, 0),
            QueryCapture::new("range.function", function, 0),
        ];

        let on_name = CaptureProcessor::pair_symbol_range(&captures, Point::new(0, 10)).unwrap();
        assert_eq!(on_name.symbol.as_ref().map(|s| s.node), Some(name));
        assert!(on_name.is_function());
        assert_eq!(on_name.candidate_ranges, 1);

        let in_body = CaptureProcessor::pair_symbol_range(&captures, Point::new(1, 4)).unwrap();
        assert!(in_body.symbol.is_none());
        assert_eq!(in_body.range.map(|r| r.node), Some(function));

        assert!(CaptureProcessor::pair_symbol_range(&captures, Point::new(5, 0)).is_none());
    }

    #[test]
    fn test_documented_above() {
        let tree = parse_ts("// doc\nfunction foo() {}\n\n// far\n\nfunction bar() {}");
        let root = tree.root_node();
        let mut walker = root.walk();
        let nodes: Vec<_> = root.children(&mut walker).collect();
        let captures: Vec<_> = nodes
            .iter()
            .filter(|n| n.kind() == "comment")
            .map(|n| QueryCapture::new("comment", *n, 0))
            .collect();
        let functions: Vec<_> = nodes
            .iter()
            .filter(|n| n.kind() == "function_declaration")
            .map(|n| QueryCapture::new("range.function", *n, 0))
            .collect();

        assert!(CaptureProcessor::documented_above(&captures, &functions[0]));
        assert!(!CaptureProcessor::documented_above(&captures, &functions[1]));
    }

    #[test]
    fn test_singleline_trigger_on_empty_interface() {
        let tree = parse_ts("interface A {}");
        let root = tree.root_node();
        let interface = find(root, "interface_declaration").unwrap();
        let body = find(root, "interface_body").unwrap();
        let brace = body.child(0).unwrap();
        let captures = vec![
            QueryCapture::new("trigger", interface, 0),
            QueryCapture::new("block_start", brace, 0),
        ];

        let trigger = CaptureProcessor::singleline_trigger(&captures, Point::new(0, 12)).unwrap();
        assert_eq!(trigger.node, interface);
        assert!(CaptureProcessor::singleline_trigger(&captures, Point::new(0, 11)).is_none());
    }

    #[test]
    fn test_singleline_trigger_rejects_filled_block() {
        let tree = parse_ts("interface A { a: string }");
        let root = tree.root_node();
        let interface = find(root, "interface_declaration").unwrap();
        let brace = find(root, "interface_body").unwrap().child(0).unwrap();
        let captures = vec![
            QueryCapture::new("trigger", interface, 0),
            QueryCapture::new("block_start", brace, 0),
        ];

        assert!(CaptureProcessor::singleline_trigger(&captures, Point::new(0, 12)).is_none());
    }
}
