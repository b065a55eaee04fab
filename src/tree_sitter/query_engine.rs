//! Query engine for executing compiled patterns against syntax trees
//!
//! [`QueryEngine::execute`] runs one purpose's pattern over a row window and
//! returns captures in document order. [`DocumentQuerySdk`] binds the engine
//! to one tree and applies the per-purpose post-processing from
//! [`CaptureProcessor`].

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, trace};
use tree_sitter::{Node, Point, QueryCursor, StreamingIterator};

use super::captures::{CaptureProcessor, SymbolRangePair};
use super::query_types::{DocumentableNode, IntentCapture, QueryCapture};
use crate::grammars::SupportedLanguage;
use crate::queries::{CompiledPatternStore, QueryPurpose};

/// Executes compiled patterns from a shared store.
#[derive(Clone)]
pub struct QueryEngine {
    patterns: Arc<CompiledPatternStore>,
}

impl QueryEngine {
    pub fn new(patterns: Arc<CompiledPatternStore>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &Arc<CompiledPatternStore> {
        &self.patterns
    }

    /// Run the `(language, purpose)` pattern over `root`.
    ///
    /// The cursor scans whole rows from `start.row` through `end.row`; a match
    /// is kept when any of its captured nodes intersects `start..=end`, and
    /// then all of its captures are returned. The result is in
    /// document order: by start byte, enclosing nodes before the nodes they
    /// contain, then by pattern index. A purpose that was never
    /// compiled (or compiled to nothing) yields no captures.
    ///
    /// # Arguments
    /// * `source` - Bytes of the text `root` was parsed from
    pub fn execute<'tree>(
        &self,
        language: SupportedLanguage,
        purpose: QueryPurpose,
        root: Node<'tree>,
        source: &[u8],
        start: Point,
        end: Point,
    ) -> Vec<QueryCapture<'tree>> {
        let Some(pattern) = self.patterns.get(language, purpose) else {
            trace!("No {} pattern for {}", purpose, language);
            return Vec::new();
        };

        let mut cursor = QueryCursor::new();
        cursor.set_point_range(Point::new(start.row, 0)..Point::new(end.row.saturating_add(1), 0));

        let names = pattern.capture_names();
        let intersects = |node: &Node| !(node.end_position() < start || node.start_position() > end);
        let mut captures = Vec::new();
        let mut matches = cursor.matches(pattern.query(), root, source);
        while let Some(query_match) = matches.next() {
            if !query_match.captures.iter().any(|capture| intersects(&capture.node)) {
                continue;
            }
            captures.extend(query_match.captures.iter().map(|capture| {
                QueryCapture::new(names[capture.index as usize], capture.node, query_match.pattern_index)
            }));
        }

        captures.sort_by_key(|capture| {
            (
                capture.node.start_byte(),
                Reverse(capture.node.end_byte()),
                capture.pattern_index,
            )
        });
        trace!(
            "{} {} query over rows {}..={} produced {} captures",
            language,
            purpose,
            start.row,
            end.row,
            captures.len()
        );
        captures
    }

    /// Bind the engine to one parsed document.
    pub fn for_document<'a>(
        &'a self,
        language: SupportedLanguage,
        root: Node<'a>,
        source: &'a [u8],
    ) -> DocumentQuerySdk<'a> {
        DocumentQuerySdk {
            engine: self,
            language,
            root,
            source,
        }
    }
}

/// The structural questions that can be asked of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryWrapper {
    EnclosingFunction,
    CompletionIntent,
    DocumentableNode,
    TestableNode,
    SinglelineTrigger,
    GraphContextIdentifiers,
    Identifiers,
}

impl QueryWrapper {
    pub const ALL: [QueryWrapper; 7] = [
        QueryWrapper::EnclosingFunction,
        QueryWrapper::CompletionIntent,
        QueryWrapper::DocumentableNode,
        QueryWrapper::TestableNode,
        QueryWrapper::SinglelineTrigger,
        QueryWrapper::GraphContextIdentifiers,
        QueryWrapper::Identifiers,
    ];

    /// The pattern group the wrapper executes.
    pub fn purpose(&self) -> QueryPurpose {
        match self {
            QueryWrapper::EnclosingFunction | QueryWrapper::TestableNode => QueryPurpose::EnclosingFunction,
            QueryWrapper::CompletionIntent => QueryPurpose::Intents,
            QueryWrapper::DocumentableNode => QueryPurpose::DocumentableNodes,
            QueryWrapper::SinglelineTrigger => QueryPurpose::SinglelineTriggers,
            QueryWrapper::GraphContextIdentifiers => QueryPurpose::GraphContextIdentifiers,
            QueryWrapper::Identifiers => QueryPurpose::Identifiers,
        }
    }
}

/// Answer of one [`QueryWrapper`] run.
#[derive(Debug, Clone)]
pub enum QueryResult<'tree> {
    Captures(Vec<QueryCapture<'tree>>),
    Capture(Option<QueryCapture<'tree>>),
    Intent(Option<IntentCapture<'tree>>),
    Documentable(Option<DocumentableNode<'tree>>),
}

impl QueryResult<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            QueryResult::Captures(captures) => captures.is_empty(),
            QueryResult::Capture(capture) => capture.is_none(),
            QueryResult::Intent(intent) => intent.is_none(),
            QueryResult::Documentable(node) => node.is_none(),
        }
    }
}

/// Structural queries over one parsed document.
#[derive(Clone, Copy)]
pub struct DocumentQuerySdk<'a> {
    engine: &'a QueryEngine,
    language: SupportedLanguage,
    root: Node<'a>,
    source: &'a [u8],
}

impl<'a> DocumentQuerySdk<'a> {
    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    pub fn root(&self) -> Node<'a> {
        self.root
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// Raw captures of `purpose` over `start..=end`.
    pub fn captures(&self, purpose: QueryPurpose, start: Point, end: Point) -> Vec<QueryCapture<'a>> {
        self.engine
            .execute(self.language, purpose, self.root, self.source, start, end)
    }

    /// Dispatch a wrapper. Every question goes through here.
    pub fn run(&self, wrapper: QueryWrapper, start: Point, end: Point) -> QueryResult<'a> {
        debug!("Running {:?} for {} at {:?}", wrapper, self.language, start);
        match wrapper {
            QueryWrapper::EnclosingFunction => QueryResult::Capture(self.enclosing_function(start, end)),
            QueryWrapper::CompletionIntent => QueryResult::Intent(self.completion_intent(start, end)),
            QueryWrapper::DocumentableNode => QueryResult::Documentable(self.documentable_node(start, end)),
            QueryWrapper::TestableNode => QueryResult::Documentable(self.testable_node(start, end)),
            QueryWrapper::SinglelineTrigger => QueryResult::Capture(self.singleline_trigger(start, end)),
            QueryWrapper::GraphContextIdentifiers | QueryWrapper::Identifiers => {
                QueryResult::Captures(self.captures(wrapper.purpose(), start, end))
            }
        }
    }

    /// Innermost function-like construct around `start`.
    pub fn enclosing_function(&self, start: Point, end: Point) -> Option<QueryCapture<'a>> {
        let captures = self.captures(QueryPurpose::EnclosingFunction, start, end);
        CaptureProcessor::nearest_enclosing(&captures, start)
    }

    pub fn completion_intent(&self, start: Point, end: Point) -> Option<IntentCapture<'a>> {
        let captures = self.captures(QueryPurpose::Intents, start, end);
        CaptureProcessor::completion_intent(&captures, start)
    }

    /// Symbol at `start` and the span its documentation would cover.
    pub fn documentable_node(&self, start: Point, end: Point) -> Option<DocumentableNode<'a>> {
        let captures = self.captures(QueryPurpose::DocumentableNodes, start, end);
        let pair = CaptureProcessor::pair_symbol_range(&captures, start)?;
        let is_function = pair.is_function();
        let SymbolRangePair { symbol, range, candidate_ranges } = pair;
        let Some(range) = range else {
            return Some(DocumentableNode {
                symbol,
                range: None,
                insertion_point: None,
                show_hint: false,
            });
        };

        let (insertion_point, documented) = if self.language == SupportedLanguage::Python {
            self.python_docstring(&range)
        } else {
            (None, self.comment_above(&range))
        };

        Some(DocumentableNode {
            symbol,
            range: Some(range),
            insertion_point,
            show_hint: (candidate_ranges == 1 || is_function) && !documented,
        })
    }

    /// Function whose name is at `start`; never marked for highlighting.
    pub fn testable_node(&self, start: Point, end: Point) -> Option<DocumentableNode<'a>> {
        let captures = self.captures(QueryPurpose::EnclosingFunction, start, end);
        let SymbolRangePair { symbol, range, .. } = CaptureProcessor::pair_symbol_range(&captures, start)?;
        Some(DocumentableNode {
            symbol,
            range,
            insertion_point: None,
            show_hint: false,
        })
    }

    /// Trigger construct whose empty block opens at `start`.
    pub fn singleline_trigger(&self, start: Point, end: Point) -> Option<QueryCapture<'a>> {
        let captures = self.captures(QueryPurpose::SinglelineTriggers, start, end);
        CaptureProcessor::singleline_trigger(&captures, start)
    }

    pub fn graph_context_identifiers(&self, start: Point, end: Point) -> Vec<QueryCapture<'a>> {
        self.captures(QueryPurpose::GraphContextIdentifiers, start, end)
    }

    pub fn identifiers(&self, start: Point, end: Point) -> Vec<QueryCapture<'a>> {
        self.captures(QueryPurpose::Identifiers, start, end)
    }

    fn comment_above(&self, range: &QueryCapture<'a>) -> bool {
        let Some(row_above) = range.start().row.checked_sub(1) else {
            return false;
        };
        let captures = self.captures(
            QueryPurpose::DocumentableNodes,
            Point::new(row_above, 0),
            Point::new(row_above, usize::MAX),
        );
        CaptureProcessor::documented_above(&captures, range)
    }

    // Python documents a definition with the first string inside its body.
    fn python_docstring(&self, range: &QueryCapture<'a>) -> (Option<Point>, bool) {
        let captures = self.captures(QueryPurpose::DocumentableNodes, range.start(), range.end());
        match CaptureProcessor::insertion_point(&captures, range) {
            Some(insertion) => (Some(insertion), CaptureProcessor::documented_at(&captures, insertion)),
            None => (None, false),
        }
    }
}
