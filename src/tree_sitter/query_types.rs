//! Capture and result types for structural queries

use std::fmt;
use std::str::FromStr;

use tree_sitter::{Node, Point};

use crate::parsers::position_utils::TextRange;

/// Suffix of capture names that match without a cursor anchor.
pub const ATOMIC_SUFFIX: char = '!';

/// Suffix of capture names marking the token the cursor must sit on.
pub const CURSOR_SUFFIX: &str = ".cursor";

/// A captured node from a query, in document order.
#[derive(Debug, Clone)]
pub struct QueryCapture<'tree> {
    /// Capture label as written in the pattern, e.g. `function.body.cursor`
    pub name: String,
    pub node: Node<'tree>,
    /// Index of the pattern that produced the capture
    pub pattern_index: usize,
}

impl<'tree> QueryCapture<'tree> {
    pub fn new(name: impl Into<String>, node: Node<'tree>, pattern_index: usize) -> Self {
        Self {
            name: name.into(),
            node,
            pattern_index,
        }
    }

    pub fn start(&self) -> Point {
        self.node.start_position()
    }

    pub fn end(&self) -> Point {
        self.node.end_position()
    }

    pub fn range(&self) -> TextRange {
        TextRange::of_node(&self.node)
    }

    /// Starts at-or-before and ends at-or-after `point`.
    pub fn encloses(&self, point: Point) -> bool {
        self.range().contains(point)
    }

    pub fn text<'s>(&self, source: &'s [u8]) -> &'s str {
        self.node.utf8_text(source).unwrap_or("")
    }

    pub fn is_atomic(&self) -> bool {
        self.name.ends_with(ATOMIC_SUFFIX)
    }

    pub fn is_cursor_marker(&self) -> bool {
        self.name.trim_end_matches(ATOMIC_SUFFIX).ends_with(CURSOR_SUFFIX)
    }

    /// Label without the atomic and cursor suffixes.
    pub fn base_name(&self) -> &str {
        let name = self.name.trim_end_matches(ATOMIC_SUFFIX);
        name.strip_suffix(CURSOR_SUFFIX).unwrap_or(name)
    }

    pub fn bucket(&self) -> Option<CaptureBucket> {
        CaptureBucket::of_label(&self.name)
    }
}

/// Groups used when pairing symbols with the ranges they describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureBucket {
    Symbol,
    Range,
}

const LABEL_BUCKETS: &[(&str, CaptureBucket)] = &[
    ("symbol", CaptureBucket::Symbol),
    ("range", CaptureBucket::Range),
];

impl CaptureBucket {
    /// Bucket for a label by its first dotted component.
    pub fn of_label(label: &str) -> Option<Self> {
        let prefix = label.split('.').next().unwrap_or(label);
        LABEL_BUCKETS
            .iter()
            .find(|(name, _)| *name == prefix)
            .map(|(_, bucket)| *bucket)
    }
}

/// Semantic category of a cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionIntent {
    FunctionName,
    FunctionParameters,
    FunctionBody,
    TypeDeclarationName,
    TypeDeclarationBody,
    ClassName,
    ClassBody,
    Arguments,
    ImportSource,
    Comment,
    PairValue,
    Argument,
    Parameter,
    Parameters,
    JsxAttributeValue,
    ReturnStatementValue,
    ReturnStatement,
    String,
}

/// Atomic intent preference, best first.
pub const INTENT_PRIORITY: &[CompletionIntent] = &[
    CompletionIntent::FunctionName,
    CompletionIntent::FunctionParameters,
    CompletionIntent::FunctionBody,
    CompletionIntent::TypeDeclarationName,
    CompletionIntent::TypeDeclarationBody,
    CompletionIntent::ClassName,
    CompletionIntent::ClassBody,
    CompletionIntent::Arguments,
    CompletionIntent::ImportSource,
    CompletionIntent::Comment,
    CompletionIntent::PairValue,
    CompletionIntent::Argument,
    CompletionIntent::Parameter,
    CompletionIntent::Parameters,
    CompletionIntent::JsxAttributeValue,
    CompletionIntent::ReturnStatementValue,
    CompletionIntent::ReturnStatement,
    CompletionIntent::String,
];

impl CompletionIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionIntent::FunctionName => "function.name",
            CompletionIntent::FunctionParameters => "function.parameters",
            CompletionIntent::FunctionBody => "function.body",
            CompletionIntent::TypeDeclarationName => "type_declaration.name",
            CompletionIntent::TypeDeclarationBody => "type_declaration.body",
            CompletionIntent::ClassName => "class.name",
            CompletionIntent::ClassBody => "class.body",
            CompletionIntent::Arguments => "arguments",
            CompletionIntent::ImportSource => "import.source",
            CompletionIntent::Comment => "comment",
            CompletionIntent::PairValue => "pair.value",
            CompletionIntent::Argument => "argument",
            CompletionIntent::Parameter => "parameter",
            CompletionIntent::Parameters => "parameters",
            CompletionIntent::JsxAttributeValue => "jsx_attribute.value",
            CompletionIntent::ReturnStatementValue => "return_statement.value",
            CompletionIntent::ReturnStatement => "return_statement",
            CompletionIntent::String => "string",
        }
    }

    /// Position in [`INTENT_PRIORITY`]; lower is preferred.
    pub fn priority(&self) -> usize {
        INTENT_PRIORITY
            .iter()
            .position(|intent| intent == self)
            .unwrap_or(INTENT_PRIORITY.len())
    }
}

impl fmt::Display for CompletionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompletionIntent {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        INTENT_PRIORITY
            .iter()
            .find(|intent| intent.as_str() == s)
            .copied()
            .ok_or(())
    }
}

/// Result of completion-intent classification.
#[derive(Debug, Clone)]
pub struct IntentCapture<'tree> {
    pub intent: CompletionIntent,
    /// The node the intent applies to
    pub node: Node<'tree>,
}

/// A symbol and the span its documentation would cover.
#[derive(Debug, Clone)]
pub struct DocumentableNode<'tree> {
    pub symbol: Option<QueryCapture<'tree>>,
    pub range: Option<QueryCapture<'tree>>,
    /// Where generated documentation goes when it belongs inside the range
    pub insertion_point: Option<Point>,
    /// Whether the node should be highlighted as actionable
    pub show_hint: bool,
}
