//! Error types for grammar loading and pattern compilation.
//!
//! Only configuration problems are errors. Unsupported languages, oversized
//! documents and documents without a cached tree are reported through
//! `Option`/empty results by the caller-facing APIs instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the syntax layer.
#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum SyntaxError {
    /// The grammar artifact for a language could not be found or opened.
    #[error("failed to load {language} grammar from {location}: {reason}")]
    GrammarLoad {
        language: String,
        location: String,
        reason: String,
    },

    /// The grammar was loaded but its ABI is not supported by the linked tree-sitter.
    #[error("incompatible {language} grammar: {source}")]
    IncompatibleGrammar {
        language: String,
        #[source]
        source: tree_sitter::LanguageError,
    },

    /// A static pattern source failed to compile against its grammar.
    #[error("failed to compile {purpose} patterns for {language}: {source}")]
    PatternCompile {
        language: String,
        purpose: String,
        #[source]
        source: tree_sitter::QueryError,
    },

    /// A pattern file or catalog entry named a purpose that does not exist.
    #[error("unknown pattern purpose `{0}`")]
    UnknownPurpose(String),

    /// Failed to read a pattern fixture directory.
    #[error("failed to read pattern directory {}: {source}", path.display())]
    PatternDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The parser returned no tree. Only happens with a parser that has no language.
    #[error("parse aborted for {language}")]
    ParseAborted { language: String },
}

pub type Result<T> = std::result::Result<T, SyntaxError>;
