//! Incremental parse-tree cache and structural query engine
//!
//! Data flows one way: a text edit patches the cached tree, queries run over
//! the tree, and derived analyses interpret the captures.
//!
//! ```text
//! TextDocument ── ContentChange ──▶ ParseTreeCache ──▶ QueryEngine ──▶ analysis
//!                                        │                  │
//!                                    ParserPool      CompiledPatternStore
//!                                        │                  │
//!                                 GrammarRegistry      PatternCatalog
//! ```

pub mod analysis;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod grammars;
pub mod logging;
pub mod parsers;
pub mod queries;
pub mod tree_sitter;

pub use engine::SyntaxEngine;
pub use error::{Result, SyntaxError};
