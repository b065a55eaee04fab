//! Structural queries over syntax trees
//!
//! ```text
//! Compiled patterns (per language, per purpose)
//!       ↓
//! QueryEngine::execute (row window, document order)
//!       ↓
//! CaptureProcessor (enclosing, intents, symbol/range pairing, triggers)
//!       ↓
//! DocumentQuerySdk / QueryWrapper dispatch
//! ```

pub mod captures;
pub mod query_engine;
pub mod query_types;

pub use captures::{CaptureProcessor, SymbolRangePair};
pub use query_engine::{DocumentQuerySdk, QueryEngine, QueryResult, QueryWrapper};
pub use query_types::{
    CaptureBucket, CompletionIntent, DocumentableNode, IntentCapture, QueryCapture, INTENT_PRIORITY,
};
