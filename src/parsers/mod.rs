//! Parsing: one parser per language, and the cache of trees they produce

pub mod parse_cache;
pub mod parser_pool;
pub mod position_utils;

pub use parse_cache::{CachedTree, ParseCacheStats, ParseTreeCache};
pub use parser_pool::{LanguageParser, ParserPool};
