//! Engine configuration
//!
//! Settings come from three places, in order of precedence: environment
//! variables, the host's JSON initialization options, then built-in defaults.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use crate::grammars::GrammarLocation;

/// Default number of parse trees kept alive by the cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 10;

/// Documents longer than this are not offered structural analysis.
pub const DEFAULT_MAX_DOCUMENT_LINES: usize = 10_000;

/// How many lines above the cursor the identifier extraction looks at.
pub const DEFAULT_IDENTIFIER_WINDOW_LINES: usize = 100;

const ENV_GRAMMAR_DIR: &str = "SYNTAX_QUERY_GRAMMAR_DIR";
const ENV_CACHE_CAPACITY: &str = "SYNTAX_QUERY_CACHE_CAPACITY";
const ENV_MAX_LINES: &str = "SYNTAX_QUERY_MAX_LINES";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Maximum number of cached parse trees
    pub cache_capacity: usize,
    /// Line ceiling above which `get_cached_tree` reports nothing
    pub max_document_lines: usize,
    /// Directory holding `tree-sitter-<grammar>` shared libraries. `None` uses the bundled grammars.
    pub grammar_dir: Option<PathBuf>,
    /// Lookback window for last-N identifier extraction
    pub identifier_window_lines: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_document_lines: DEFAULT_MAX_DOCUMENT_LINES,
            grammar_dir: None,
            identifier_window_lines: DEFAULT_IDENTIFIER_WINDOW_LINES,
        }
    }
}

impl EngineConfig {
    /// Build the configuration from the environment, then the host's
    /// initialization options, then defaults.
    ///
    /// Malformed initialization options are logged and ignored rather than
    /// failing startup.
    pub fn from_env_or_default(init_options: Option<&serde_json::Value>) -> Self {
        let mut config = match init_options {
            Some(value) => serde_json::from_value::<EngineConfig>(value.clone()).unwrap_or_else(|e| {
                warn!("Ignoring malformed initialization options: {}", e);
                EngineConfig::default()
            }),
            None => EngineConfig::default(),
        };

        if let Ok(dir) = std::env::var(ENV_GRAMMAR_DIR) {
            if !dir.trim().is_empty() {
                config.grammar_dir = Some(PathBuf::from(dir));
            }
        }
        if let Some(capacity) = read_usize_env(ENV_CACHE_CAPACITY) {
            config.cache_capacity = capacity;
        }
        if let Some(lines) = read_usize_env(ENV_MAX_LINES) {
            config.max_document_lines = lines;
        }

        config.normalized()
    }

    /// Clamp values that would make the engine unusable.
    pub fn normalized(mut self) -> Self {
        if self.cache_capacity == 0 {
            warn!("Cache capacity of 0 is not allowed, using 1");
            self.cache_capacity = 1;
        }
        self
    }

    /// Where grammars should be loaded from under this configuration.
    pub fn grammar_location(&self) -> GrammarLocation {
        match &self.grammar_dir {
            Some(dir) => GrammarLocation::Directory(dir.clone()),
            None => GrammarLocation::Bundled,
        }
    }
}

fn read_usize_env(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}='{}': not a non-negative integer", name, raw);
            None
        }
    }
}
