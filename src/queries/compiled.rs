//! Compiled pattern store
//!
//! Compiles catalog sources against a loaded grammar. Compilation for a
//! language happens once: the first load wins and later calls are no-ops
//! until [`CompiledPatternStore::reset`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::{debug, trace};
use tree_sitter::Query;

use super::{PatternCatalog, QueryPurpose};
use crate::error::{Result, SyntaxError};
use crate::grammars::{Grammar, SupportedLanguage};

/// A pattern source compiled for one (language, purpose) pair.
pub struct CompiledPattern {
    language: SupportedLanguage,
    purpose: QueryPurpose,
    query: Query,
    // Keeps a dynamically loaded grammar mapped while the query is alive.
    _grammar: Grammar,
}

impl CompiledPattern {
    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    pub fn purpose(&self) -> QueryPurpose {
        self.purpose
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn capture_names(&self) -> &[&str] {
        self.query.capture_names()
    }
}

impl fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPattern")
            .field("language", &self.language)
            .field("purpose", &self.purpose)
            .field("patterns", &self.query.pattern_count())
            .finish()
    }
}

type PatternKey = (SupportedLanguage, QueryPurpose);

pub struct CompiledPatternStore {
    catalog: Arc<PatternCatalog>,
    patterns: RwLock<HashMap<PatternKey, Arc<CompiledPattern>>>,
    /// Languages whose catalog entries have been compiled
    compiled_languages: RwLock<HashSet<SupportedLanguage>>,
    compilations: AtomicUsize,
}

impl CompiledPatternStore {
    pub fn new(catalog: Arc<PatternCatalog>) -> Self {
        Self {
            catalog,
            patterns: RwLock::new(HashMap::new()),
            compiled_languages: RwLock::new(HashSet::new()),
            compilations: AtomicUsize::new(0),
        }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Compile every purpose the catalog defines for `language`.
    ///
    /// Returns immediately if the language was already compiled. A malformed
    /// source fails the whole call and leaves the language uncompiled.
    pub fn compile_all_for_language(&self, grammar: &Grammar, language: SupportedLanguage) -> Result<()> {
        // Held for the whole compilation so concurrent callers cannot both compile.
        let mut compiled_languages = self.compiled_languages.write();
        if compiled_languages.contains(&language) {
            trace!("Patterns for {} already compiled", language);
            return Ok(());
        }

        let mut compiled = Vec::new();
        for purpose in self.catalog.purposes(language) {
            let source = self.catalog.effective_source(language, purpose);
            if source.trim().is_empty() {
                continue;
            }

            let query = Query::new(grammar.ts_language(), &source).map_err(|source| {
                SyntaxError::PatternCompile {
                    language: language.to_string(),
                    purpose: purpose.to_string(),
                    source,
                }
            })?;
            trace!(
                "Compiled {} for {}: {} patterns, {} captures",
                purpose,
                language,
                query.pattern_count(),
                query.capture_names().len()
            );

            compiled.push((
                (language, purpose),
                Arc::new(CompiledPattern {
                    language,
                    purpose,
                    query,
                    _grammar: grammar.clone(),
                }),
            ));
        }

        debug!("Compiled {} pattern groups for {}", compiled.len(), language);
        self.compilations.fetch_add(compiled.len(), Ordering::Relaxed);
        self.patterns.write().extend(compiled);
        compiled_languages.insert(language);
        Ok(())
    }

    /// The compiled pattern for a pair, shared with every other caller.
    pub fn get(&self, language: SupportedLanguage, purpose: QueryPurpose) -> Option<Arc<CompiledPattern>> {
        self.patterns.read().get(&(language, purpose)).cloned()
    }

    pub fn is_compiled(&self, language: SupportedLanguage) -> bool {
        self.compiled_languages.read().contains(&language)
    }

    /// Total number of pattern groups compiled since construction or the last reset.
    pub fn compilation_count(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        let mut compiled_languages = self.compiled_languages.write();
        self.patterns.write().clear();
        compiled_languages.clear();
        self.compilations.store(0, Ordering::Relaxed);
    }
}
