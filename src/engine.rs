//! The engine facade
//!
//! [`SyntaxEngine`] wires the grammar registry, compiled pattern store,
//! parser pool, parse-tree cache and query engine together. Hosts build one
//! explicitly and pass it around; nothing here is a global.

use std::sync::Arc;

use tracing::{debug, info};
use tree_sitter::Point;

use crate::analysis;
use crate::config::EngineConfig;
use crate::document::{ContentChange, SourceDocument, TextDocument};
use crate::error::Result;
use crate::grammars::GrammarRegistry;
use crate::parsers::parse_cache::{CachedTree, ParseTreeCache};
use crate::parsers::parser_pool::ParserPool;
use crate::parsers::position_utils::TextRange;
use crate::queries::{CompiledPatternStore, PatternCatalog};
use crate::tree_sitter::{CompletionIntent, DocumentQuerySdk, QueryEngine};

pub struct SyntaxEngine {
    config: EngineConfig,
    registry: GrammarRegistry,
    patterns: Arc<CompiledPatternStore>,
    pool: Arc<ParserPool>,
    cache: ParseTreeCache,
    queries: QueryEngine,
}

impl SyntaxEngine {
    /// Create an engine using the built-in pattern catalog.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_catalog(config, PatternCatalog::builtin())
    }

    pub fn with_catalog(config: EngineConfig, catalog: PatternCatalog) -> Self {
        let config = config.normalized();
        let registry = GrammarRegistry::new(config.grammar_location());
        let patterns = Arc::new(CompiledPatternStore::new(Arc::new(catalog)));
        let pool = Arc::new(ParserPool::new(Arc::clone(&patterns)));
        let cache = ParseTreeCache::with_limits(
            Arc::clone(&pool),
            registry.clone(),
            config.cache_capacity,
            config.max_document_lines,
        );
        let queries = QueryEngine::new(Arc::clone(&patterns));

        info!(
            "Syntax engine ready (grammars: {}, cache capacity: {})",
            registry.location(),
            config.cache_capacity
        );
        Self {
            config,
            registry,
            patterns,
            pool,
            cache,
            queries,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &GrammarRegistry {
        &self.registry
    }

    pub fn patterns(&self) -> &Arc<CompiledPatternStore> {
        &self.patterns
    }

    pub fn pool(&self) -> &Arc<ParserPool> {
        &self.pool
    }

    pub fn cache(&self) -> &ParseTreeCache {
        &self.cache
    }

    pub fn queries(&self) -> &QueryEngine {
        &self.queries
    }

    /// Parse a newly opened (or fully replaced) document.
    pub async fn open(&self, document: &impl TextDocument) -> Result<Option<CachedTree>> {
        self.cache.parse_document(document).await
    }

    /// Apply host edits to the document and its cached tree.
    pub fn change(&self, document: &mut SourceDocument, changes: &[ContentChange]) -> Result<bool> {
        self.cache.update_on_change(document, changes)
    }

    pub fn close(&self, document_id: &str) -> bool {
        self.cache.remove(document_id)
    }

    /// Run `f` against the cached tree of `document`.
    ///
    /// `None` when the document has no usable tree (unsupported language,
    /// too many lines, or never parsed).
    pub fn with_query_sdk<R>(
        &self,
        document: &impl TextDocument,
        f: impl for<'a> FnOnce(&DocumentQuerySdk<'a>) -> R,
    ) -> Option<R> {
        let cached = self.cache.get_cached_tree(document)?;
        let text = document.text();
        let sdk = self
            .queries
            .for_document(cached.language(), cached.tree.root_node(), text.as_bytes());
        Some(f(&sdk))
    }

    pub fn enclosing_node_within_char_limit(
        &self,
        document: &impl TextDocument,
        position: Point,
        char_limit: usize,
        expand_to_full_line: bool,
    ) -> Option<TextRange> {
        let cached = self.cache.get_cached_tree(document)?;
        Some(analysis::enclosing_node_within_char_limit(
            &cached.tree,
            document,
            position,
            char_limit,
            expand_to_full_line,
        ))
    }

    /// Most recent distinct identifiers before `position`, nearest first.
    pub fn last_n_identifiers(&self, document: &impl TextDocument, position: Point, n: usize) -> Vec<String> {
        let window = self.config.identifier_window_lines;
        self.with_query_sdk(document, |sdk| analysis::last_n_identifiers(sdk, position, n, window))
            .unwrap_or_default()
    }

    /// Intent at a host cursor, with the range of the node it applies to.
    pub fn completion_intent(
        &self,
        document: &impl TextDocument,
        position: Point,
    ) -> Option<(CompletionIntent, TextRange)> {
        self.with_query_sdk(document, |sdk| {
            analysis::completion_intent_at_cursor(sdk, document, position)
                .map(|capture| (capture.intent, TextRange::of_node(&capture.node)))
        })
        .flatten()
    }

    /// Drop every cached tree, parser and compiled pattern.
    pub fn reset(&self) {
        debug!("Resetting syntax engine");
        self.cache.reset();
        self.pool.reset();
        self.patterns.reset();
    }
}
