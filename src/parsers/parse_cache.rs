//! Parse-tree cache keyed by document identity
//!
//! Holds the latest syntax tree for each open document, bounded by an LRU
//! policy. Each slot owns its tree; when a slot is evicted, replaced or
//! removed, the tree is released right there and counted in
//! [`ParseCacheStats::released`].
//!
//! ## Entry lifecycle
//!
//! ```text
//! absent ── parse_full ──▶ parsed ── apply_edits ──▶ parsed (edited)
//!                            │                          │
//!                            └──── evicted / replaced / removed ──▶ released
//! ```
//!
//! Readers get a [`CachedTree`] snapshot. Snapshots are cheap clones of the
//! tree, so a reader holding one is never affected by a later eviction.
//!
//! An edit batch runs entirely under the cache's write lock: every edit is
//! applied to the tree in order and exactly one incremental reparse follows,
//! so no reader can observe a half-applied batch.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::RwLock;
use tracing::{debug, trace, warn};
use tree_sitter::Tree;

use crate::config::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_DOCUMENT_LINES};
use crate::document::{ContentChange, SourceDocument, TextDocument, TreeEdit};
use crate::error::Result;
use crate::grammars::{GrammarRegistry, SupportedLanguage};

use super::parser_pool::{LanguageParser, ParserPool};

/// Snapshot of a cache entry.
#[derive(Debug, Clone)]
pub struct CachedTree {
    pub key: String,
    pub tree: Tree,
    pub parser: Arc<LanguageParser>,
}

impl CachedTree {
    pub fn language(&self) -> SupportedLanguage {
        self.parser.language()
    }
}

struct CacheEntry {
    tree: Tree,
    parser: Arc<LanguageParser>,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseCacheStats {
    pub capacity: usize,
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    /// Entries pushed out by capacity pressure
    pub evictions: u64,
    /// Trees released for any reason: eviction, replacement, removal or reset
    pub released: u64,
    pub full_parses: u64,
    pub incremental_parses: u64,
}

impl ParseCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct ParseTreeCache {
    entries: RwLock<LruCache<String, CacheEntry>>,
    stats: RwLock<ParseCacheStats>,
    pool: Arc<ParserPool>,
    registry: GrammarRegistry,
    max_document_lines: usize,
}

impl ParseTreeCache {
    /// Create a cache with the default capacity and line ceiling.
    pub fn new(pool: Arc<ParserPool>, registry: GrammarRegistry) -> Self {
        Self::with_limits(pool, registry, DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_DOCUMENT_LINES)
    }

    /// Create a cache holding at most `capacity` trees (minimum 1), ignoring
    /// documents longer than `max_document_lines`.
    pub fn with_limits(
        pool: Arc<ParserPool>,
        registry: GrammarRegistry,
        capacity: usize,
        max_document_lines: usize,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            stats: RwLock::new(ParseCacheStats {
                capacity: capacity.get(),
                ..Default::default()
            }),
            pool,
            registry,
            max_document_lines,
        }
    }

    pub fn pool(&self) -> &Arc<ParserPool> {
        &self.pool
    }

    pub fn max_document_lines(&self) -> usize {
        self.max_document_lines
    }

    /// Parse `text` from scratch and store the tree under `document_id`.
    ///
    /// Loads the language's parser if needed. Any previous entry for the
    /// document is released and replaced; if the cache is full, the least
    /// recently used entry is evicted and released.
    pub async fn parse_full(&self, document_id: &str, text: &str, language: SupportedLanguage) -> Result<()> {
        let handle = self.registry.handle(language);
        let parser = self.pool.load_parser(&handle).await?;
        let tree = parser.parse(text, None)?;
        if tree.root_node().has_error() {
            trace!("Parse tree for {} contains errors", document_id);
        }

        let mut entries = self.entries.write();
        let mut stats = self.stats.write();
        stats.full_parses += 1;

        if let Some((key, replaced)) = entries.push(document_id.to_string(), CacheEntry { tree, parser }) {
            if key == document_id {
                trace!("Replacing parse tree for {}", key);
            } else {
                debug!("Evicting parse tree for {}", key);
                stats.evictions += 1;
            }
            release(&mut stats, &key, replaced);
        }
        stats.size = entries.len();
        Ok(())
    }

    /// Parse a document fully if its language is supported and it is within
    /// the line ceiling, returning the fresh snapshot.
    pub async fn parse_document(&self, document: &impl TextDocument) -> Result<Option<CachedTree>> {
        let Some(language) = self.analyzable_language(document) else {
            return Ok(None);
        };
        self.parse_full(document.uri(), &document.text(), language).await?;
        Ok(self.get_cached_tree(document))
    }

    /// The current tree for `document`.
    ///
    /// `None` when the language is unsupported, the document exceeds the
    /// line ceiling, or nothing has been parsed for it yet.
    pub fn get_cached_tree(&self, document: &impl TextDocument) -> Option<CachedTree> {
        self.analyzable_language(document)?;

        let mut entries = self.entries.write();
        let mut stats = self.stats.write();
        match entries.get(document.uri()) {
            Some(entry) => {
                stats.hits += 1;
                Some(CachedTree {
                    key: document.uri().to_string(),
                    tree: entry.tree.clone(),
                    parser: Arc::clone(&entry.parser),
                })
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    /// Apply a batch of edits to the cached tree, then reparse once.
    ///
    /// `document` must already contain the post-edit text. Edits are applied
    /// in the order given. Returns `false` without doing anything when there
    /// is no entry for the document.
    pub fn apply_edits(&self, document: &impl TextDocument, edits: &[TreeEdit]) -> Result<bool> {
        let key = document.uri();
        let mut entries = self.entries.write();
        let Some(entry) = entries.get_mut(key) else {
            trace!("No cached tree for {}, ignoring {} edits", key, edits.len());
            return Ok(false);
        };

        for edit in edits {
            entry.tree.edit(edit);
        }

        let text = document.text();
        let reparsed = entry.parser.parse(&text, Some(&entry.tree)).or_else(|e| {
            warn!("Incremental parse of {} failed ({}), performing full parse", key, e);
            entry.parser.parse(&text, None)
        });

        let mut stats = self.stats.write();
        match reparsed {
            Ok(tree) => {
                stats.incremental_parses += 1;
                let previous = std::mem::replace(&mut entry.tree, tree);
                drop(previous);
                Ok(true)
            }
            Err(e) => {
                // The edited tree no longer matches any text we can parse.
                if let Some(stale) = entries.pop(key) {
                    release(&mut stats, key, stale);
                }
                stats.size = entries.len();
                Err(e)
            }
        }
    }

    /// Apply host changes to `document` and patch its cached tree to match.
    pub fn update_on_change(&self, document: &mut SourceDocument, changes: &[ContentChange]) -> Result<bool> {
        let edits = document.apply_changes(changes);
        self.apply_edits(document, &edits)
    }

    /// Drop the entry for a closed document.
    pub fn remove(&self, document_id: &str) -> bool {
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();
        let removed = entries.pop(document_id);
        let found = removed.is_some();
        if let Some(entry) = removed {
            release(&mut stats, document_id, entry);
        }
        stats.size = entries.len();
        found
    }

    /// Whether an entry exists, without touching its recency.
    pub fn contains(&self, document_id: &str) -> bool {
        self.entries.read().contains(document_id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> ParseCacheStats {
        self.stats.read().clone()
    }

    /// Release every entry and zero the statistics.
    pub fn reset(&self) {
        let mut entries = self.entries.write();
        let mut stats = self.stats.write();
        while let Some((key, entry)) = entries.pop_lru() {
            release(&mut stats, &key, entry);
        }
        *stats = ParseCacheStats {
            capacity: entries.cap().get(),
            ..Default::default()
        };
    }

    fn analyzable_language(&self, document: &impl TextDocument) -> Option<SupportedLanguage> {
        let language = SupportedLanguage::from_language_id(document.language_id())?;
        let lines = document.line_count();
        if lines > self.max_document_lines {
            debug!(
                "{} has {} lines, above the {} line ceiling",
                document.uri(),
                lines,
                self.max_document_lines
            );
            return None;
        }
        Some(language)
    }
}

fn release(stats: &mut ParseCacheStats, key: &str, entry: CacheEntry) {
    trace!("Releasing parse tree for {}", key);
    drop(entry.tree);
    stats.released += 1;
}
