//! One parser per language, loaded on demand
//!
//! `get_parser` only reads the pool. Loading is an explicit async step
//! (`load_parser`), memoized per language so concurrent loads share a single
//! grammar load and a single parser.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info, trace};
use tree_sitter::{Parser, Tree};

use crate::error::{Result, SyntaxError};
use crate::grammars::{Grammar, GrammarHandle, GrammarLocation, SupportedLanguage};
use crate::queries::CompiledPatternStore;

/// A parser bound to one grammar.
pub struct LanguageParser {
    language: SupportedLanguage,
    grammar: Grammar,
    parser: Mutex<Parser>,
}

impl LanguageParser {
    pub fn new(grammar: Grammar) -> Result<Self> {
        let language = grammar.language();
        let mut parser = Parser::new();
        parser
            .set_language(grammar.ts_language())
            .map_err(|source| SyntaxError::IncompatibleGrammar {
                language: language.to_string(),
                source,
            })?;

        Ok(Self {
            language,
            grammar,
            parser: Mutex::new(parser),
        })
    }

    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parse `text`, reusing `old_tree` when it has been edited to match.
    ///
    /// Invalid source still produces a tree; it just contains error nodes.
    pub fn parse(&self, text: &str, old_tree: Option<&Tree>) -> Result<Tree> {
        trace!(
            "{} parse of {} bytes ({})",
            self.language,
            text.len(),
            if old_tree.is_some() { "incremental" } else { "full" }
        );
        self.parser
            .lock()
            .parse(text, old_tree)
            .ok_or_else(|| SyntaxError::ParseAborted {
                language: self.language.to_string(),
            })
    }
}

impl fmt::Debug for LanguageParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageParser")
            .field("language", &self.language)
            .field("grammar", &self.grammar)
            .finish()
    }
}

type ParserSlot = Arc<OnceCell<Arc<LanguageParser>>>;

pub struct ParserPool {
    parsers: DashMap<SupportedLanguage, ParserSlot>,
    patterns: Arc<CompiledPatternStore>,
}

impl ParserPool {
    pub fn new(patterns: Arc<CompiledPatternStore>) -> Self {
        Self {
            parsers: DashMap::new(),
            patterns,
        }
    }

    pub fn patterns(&self) -> &Arc<CompiledPatternStore> {
        &self.patterns
    }

    /// The loaded parser for `language`, or `None` if it has not been loaded.
    pub fn get_parser(&self, language: SupportedLanguage) -> Option<Arc<LanguageParser>> {
        self.parsers.get(&language)?.value().get().cloned()
    }

    /// Load the grammar and parser for the handle's language, then compile its patterns.
    ///
    /// Idempotent. Concurrent calls for the same language wait on the same
    /// load. If loading fails nothing is cached, so a later call tries again.
    pub async fn load_parser(&self, handle: &GrammarHandle) -> Result<Arc<LanguageParser>> {
        let language = handle.language;
        let slot: ParserSlot = Arc::clone(&self.parsers.entry(language).or_default());

        let parser = slot
            .get_or_try_init(|| async {
                let grammar = load_grammar(handle).await?;
                let parser = LanguageParser::new(grammar)?;
                self.patterns.compile_all_for_language(parser.grammar(), language)?;
                info!("Loaded {} parser from {}", language, handle.location);
                Ok::<_, SyntaxError>(Arc::new(parser))
            })
            .await?;

        Ok(Arc::clone(parser))
    }

    pub fn loaded_languages(&self) -> Vec<SupportedLanguage> {
        let mut languages: Vec<_> = self
            .parsers
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| *entry.key())
            .collect();
        languages.sort();
        languages
    }

    /// Drop every cached parser. Trees produced earlier stay valid.
    pub fn reset(&self) {
        debug!("Resetting parser pool ({} languages)", self.parsers.len());
        self.parsers.clear();
    }
}

async fn load_grammar(handle: &GrammarHandle) -> Result<Grammar> {
    match handle.location {
        GrammarLocation::Bundled => handle.load(),
        GrammarLocation::Directory(_) => {
            let blocking_handle = handle.clone();
            tokio::task::spawn_blocking(move || blocking_handle.load())
                .await
                .map_err(|e| SyntaxError::GrammarLoad {
                    language: handle.language.to_string(),
                    location: handle.location.to_string(),
                    reason: e.to_string(),
                })?
        }
    }
}
