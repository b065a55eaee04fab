//! Pattern catalog
//!
//! Per-language tree-sitter pattern sources, grouped by what they are used for.
//! The built-in catalog is static data; a catalog can also be read from a
//! directory of `<language>/<purpose>.scm` files for fixtures.
//!
//! Some languages inherit another language's patterns. The effective source
//! for such a language is its ancestors' sources followed by its own, so
//! parent patterns act as fallback matches.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{Result, SyntaxError};
use crate::grammars::SupportedLanguage;

pub mod compiled;
mod go;
mod javascript;
mod python;
mod rust;

pub use compiled::{CompiledPattern, CompiledPatternStore};

/// What a group of patterns is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryPurpose {
    SinglelineTriggers,
    Intents,
    DocumentableNodes,
    Identifiers,
    GraphContextIdentifiers,
    EnclosingFunction,
}

impl QueryPurpose {
    pub const ALL: [QueryPurpose; 6] = [
        QueryPurpose::SinglelineTriggers,
        QueryPurpose::Intents,
        QueryPurpose::DocumentableNodes,
        QueryPurpose::Identifiers,
        QueryPurpose::GraphContextIdentifiers,
        QueryPurpose::EnclosingFunction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryPurpose::SinglelineTriggers => "singlelineTriggers",
            QueryPurpose::Intents => "intents",
            QueryPurpose::DocumentableNodes => "documentableNodes",
            QueryPurpose::Identifiers => "identifiers",
            QueryPurpose::GraphContextIdentifiers => "graphContextIdentifiers",
            QueryPurpose::EnclosingFunction => "enclosingFunction",
        }
    }
}

impl fmt::Display for QueryPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryPurpose {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self> {
        QueryPurpose::ALL
            .into_iter()
            .find(|purpose| purpose.as_str() == s)
            .ok_or_else(|| SyntaxError::UnknownPurpose(s.to_string()))
    }
}

/// Static inheritance table: child language and the language it extends.
const INHERITANCE: &[(SupportedLanguage, SupportedLanguage)] = &[
    (SupportedLanguage::JavaScriptReact, SupportedLanguage::JavaScript),
    (SupportedLanguage::TypeScriptReact, SupportedLanguage::TypeScript),
];

/// Purposes whose source for a language is complete and ignores its ancestors.
const STANDALONE: &[(SupportedLanguage, QueryPurpose)] = &[(
    SupportedLanguage::JavaScriptReact,
    QueryPurpose::GraphContextIdentifiers,
)];

fn inherits(language: SupportedLanguage, purpose: QueryPurpose) -> bool {
    !STANDALONE.contains(&(language, purpose))
}

/// Ancestors of `language`, most distant first, not including `language` itself.
pub fn ancestors(language: SupportedLanguage) -> Vec<SupportedLanguage> {
    let mut chain = Vec::new();
    let mut current = language;
    while let Some(&(_, parent)) = INHERITANCE.iter().find(|(child, _)| *child == current) {
        if parent == language || chain.contains(&parent) {
            break;
        }
        chain.push(parent);
        current = parent;
    }
    chain.reverse();
    chain
}

type PurposeSources = BTreeMap<QueryPurpose, String>;

/// Language → purpose → pattern source.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    sources: BTreeMap<SupportedLanguage, PurposeSources>,
}

impl PatternCatalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> Self {
        let mut sources = BTreeMap::new();
        for language in SupportedLanguage::ALL {
            let entries: PurposeSources = builtin_entries(language)
                .iter()
                .map(|(purpose, source)| (*purpose, (*source).to_string()))
                .collect();
            sources.insert(language, entries);
        }
        Self { sources }
    }

    /// Build a catalog from explicit entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (SupportedLanguage, QueryPurpose, S)>,
        S: Into<String>,
    {
        let mut sources: BTreeMap<SupportedLanguage, PurposeSources> = BTreeMap::new();
        for (language, purpose, source) in entries {
            sources.entry(language).or_default().insert(purpose, source.into());
        }
        Self { sources }
    }

    /// Read a catalog laid out as `<dir>/<language>/<purpose>.scm`.
    ///
    /// Directories named after unsupported languages are skipped. A file whose
    /// stem is not a known purpose is an error.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read_dir = |path: &Path| {
            fs::read_dir(path).map_err(|source| SyntaxError::PatternDirectory {
                path: path.to_path_buf(),
                source,
            })
        };

        let mut sources: BTreeMap<SupportedLanguage, PurposeSources> = BTreeMap::new();
        for entry in read_dir(dir)? {
            let entry = entry.map_err(|source| SyntaxError::PatternDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
            let language_dir = entry.path();
            if !language_dir.is_dir() {
                continue;
            }
            let Some(language) = language_dir
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(SupportedLanguage::from_language_id)
            else {
                warn!("Skipping pattern directory for unsupported language: {}", language_dir.display());
                continue;
            };

            for file in read_dir(&language_dir)? {
                let file = file.map_err(|source| SyntaxError::PatternDirectory {
                    path: language_dir.clone(),
                    source,
                })?;
                let path = file.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("scm") {
                    continue;
                }
                let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default();
                let purpose = stem.parse::<QueryPurpose>()?;
                let source = fs::read_to_string(&path).map_err(|source| SyntaxError::PatternDirectory {
                    path: path.clone(),
                    source,
                })?;
                debug!("Loaded {} patterns for {} from {}", purpose, language, path.display());
                sources.entry(language).or_default().insert(purpose, source);
            }
        }

        Ok(Self { sources })
    }

    /// The language's own source for a purpose, without inherited patterns.
    pub fn own_source(&self, language: SupportedLanguage, purpose: QueryPurpose) -> Option<&str> {
        self.sources.get(&language)?.get(&purpose).map(String::as_str)
    }

    /// Purposes with a source for this language or any of its ancestors.
    pub fn purposes(&self, language: SupportedLanguage) -> Vec<QueryPurpose> {
        let mut purposes: Vec<QueryPurpose> = ancestors(language)
            .into_iter()
            .chain(std::iter::once(language))
            .filter_map(|lang| self.sources.get(&lang))
            .flat_map(|entries| entries.keys().copied())
            .collect();
        purposes.sort();
        purposes.dedup();
        purposes
    }

    /// Effective source for a purpose: ancestor sources first, then the language's own.
    ///
    /// A standalone (language, purpose) pair uses only the language's own source.
    pub fn effective_source(&self, language: SupportedLanguage, purpose: QueryPurpose) -> String {
        let chain = match inherits(language, purpose) {
            true => ancestors(language),
            false => Vec::new(),
        };
        chain
            .into_iter()
            .chain(std::iter::once(language))
            .filter_map(|lang| self.own_source(lang, purpose))
            .filter(|source| !source.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn builtin_entries(language: SupportedLanguage) -> &'static [(QueryPurpose, &'static str)] {
    match language {
        SupportedLanguage::JavaScript => javascript::JAVASCRIPT,
        SupportedLanguage::JavaScriptReact => javascript::JAVASCRIPT_REACT,
        SupportedLanguage::TypeScript => javascript::TYPESCRIPT,
        SupportedLanguage::TypeScriptReact => javascript::TYPESCRIPT_REACT,
        SupportedLanguage::Python => python::PYTHON,
        SupportedLanguage::Go => go::GO,
        SupportedLanguage::Rust => rust::RUST,
    }
}
