//! Grammar registry
//!
//! The set of supported languages is closed: anything not listed in
//! [`SupportedLanguage`] is simply unsupported, and lookups for it return `None`.
//! Grammars are either statically linked from the grammar crates or opened at
//! runtime from a directory of shared libraries.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use tracing::{debug, trace};
use tree_sitter::Language;
use tree_sitter_language::LanguageFn;

use crate::error::{Result, SyntaxError};

/// Languages with structural support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SupportedLanguage {
    JavaScript,
    JavaScriptReact,
    TypeScript,
    TypeScriptReact,
    Python,
    Go,
    Rust,
}

impl SupportedLanguage {
    pub const ALL: [SupportedLanguage; 7] = [
        SupportedLanguage::JavaScript,
        SupportedLanguage::JavaScriptReact,
        SupportedLanguage::TypeScript,
        SupportedLanguage::TypeScriptReact,
        SupportedLanguage::Python,
        SupportedLanguage::Go,
        SupportedLanguage::Rust,
    ];

    /// Map an editor language identifier to a supported language.
    ///
    /// Unknown identifiers are not an error; callers use this for feature detection.
    pub fn from_language_id(language_id: &str) -> Option<Self> {
        match language_id {
            "javascript" => Some(Self::JavaScript),
            "javascriptreact" => Some(Self::JavaScriptReact),
            "typescript" => Some(Self::TypeScript),
            "typescriptreact" => Some(Self::TypeScriptReact),
            "python" => Some(Self::Python),
            "go" => Some(Self::Go),
            "rust" => Some(Self::Rust),
            _ => None,
        }
    }

    /// The editor language identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::JavaScriptReact => "javascriptreact",
            Self::TypeScript => "typescript",
            Self::TypeScriptReact => "typescriptreact",
            Self::Python => "python",
            Self::Go => "go",
            Self::Rust => "rust",
        }
    }

    /// Name of the tree-sitter grammar backing this language.
    ///
    /// Used both for the shared library file name and its exported symbol.
    pub fn grammar_name(&self) -> &'static str {
        match self {
            Self::JavaScript | Self::JavaScriptReact => "javascript",
            Self::TypeScript => "typescript",
            Self::TypeScriptReact => "tsx",
            Self::Python => "python",
            Self::Go => "go",
            Self::Rust => "rust",
        }
    }

    pub fn config(&self) -> LanguageConfig {
        match self {
            Self::JavaScript
            | Self::JavaScriptReact
            | Self::TypeScript
            | Self::TypeScriptReact
            | Self::Go
            | Self::Rust => LanguageConfig {
                comment_start: "// ",
                block_start: "{",
                block_end: Some("}"),
            },
            Self::Python => LanguageConfig {
                comment_start: "# ",
                block_start: ":",
                block_end: None,
            },
        }
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Editing conventions for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageConfig {
    pub comment_start: &'static str,
    pub block_start: &'static str,
    /// `None` for indentation-delimited languages
    pub block_end: Option<&'static str>,
}

/// Where grammar artifacts come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GrammarLocation {
    /// Statically linked grammar crates
    #[default]
    Bundled,
    /// Directory containing `tree-sitter-<grammar>.<dll extension>` files
    Directory(PathBuf),
}

impl fmt::Display for GrammarLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarLocation::Bundled => f.write_str("<bundled>"),
            GrammarLocation::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// A loaded grammar.
///
/// Grammars opened from a shared library keep the library mapped for as long
/// as any clone of the grammar is alive, since the language tables live in it.
#[derive(Clone)]
pub struct Grammar {
    language: SupportedLanguage,
    ts_language: Language,
    _library: Option<Arc<Library>>,
}

impl Grammar {
    pub fn language(&self) -> SupportedLanguage {
        self.language
    }

    pub fn ts_language(&self) -> &Language {
        &self.ts_language
    }

    pub fn is_dynamic(&self) -> bool {
        self._library.is_some()
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("language", &self.language)
            .field("dynamic", &self.is_dynamic())
            .finish()
    }
}

/// A resolved, loadable grammar reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarHandle {
    pub language: SupportedLanguage,
    pub location: GrammarLocation,
}

impl GrammarHandle {
    /// Path of the shared library this handle would load, if it is not bundled.
    pub fn library_path(&self) -> Option<PathBuf> {
        match &self.location {
            GrammarLocation::Bundled => None,
            GrammarLocation::Directory(dir) => Some(library_path(dir, self.language)),
        }
    }

    /// Load the grammar. Blocking when the location is a directory.
    pub fn load(&self) -> Result<Grammar> {
        match &self.location {
            GrammarLocation::Bundled => Ok(load_bundled(self.language)),
            GrammarLocation::Directory(dir) => load_from_directory(self.language, dir),
        }
    }
}

/// Registry of supported languages bound to one grammar location.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    location: GrammarLocation,
}

impl GrammarRegistry {
    pub fn new(location: GrammarLocation) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &GrammarLocation {
        &self.location
    }

    pub fn is_supported(&self, language_id: &str) -> bool {
        SupportedLanguage::from_language_id(language_id).is_some()
    }

    /// Resolve a language identifier to a loadable grammar, or `None` when unsupported.
    pub fn resolve(&self, language_id: &str) -> Option<GrammarHandle> {
        SupportedLanguage::from_language_id(language_id).map(|language| self.handle(language))
    }

    pub fn handle(&self, language: SupportedLanguage) -> GrammarHandle {
        GrammarHandle {
            language,
            location: self.location.clone(),
        }
    }
}

fn library_path(dir: &Path, language: SupportedLanguage) -> PathBuf {
    dir.join(format!(
        "tree-sitter-{}.{}",
        language.grammar_name(),
        std::env::consts::DLL_EXTENSION
    ))
}

fn load_bundled(language: SupportedLanguage) -> Grammar {
    trace!("Using bundled {} grammar", language);
    let ts_language: Language = match language {
        SupportedLanguage::JavaScript | SupportedLanguage::JavaScriptReact => {
            tree_sitter_javascript::LANGUAGE.into()
        }
        SupportedLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        SupportedLanguage::TypeScriptReact => tree_sitter_typescript::LANGUAGE_TSX.into(),
        SupportedLanguage::Python => tree_sitter_python::LANGUAGE.into(),
        SupportedLanguage::Go => tree_sitter_go::LANGUAGE.into(),
        SupportedLanguage::Rust => tree_sitter_rust::LANGUAGE.into(),
    };

    Grammar {
        language,
        ts_language,
        _library: None,
    }
}

fn load_from_directory(language: SupportedLanguage, dir: &Path) -> Result<Grammar> {
    let path = library_path(dir, language);
    let load_error = |reason: String| SyntaxError::GrammarLoad {
        language: language.to_string(),
        location: path.display().to_string(),
        reason,
    };

    if !path.is_file() {
        return Err(load_error("grammar artifact not found".to_string()));
    }

    debug!("Loading {} grammar from {}", language, path.display());

    // SAFETY: the library is a tree-sitter grammar; its initializers have no
    // requirements beyond being loaded once per path.
    let library = unsafe { Library::new(&path) }.map_err(|e| load_error(e.to_string()))?;

    let symbol = format!("tree_sitter_{}", language.grammar_name());
    let constructor: unsafe extern "C" fn() -> *const () = {
        // SAFETY: tree-sitter grammars export `tree_sitter_<name>` with exactly this signature.
        let symbol = unsafe { library.get::<unsafe extern "C" fn() -> *const ()>(symbol.as_bytes()) }
            .map_err(|e| load_error(e.to_string()))?;
        *symbol
    };

    // SAFETY: `constructor` returns a pointer to a static TSLanguage that stays
    // valid while `library` is loaded, which the returned Grammar guarantees.
    let ts_language = Language::new(unsafe { LanguageFn::from_raw(constructor) });

    Ok(Grammar {
        language,
        ts_language,
        _library: Some(Arc::new(library)),
    })
}
