use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use tracing::debug;
use tree_sitter::Point;

use syntax_query::config::EngineConfig;
use syntax_query::document::{SourceDocument, TextDocument};
use syntax_query::engine::SyntaxEngine;
use syntax_query::grammars::SupportedLanguage;
use syntax_query::logging::init_logger;
use syntax_query::parsers::position_utils::TextRange;
use syntax_query::queries::QueryPurpose;
use syntax_query::tree_sitter::{QueryResult, QueryWrapper};

/// Parse a source file and answer structural questions about it
#[derive(Parser, Debug)]
#[command(name = "syntax-query", version, about)]
struct Cli {
    /// Editor language identifier; inferred from the file extension when omitted
    #[arg(long, global = true)]
    language: Option<String>,

    /// Directory of tree-sitter grammar shared libraries
    #[arg(long, global = true)]
    grammar_dir: Option<PathBuf>,

    /// Disable ANSI colors in log output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log level filter (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the syntax tree as an S-expression
    Tree { file: PathBuf },
    /// Run one pattern purpose and print its raw captures
    Query {
        file: PathBuf,
        /// Purpose name, e.g. `enclosingFunction`
        #[arg(long)]
        purpose: String,
        #[arg(long, default_value_t = 0)]
        line: usize,
        #[arg(long, default_value_t = 0)]
        column: usize,
    },
    /// Innermost function, documentable node, testable node or trigger at a position
    Lookup {
        file: PathBuf,
        #[arg(long, value_parser = parse_wrapper)]
        kind: QueryWrapper,
        #[arg(long)]
        line: usize,
        #[arg(long)]
        column: usize,
    },
    /// Largest node around a position within a character budget
    Enclosing {
        file: PathBuf,
        #[arg(long)]
        line: usize,
        #[arg(long)]
        column: usize,
        #[arg(long, default_value_t = 1000)]
        limit: usize,
        /// Widen the result to whole lines
        #[arg(long)]
        full_line: bool,
    },
    /// Most recent distinct identifiers before a position
    Identifiers {
        file: PathBuf,
        #[arg(long)]
        line: usize,
        #[arg(long)]
        column: usize,
        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },
    /// Completion intent at a cursor
    Intent {
        file: PathBuf,
        #[arg(long)]
        line: usize,
        #[arg(long)]
        column: usize,
    },
}

impl Command {
    fn file(&self) -> &Path {
        match self {
            Command::Tree { file }
            | Command::Query { file, .. }
            | Command::Lookup { file, .. }
            | Command::Enclosing { file, .. }
            | Command::Identifiers { file, .. }
            | Command::Intent { file, .. } => file,
        }
    }
}

fn parse_wrapper(value: &str) -> Result<QueryWrapper, String> {
    match value {
        "enclosing-function" => Ok(QueryWrapper::EnclosingFunction),
        "documentable-node" => Ok(QueryWrapper::DocumentableNode),
        "testable-node" => Ok(QueryWrapper::TestableNode),
        "singleline-trigger" => Ok(QueryWrapper::SinglelineTrigger),
        other => Err(format!(
            "unknown lookup '{}' (expected enclosing-function, documentable-node, testable-node or singleline-trigger)",
            other
        )),
    }
}

fn language_for_path(path: &Path) -> Option<&'static str> {
    match path.extension()?.to_str()? {
        "js" | "mjs" | "cjs" => Some("javascript"),
        "jsx" => Some("javascriptreact"),
        "ts" | "mts" | "cts" => Some("typescript"),
        "tsx" => Some("typescriptreact"),
        "py" => Some("python"),
        "go" => Some("go"),
        "rs" => Some("rust"),
        _ => None,
    }
}

fn format_range(range: TextRange) -> String {
    format!(
        "{}:{}-{}:{}",
        range.start.row, range.start.column, range.end.row, range.end.column
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logger(cli.no_color, cli.log_level.as_deref(), false)?;

    let file = cli.command.file();
    let language_id = match &cli.language {
        Some(language) => language.clone(),
        None => language_for_path(file)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("cannot infer a language for {}; pass --language", file.display()))?,
    };
    if SupportedLanguage::from_language_id(&language_id).is_none() {
        anyhow::bail!("language '{}' is not supported", language_id);
    }

    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let document = SourceDocument::new(format!("file://{}", file.display()), language_id, &text);

    let mut config = EngineConfig::from_env_or_default(None);
    if let Some(dir) = &cli.grammar_dir {
        config.grammar_dir = Some(dir.clone());
    }
    let engine = SyntaxEngine::new(config);
    let cached = engine
        .open(&document)
        .await?
        .ok_or_else(|| anyhow!("{} exceeds the line ceiling", file.display()))?;
    debug!("Parsed {} ({} lines)", document.uri(), document.line_count());

    match &cli.command {
        Command::Tree { .. } => {
            println!("{}", cached.tree.root_node().to_sexp());
        }
        Command::Query {
            purpose, line, column, ..
        } => {
            let purpose: QueryPurpose = purpose.parse()?;
            let position = Point::new(*line, *column);
            let lines = engine.with_query_sdk(&document, |sdk| {
                sdk.captures(purpose, position, Point::new(line + document.line_count(), 0))
                    .iter()
                    .map(|capture| {
                        format!(
                            "@{} {} {:?}",
                            capture.name,
                            format_range(capture.range()),
                            capture.text(sdk.source())
                        )
                    })
                    .collect::<Vec<_>>()
            });
            for line in lines.unwrap_or_default() {
                println!("{}", line);
            }
        }
        Command::Lookup { kind, line, column, .. } => {
            let position = Point::new(*line, *column);
            let answer = engine.with_query_sdk(&document, |sdk| match sdk.run(*kind, position, position) {
                QueryResult::Capture(Some(capture)) => {
                    format!("@{} {}", capture.name, format_range(capture.range()))
                }
                QueryResult::Documentable(Some(node)) => format!(
                    "symbol={} range={} insertion={:?} show_hint={}",
                    node.symbol
                        .as_ref()
                        .map(|symbol| symbol.text(sdk.source()).to_string())
                        .unwrap_or_default(),
                    node.range
                        .as_ref()
                        .map(|range| format_range(range.range()))
                        .unwrap_or_default(),
                    node.insertion_point,
                    node.show_hint
                ),
                _ => "none".to_string(),
            });
            println!("{}", answer.unwrap_or_else(|| "none".to_string()));
        }
        Command::Enclosing {
            line,
            column,
            limit,
            full_line,
            ..
        } => {
            let position = Point::new(*line, *column);
            if let Some(range) = engine.enclosing_node_within_char_limit(&document, position, *limit, *full_line) {
                println!("{}", format_range(range));
                println!("{}", document.text_in_range(range));
            }
        }
        Command::Identifiers {
            line, column, count, ..
        } => {
            for identifier in engine.last_n_identifiers(&document, Point::new(*line, *column), *count) {
                println!("{}", identifier);
            }
        }
        Command::Intent { line, column, .. } => match engine.completion_intent(&document, Point::new(*line, *column)) {
            Some((intent, range)) => println!("{} {}", intent, format_range(range)),
            None => println!("none"),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intent_command() {
        let cli = Cli::try_parse_from([
            "syntax-query",
            "intent",
            "src/app.ts",
            "--line",
            "3",
            "--column",
            "7",
            "--no-color",
        ])
        .unwrap();

        assert!(cli.no_color);
        match cli.command {
            Command::Intent { file, line, column } => {
                assert_eq!(file, PathBuf::from("src/app.ts"));
                assert_eq!((line, column), (3, 7));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_lookup_kind_is_validated() {
        let ok = Cli::try_parse_from([
            "syntax-query", "lookup", "a.py", "--kind", "documentable-node", "--line", "0", "--column", "4",
        ]);
        assert!(ok.is_ok());

        let bad = Cli::try_parse_from([
            "syntax-query", "lookup", "a.py", "--kind", "everything", "--line", "0", "--column", "4",
        ]);
        assert!(bad.is_err());
    }

    #[test]
    fn test_language_inferred_from_extension() {
        assert_eq!(language_for_path(Path::new("a/b.tsx")), Some("typescriptreact"));
        assert_eq!(language_for_path(Path::new("main.rs")), Some("rust"));
        assert_eq!(language_for_path(Path::new("README")), None);
    }
}
