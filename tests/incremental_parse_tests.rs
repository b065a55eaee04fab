//! Incremental reparsing against full parses, error-node degradation, and
//! enclosing-node monotonicity.

mod common;

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
use syntax_query::document::{ContentChange, SourceDocument, TextDocument};
use syntax_query::grammars::SupportedLanguage;
use syntax_query::tree_sitter::QueryWrapper;
use syntax_query::SyntaxEngine;
use tree_sitter::Point;

use common::{document, engine, point_of};

const BASE_SOURCE: &str = "function add(a, b) {\n  const total = a + b;\n  return total * 2;\n}\n\nconst x = add(1, 2);\n";

const INSERTIONS: &[&str] = &["", "1", "x", " ", "\n", " + 1", ";", "()", "foo"];

#[derive(Clone, Debug)]
struct EditCase {
    changes: Vec<(usize, usize, &'static str)>,
}

impl Arbitrary for EditCase {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = 1 + usize::arbitrary(g) % 3;
        let changes = (0..count)
            .map(|_| {
                let offset = usize::arbitrary(g) % (BASE_SOURCE.len() + 1);
                let old_len = usize::arbitrary(g) % 4;
                let insert = *g.choose(INSERTIONS).unwrap_or(&"");
                (offset, old_len, insert)
            })
            .collect();
        EditCase { changes }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let changes = self.changes.clone();
        Box::new((0..changes.len()).map(move |skip| EditCase {
            changes: changes
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, change)| *change)
                .collect(),
        }))
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn sexp_after(engine: &SyntaxEngine, doc: &SourceDocument) -> String {
    engine
        .cache()
        .get_cached_tree(doc)
        .unwrap()
        .tree
        .root_node()
        .to_sexp()
}

#[test]
fn test_incremental_edits_match_full_parse() {
    fn prop(case: EditCase) -> TestResult {
        let rt = runtime();
        rt.block_on(async {
            let engine = engine();
            let mut edited = document("file:///edited.js", "javascript", BASE_SOURCE);
            engine.open(&edited).await.unwrap();

            let changes: Vec<_> = case
                .changes
                .iter()
                .map(|(offset, old_len, text)| ContentChange::replace(*offset, *old_len, *text))
                .collect();
            engine.change(&mut edited, &changes).unwrap();

            let fresh = document("file:///fresh.js", "javascript", &edited.text());
            let fresh_tree = engine.open(&fresh).await.unwrap().unwrap();
            if fresh_tree.tree.root_node().has_error() {
                return TestResult::discard();
            }

            TestResult::from_bool(sexp_after(&engine, &edited) == fresh_tree.tree.root_node().to_sexp())
        })
    }

    QuickCheck::new()
        .tests(100)
        .max_tests(2000)
        .quickcheck(prop as fn(EditCase) -> TestResult);
}

#[tokio::test]
async fn test_batch_of_edits_reparses_once() {
    let engine = engine();
    let mut doc = document("file:///batch.py", "python", "def f(a):\n    return a\n");
    engine.open(&doc).await.unwrap();

    let changes = [
        ContentChange::replace(6, 1, "value"),
        ContentChange::replace(25, 1, "value"),
        ContentChange::insert(0, "import os\n\n"),
    ];
    assert!(engine.change(&mut doc, &changes).unwrap());

    assert_eq!(doc.text(), "import os\n\ndef f(value):\n    return value\n");
    let stats = engine.cache().stats();
    assert_eq!(stats.full_parses, 1);
    assert_eq!(stats.incremental_parses, 1);

    let fresh = document("file:///fresh.py", "python", &doc.text());
    let fresh_tree = engine.open(&fresh).await.unwrap().unwrap();
    assert_eq!(sexp_after(&engine, &doc), fresh_tree.tree.root_node().to_sexp());
}

#[tokio::test]
async fn test_change_without_entry_is_noop() {
    let engine = engine();
    let mut doc = document("file:///never-opened.go", "go", "package main\n");
    assert!(!engine.change(&mut doc, &[ContentChange::insert(12, "\n")]).unwrap());
    assert!(engine.cache().is_empty());
}

/// (language id, valid source, byte offset of a character whose removal breaks it)
fn breakable_sources() -> Vec<(&'static str, &'static str, usize)> {
    let js = "function add(a, b) { return a + b; }\n";
    let ts = "interface A { a: string }\nfunction f(): void {}\n";
    let python = "def add(a, b):\n    return a + b\n";
    let go = "package main\n\nfunc main() {\n}\n";
    let rust = "fn main() {\n    let x = 1;\n}\n";
    vec![
        ("javascript", js, js.rfind('}').unwrap()),
        ("javascriptreact", js, js.rfind('}').unwrap()),
        ("typescript", ts, ts.rfind('}').unwrap()),
        ("typescriptreact", ts, ts.rfind('}').unwrap()),
        ("python", python, python.find(':').unwrap()),
        ("go", go, go.rfind('}').unwrap()),
        ("rust", rust, rust.rfind('}').unwrap()),
    ]
}

fn run_every_wrapper(engine: &SyntaxEngine, doc: &SourceDocument) {
    for row in 0..doc.line_count() {
        for column in [0, 3, 8] {
            let at = Point::new(row, column);
            let ran = engine.with_query_sdk(doc, |sdk| {
                for wrapper in QueryWrapper::ALL {
                    let _ = sdk.run(wrapper, at, at);
                }
            });
            assert!(ran.is_some());
            let _ = engine.enclosing_node_within_char_limit(doc, at, 40, true);
            let _ = engine.last_n_identifiers(doc, at, 5);
            let _ = engine.completion_intent(doc, at);
        }
    }
}

#[tokio::test]
async fn test_truncated_sources_parse_and_query() {
    let engine = engine();
    for (language_id, source, _) in breakable_sources() {
        for cut in [source.len() / 3, source.len() / 2, source.len() - 2] {
            let doc = document(&format!("file:///cut-{}", language_id), language_id, &source[..cut]);
            let cached = engine.open(&doc).await.unwrap();
            assert!(cached.is_some(), "{} cut at {}", language_id, cut);
            run_every_wrapper(&engine, &doc);
        }
    }
}

#[tokio::test]
async fn test_removing_one_character_yields_error_tree() {
    let engine = engine();
    for (language_id, source, break_at) in breakable_sources() {
        let mut doc = document(&format!("file:///break-{}", language_id), language_id, source);
        let cached = engine.open(&doc).await.unwrap().unwrap();
        assert!(!cached.tree.root_node().has_error(), "{} should start valid", language_id);

        engine.change(&mut doc, &[ContentChange::delete(break_at, 1)]).unwrap();
        let broken = engine.cache().get_cached_tree(&doc).unwrap();
        assert!(broken.tree.root_node().has_error(), "{} should now have errors", language_id);
        assert_eq!(
            broken.language(),
            SupportedLanguage::from_language_id(language_id).unwrap()
        );

        run_every_wrapper(&engine, &doc);
    }
}

#[tokio::test]
async fn test_enclosing_range_grows_with_budget() {
    let engine = engine();
    let text = "class Cart {\n  total(items) {\n    return items.reduce((sum, item) => sum + item.price, 0);\n  }\n}\n";
    let doc = document("file:///cart.js", "javascript", text);
    engine.open(&doc).await.unwrap();

    for cursor in [point_of(text, "item.price", 6), point_of(text, "reduce", 2), Point::new(1, 4)] {
        let mut previous = engine
            .enclosing_node_within_char_limit(&doc, cursor, 0, false)
            .unwrap();
        for budget in 1..=text.len() + 10 {
            let range = engine
                .enclosing_node_within_char_limit(&doc, cursor, budget, false)
                .unwrap();
            assert!(
                range.encloses(&previous),
                "budget {} shrank {:?} to {:?}",
                budget,
                previous,
                range
            );
            assert!(doc.text_in_range(range).chars().count() <= budget);
            previous = range;
        }
        assert_eq!(previous.start, Point::new(0, 0));
    }
}

#[tokio::test]
async fn test_line_ceiling_hides_large_documents() {
    let engine = SyntaxEngine::new(syntax_query::config::EngineConfig {
        max_document_lines: 5,
        ..Default::default()
    });
    let text = "x = 1\n".repeat(10);
    let doc = document("file:///big.py", "python", &text);

    assert!(engine.open(&doc).await.unwrap().is_none());
    assert!(engine.cache().get_cached_tree(&doc).is_none());
    assert!(engine
        .enclosing_node_within_char_limit(&doc, Point::new(0, 0), 10, false)
        .is_none());
}
