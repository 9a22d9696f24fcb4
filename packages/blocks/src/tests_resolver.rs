use crate::config::ParserConfig;
use crate::diagnostics::{CollectingSink, Diagnostic};
use crate::error::CoercionError;
use crate::factory::SequentialFactory;
use crate::id_generator::IdGenerator;
use crate::registry::Registry;
use crate::resolver::{DocumentParser, Rejection, ResolutionPath};
use crate::test_support::{attrs, counter, registry, registry_counting};
use blocks_grammar::Attributes;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn factory() -> SequentialFactory {
    SequentialFactory::new(IdGenerator::from_seed("doc"))
}

#[test]
fn test_resolution_paths() {
    let registry = registry();
    let parser = DocumentParser::new(&registry);

    assert!(matches!(
        parser.resolution_path(Some("ns/foo"), "body", 1),
        ResolutionPath::DirectParse(block_type) if block_type.name == "ns/foo"
    ));
    assert!(matches!(
        parser.resolution_path(Some("my/notice"), "x", 2),
        ResolutionPath::Migrate(_, migration) if migration.version == 2
    ));
    assert!(matches!(
        parser.resolution_path(Some("my/notice"), "x", 1),
        ResolutionPath::Fallback(handler) if handler.name == "core/freeform"
    ));
    assert!(matches!(
        parser.resolution_path(Some("my/unknown"), "x", 1),
        ResolutionPath::Fallback(_)
    ));
    assert!(matches!(
        parser.resolution_path(None, "", 1),
        ResolutionPath::Rejected(Rejection::Empty)
    ));
}

#[test]
fn test_direct_parse_uses_default() {
    let registry = registry();
    let parser = DocumentParser::new(&registry);

    let block = parser
        .resolve_block(&mut factory(), Some("ns/foo"), "body", &Attributes::new(), 1)
        .unwrap()
        .unwrap();

    assert_eq!(block.name, "ns/foo");
    assert_eq!(block.attributes, attrs(json!({"count": 0})));
    assert!(block.is_valid);
    assert_eq!(block.original_content, "body");
    assert_eq!(block.uid, "doc-1");
}

#[test]
fn test_migration_runs_exactly_once() {
    let migrations = Arc::new(AtomicUsize::new(0));
    let registry = registry_counting(migrations.clone());
    let parser = DocumentParser::new(&registry);

    let block = parser
        .resolve_block(
            &mut factory(),
            Some("my/notice"),
            r#"<div class="notice">Hello</div>"#,
            &Attributes::new(),
            2,
        )
        .unwrap()
        .unwrap();

    assert_eq!(migrations.load(Ordering::SeqCst), 1);
    assert_eq!(block.name, "my/notice");
    // The current schema would have added the `level` default
    assert_eq!(block.attributes, attrs(json!({"text": "Hello"})));
    assert!(block.is_valid);
}

#[test]
fn test_unmatched_version_falls_back() {
    let migrations = Arc::new(AtomicUsize::new(0));
    let registry = registry_counting(migrations.clone());
    let parser = DocumentParser::new(&registry);

    let block = parser
        .resolve_block(&mut factory(), Some("my/notice"), "<p>Old</p>", &Attributes::new(), 1)
        .unwrap()
        .unwrap();

    assert_eq!(migrations.load(Ordering::SeqCst), 0);
    assert_eq!(block.name, "core/freeform");
    assert_eq!(
        block.original_content,
        "<!-- wp:my/notice -->\n<p>Old</p>\n<!-- /wp:my/notice -->"
    );
}

#[test]
fn test_unknown_block_keeps_delimiters() {
    let registry = registry();
    let parser = DocumentParser::new(&registry);

    let block = parser
        .resolve_block(
            &mut factory(),
            Some("my/unknown"),
            "<p>x</p>",
            &attrs(json!({"a": 1})),
            1,
        )
        .unwrap()
        .unwrap();

    let expected = "<!-- wp:my/unknown {\"a\":1} -->\n<p>x</p>\n<!-- /wp:my/unknown -->";
    assert_eq!(block.name, "core/freeform");
    assert_eq!(block.original_content, expected);
    assert_eq!(block.attributes["content"], json!(expected));
    assert!(block.is_valid);
}

#[test]
fn test_fallback_is_idempotent() {
    let registry = registry();
    let parser = DocumentParser::new(&registry);
    let stored = attrs(json!({"a": "b"}));

    let first = parser
        .resolve_fallback(&mut factory(), Some("my/unknown"), "<p>x</p>", &stored, 2)
        .unwrap()
        .unwrap();
    let second = parser
        .resolve_fallback(&mut factory(), Some("my/unknown"), "<p>x</p>", &stored, 2)
        .unwrap()
        .unwrap();

    assert_eq!(first.attributes, second.attributes);
    assert_eq!(first.is_valid, second.is_valid);
    assert_eq!(first.original_content, second.original_content);
}

#[test]
fn test_empty_block_is_dropped_silently() {
    let registry = registry();
    let sink = Arc::new(CollectingSink::new());
    let parser = DocumentParser::new(&registry).with_diagnostics(sink.clone());

    let block = parser
        .resolve_block(&mut factory(), None, "", &Attributes::new(), 1)
        .unwrap();

    assert!(block.is_none());
    assert!(sink.diagnostics().is_empty());
}

#[test]
fn test_missing_fallback_reports_and_drops() {
    let mut registry = Registry::new();
    registry.register(counter()).unwrap();
    let sink = Arc::new(CollectingSink::new());
    let parser = DocumentParser::new(&registry).with_diagnostics(sink.clone());

    assert!(matches!(
        parser.resolution_path(Some("my/unknown"), "x", 1),
        ResolutionPath::Rejected(Rejection::MissingFallback)
    ));

    let block = parser
        .resolve_block(&mut factory(), Some("my/unknown"), "x", &Attributes::new(), 1)
        .unwrap();

    assert!(block.is_none());
    assert_eq!(
        sink.diagnostics(),
        vec![Diagnostic::MissingFallback {
            name: Some("my/unknown".to_string())
        }]
    );
}

#[test]
fn test_aliases_are_rewritten() {
    let registry = registry();
    let parser = DocumentParser::new(&registry);

    let block = parser
        .resolve_block(&mut factory(), Some("core/text"), "<p>Hi</p>", &Attributes::new(), 1)
        .unwrap()
        .unwrap();
    assert_eq!(block.name, "core/paragraph");
    assert_eq!(block.attributes["content"], json!("Hi"));

    let parser = DocumentParser::new(&registry)
        .with_config(ParserConfig::default().with_alias("my/old-counter", "ns/foo"));
    let block = parser
        .resolve_block(&mut factory(), Some("my/old-counter"), "body", &Attributes::new(), 1)
        .unwrap()
        .unwrap();
    assert_eq!(block.name, "ns/foo");
}

#[test]
fn test_invalid_when_save_differs() {
    let registry = registry();
    let parser = DocumentParser::new(&registry);

    let block = parser
        .resolve_block(
            &mut factory(),
            Some("core/paragraph"),
            r#"<p class="custom">Hi</p>"#,
            &Attributes::new(),
            1,
        )
        .unwrap()
        .unwrap();

    assert!(!block.is_valid);
    assert_eq!(block.original_content, r#"<p class="custom">Hi</p>"#);
}

#[test]
fn test_coercion_failure_is_returned() {
    let registry = registry();
    let parser = DocumentParser::new(&registry);

    let err = parser
        .resolve_block(&mut factory(), Some("my/gallery"), "", &attrs(json!({"images": 4})), 1)
        .unwrap_err();
    assert_eq!(err, CoercionError::not_iterable("number"));
}

#[test]
fn test_type_mismatch_only_in_dev_mode() {
    let registry = registry();
    let stored = attrs(json!({"count": "7"}));

    let sink = Arc::new(CollectingSink::new());
    let parser = DocumentParser::new(&registry)
        .with_config(ParserConfig::default().with_dev_mode(true))
        .with_diagnostics(sink.clone());
    let block = parser
        .resolve_block(&mut factory(), Some("ns/foo"), "body", &stored, 1)
        .unwrap()
        .unwrap();
    assert_eq!(block.attributes["count"], json!(7));
    assert_eq!(sink.diagnostics().len(), 1);

    let sink = Arc::new(CollectingSink::new());
    let parser = DocumentParser::new(&registry)
        .with_config(ParserConfig::default().with_dev_mode(false))
        .with_diagnostics(sink.clone());
    parser
        .resolve_block(&mut factory(), Some("ns/foo"), "body", &stored, 1)
        .unwrap();
    assert!(sink.diagnostics().is_empty());
}

#[test]
fn test_handler_block_at_unknown_version_keeps_delimiters() {
    let registry = registry();
    let parser = DocumentParser::new(&registry);

    let block = parser
        .resolve_block(
            &mut factory(),
            Some("core/freeform"),
            "<p>x</p>",
            &attrs(json!({"k": 1})),
            5,
        )
        .unwrap()
        .unwrap();

    let expected = "<!-- wp:freeform v=5 {\"k\":1} -->\n<p>x</p>\n<!-- /wp:freeform -->";
    assert_eq!(block.name, "core/freeform");
    assert_eq!(block.original_content, expected);
    assert_eq!(block.attributes["content"], json!(expected));
}
