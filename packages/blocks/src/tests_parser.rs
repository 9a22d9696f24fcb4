use crate::diagnostics::{CollectingSink, Diagnostic};
use crate::factory::{BlockFactory, ParsedBlock};
use crate::parser::parse;
use crate::resolver::DocumentParser;
use crate::serializer::serialize;
use crate::test_support::{attrs, registry};
use blocks_grammar::Attributes;
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_empty_document() {
    assert!(parse("", &registry()).is_empty());
    assert!(parse("\n\n  \n", &registry()).is_empty());
}

#[test]
fn test_document_without_delimiters() {
    let document = "<p>Just <em>HTML</em></p>";
    let blocks = parse(document, &registry());

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].name, "core/freeform");
    assert_eq!(blocks[0].original_content, document);
    assert_eq!(blocks[0].attributes["content"], json!(document));
    assert!(blocks[0].is_valid);
}

#[test]
fn test_default_attribute() {
    let blocks = parse("<!-- ns/foo {} -->body<!-- /ns/foo -->", &registry());

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].name, "ns/foo");
    assert_eq!(blocks[0].attributes, attrs(json!({"count": 0})));
}

#[test]
fn test_content_beats_delimiter() {
    let document = "<!-- wp:paragraph {\"content\":\"Stored\"} -->\n<p>Shown</p>\n<!-- /wp:paragraph -->";
    let blocks = parse(document, &registry());

    assert_eq!(blocks[0].attributes["content"], json!("Shown"));
}

#[test]
fn test_order_is_preserved() {
    let document = [
        "<!-- wp:paragraph -->\n<p>one</p>\n<!-- /wp:paragraph -->",
        "<p>two</p>",
        "<!-- ns/foo {\"count\":3} -->body<!-- /ns/foo -->",
        "<!-- wp:paragraph -->\n<p>four</p>\n<!-- /wp:paragraph -->",
    ]
    .join("\n\n");

    let blocks = parse(&document, &registry());
    let names: Vec<&str> = blocks.iter().map(|block| block.name.as_str()).collect();

    assert_eq!(
        names,
        vec!["core/paragraph", "core/freeform", "ns/foo", "core/paragraph"]
    );
    assert_eq!(blocks[0].attributes["content"], json!("one"));
    assert_eq!(blocks[2].attributes["count"], json!(3));
    assert_eq!(blocks[3].attributes["content"], json!("four"));
}

#[test]
fn test_blocks_get_distinct_uids() {
    let document = "<!-- wp:paragraph -->\n<p>a</p>\n<!-- /wp:paragraph -->\n<p>b</p>";
    let blocks = parse(document, &registry());

    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].uid.ends_with("-1"));
    assert!(blocks[1].uid.ends_with("-2"));
}

#[test]
fn test_invalid_block_is_flagged() {
    let document = "<!-- wp:paragraph -->\n<p class=\"edited\">Hi</p>\n<!-- /wp:paragraph -->";
    let blocks = parse(document, &registry());

    assert_eq!(blocks.len(), 1);
    assert!(!blocks[0].is_valid);
    assert_eq!(blocks[0].original_content, "<p class=\"edited\">Hi</p>");
}

#[test]
fn test_coercion_failure_falls_back() {
    let registry = registry();
    let sink = Arc::new(CollectingSink::new());
    let parser = DocumentParser::new(&registry).with_diagnostics(sink.clone());

    let document = "<!-- wp:my/gallery {\"images\":4} /-->";
    let blocks = parser.parse_document(document);

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].name, "core/freeform");
    assert_eq!(blocks[0].original_content, document);
    assert!(matches!(
        sink.diagnostics().as_slice(),
        [Diagnostic::CoercionFailed { name: Some(name), .. }] if name == "my/gallery"
    ));
}

#[test]
fn test_malformed_delimiter_degrades() {
    let document = "<!-- wp:paragraph {not json} -->\n<p>x</p>\n<!-- /wp:paragraph -->";
    let blocks = parse(document, &registry());

    assert!(!blocks.is_empty());
    assert!(blocks.iter().all(|block| block.name == "core/freeform"));
}

struct CustomFactory {
    created: usize,
}

impl BlockFactory for CustomFactory {
    fn create_block(&mut self, name: &str, attributes: Attributes) -> ParsedBlock {
        self.created += 1;
        ParsedBlock {
            uid: format!("custom-{}", self.created),
            name: name.to_string(),
            attributes,
            is_valid: true,
            original_content: String::new(),
        }
    }
}

#[test]
fn test_custom_factory() {
    let registry = registry();
    let parser = DocumentParser::new(&registry);
    let mut factory = CustomFactory { created: 0 };

    let blocks = parser.parse_document_with("<p>a</p><!-- ns/foo /--><!-- ns/foo /-->", &mut factory);

    assert_eq!(factory.created, 3);
    assert_eq!(blocks[2].uid, "custom-3");
}

#[test]
fn test_parse_serialize_parse_is_stable() {
    let document = [
        "<!-- wp:paragraph {\"align\":\"right\"} -->\n<p class=\"has-text-align-right\">Hello</p>\n<!-- /wp:paragraph -->",
        "<!-- ns/foo {\"count\":3} -->body<!-- /ns/foo -->",
        "<p>Loose</p>",
        "<!-- wp:my/unknown {\"a\":1} /-->",
    ]
    .join("\n\n");
    let registry = registry();

    let first = parse(&document, &registry);
    assert_eq!(first.len(), 4);
    assert!(first.iter().all(|block| block.is_valid));

    let serialized = serialize(&first, &registry);
    let second = parse(&serialized, &registry);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.attributes, b.attributes);
        assert_eq!(a.is_valid, b.is_valid);
    }
    assert_eq!(serialize(&second, &registry), serialized);
}
