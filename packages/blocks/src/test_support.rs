//! Block types shared by the crate's tests.

use crate::block_type::{BlockType, Migration};
use crate::coerce::AttributeType;
use crate::registry::Registry;
use crate::schema::AttributeSchema;
use crate::source::AttributeSource;
use blocks_grammar::Attributes;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn attrs(value: Value) -> Attributes {
    value.as_object().cloned().unwrap_or_default()
}

fn string_attr<'a>(attributes: &'a Attributes, name: &str) -> &'a str {
    attributes.get(name).and_then(Value::as_str).unwrap_or("")
}

pub fn paragraph() -> BlockType {
    BlockType::new("core/paragraph", |attrs| match attrs.get("align").and_then(Value::as_str) {
        Some(align) => format!(
            "<p class=\"has-text-align-{}\">{}</p>",
            align,
            string_attr(attrs, "content")
        ),
        None => format!("<p>{}</p>", string_attr(attrs, "content")),
    })
    .with_attribute(
        "content",
        AttributeSchema::sourced(AttributeSource::html("p").unwrap(), AttributeType::String)
            .with_default(""),
    )
    .with_attribute("align", AttributeSchema::stored(AttributeType::String))
}

pub fn freeform() -> BlockType {
    BlockType::new("core/freeform", |attrs| string_attr(attrs, "content").to_string()).with_attribute(
        "content",
        AttributeSchema::sourced(AttributeSource::html("").unwrap(), AttributeType::String),
    )
}

/// `<!-- ns/foo -->body<!-- /ns/foo -->` with an integer counter
pub fn counter() -> BlockType {
    BlockType::new("ns/foo", |_| "body".to_string()).with_attribute(
        "count",
        AttributeSchema::stored(AttributeType::Integer).with_default(0),
    )
}

pub fn gallery() -> BlockType {
    BlockType::new("my/gallery", |_| String::new())
        .with_attribute("images", AttributeSchema::stored(AttributeType::Array))
}

/// Version 3 notice that renamed `message` to `text`. Version 2 content is
/// migrated; `migrations` counts the calls.
pub fn notice(migrations: Arc<AtomicUsize>) -> BlockType {
    BlockType::new("my/notice", |attrs| {
        format!("<div class=\"notice\"><p>{}</p></div>", string_attr(attrs, "text"))
    })
    .with_version(3)
    .with_attribute(
        "text",
        AttributeSchema::sourced(AttributeSource::html("p").unwrap(), AttributeType::String),
    )
    .with_attribute(
        "level",
        AttributeSchema::stored(AttributeType::String).with_default("info"),
    )
    .with_migration(
        Migration::new(
            2,
            |attrs| format!("<div class=\"notice\">{}</div>", string_attr(attrs, "message")),
            move |mut old| {
                migrations.fetch_add(1, Ordering::SeqCst);
                let mut migrated = Attributes::new();
                if let Some(message) = old.remove("message") {
                    migrated.insert("text".to_string(), message);
                }
                migrated
            },
        )
        .with_attribute(
            "message",
            AttributeSchema::sourced(AttributeSource::html("div").unwrap(), AttributeType::String),
        ),
    )
}

/// Registry with every test type and `core/freeform` handling unknown blocks
pub fn registry() -> Registry {
    registry_counting(Arc::new(AtomicUsize::new(0)))
}

pub fn registry_counting(migrations: Arc<AtomicUsize>) -> Registry {
    let mut registry = Registry::new();
    for block_type in [paragraph(), freeform(), counter(), gallery(), notice(migrations)] {
        registry.register(block_type).unwrap();
    }
    registry.set_unknown_type_handler("core/freeform").unwrap();
    registry
}
