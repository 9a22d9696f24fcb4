//! Attribute sources: opaque extractors that read a value out of block
//! content.
//!
//! A source can only be built through the constructors below (or decoded from
//! a JSON descriptor that [`is_valid_source`] accepts), so arbitrary callables
//! can never end up being treated as sources.

use crate::content::ContentNode;
use crate::error::{SchemaError, SelectorError};
use crate::selector::Selector;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Custom extraction callback
pub type ExtractFn = Arc<dyn Fn(&ContentNode) -> Option<Value> + Send + Sync>;

/// Source kinds a JSON descriptor may name in its `source` field
const DESCRIPTOR_KINDS: [&str; 4] = ["attribute", "text", "html", "query"];

#[derive(Clone)]
pub struct AttributeSource {
    kind: SourceKind,
}

#[derive(Clone)]
enum SourceKind {
    Attribute {
        selector: Option<Selector>,
        attribute: String,
    },
    Text {
        selector: Option<Selector>,
    },
    Html {
        selector: Option<Selector>,
    },
    Query {
        selector: Selector,
        inner: Box<AttributeSource>,
    },
    Custom(ExtractFn),
}

impl AttributeSource {
    /// Value of `attribute` on the first element matching `selector`.
    /// An empty selector reads from the scope itself.
    pub fn attr(selector: &str, attribute: impl Into<String>) -> Result<Self, SelectorError> {
        Ok(Self::attr_in(optional_selector(selector)?, attribute))
    }

    /// Like [`AttributeSource::attr`] with an already parsed selector
    pub fn attr_in(selector: Option<Selector>, attribute: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Attribute {
                selector,
                attribute: attribute.into(),
            },
        }
    }

    /// Text content of the first element matching `selector`
    pub fn text(selector: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            kind: SourceKind::Text {
                selector: optional_selector(selector)?,
            },
        })
    }

    /// Inner markup of the first element matching `selector`
    pub fn html(selector: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            kind: SourceKind::Html {
                selector: optional_selector(selector)?,
            },
        })
    }

    /// Array built by applying `inner` to every element matching `selector`
    pub fn query(selector: &str, inner: AttributeSource) -> Result<Self, SelectorError> {
        Ok(Self {
            kind: SourceKind::Query {
                selector: Selector::parse(selector)?,
                inner: Box::new(inner),
            },
        })
    }

    pub fn custom<F>(extract: F) -> Self
    where
        F: Fn(&ContentNode) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            kind: SourceKind::Custom(Arc::new(extract)),
        }
    }

    /// Run the source against `scope`. `None` means the value is absent from
    /// the content.
    pub fn extract(&self, scope: &ContentNode) -> Option<Value> {
        match &self.kind {
            SourceKind::Attribute {
                selector,
                attribute,
            } => target(scope, selector.as_ref())?
                .attribute(attribute)
                .map(Value::String),
            SourceKind::Text { selector } => {
                Some(Value::String(target(scope, selector.as_ref())?.text()))
            }
            SourceKind::Html { selector } => target(scope, selector.as_ref())?
                .inner_html()
                .map(Value::String),
            SourceKind::Query { selector, inner } => Some(Value::Array(
                scope
                    .select_all(selector)
                    .iter()
                    .map(|node| inner.extract(node).unwrap_or(Value::Null))
                    .collect(),
            )),
            SourceKind::Custom(extract) => extract(scope),
        }
    }

    /// Decode a JSON source descriptor, e.g.
    /// `{"source": "attribute", "selector": "img", "attribute": "src"}`.
    pub fn from_descriptor(attribute: &str, descriptor: &Value) -> Result<Self, SchemaError> {
        if !is_valid_source(descriptor) {
            return Err(SchemaError::invalid_source(
                attribute,
                "not a known source descriptor",
            ));
        }

        let field = |name: &str| descriptor.get(name).and_then(Value::as_str);
        let selector = field("selector").unwrap_or("");

        let source = match field("source") {
            Some("attribute") => {
                let name = field("attribute").unwrap_or_default();
                AttributeSource::attr(selector, name)?
            }
            Some("text") => AttributeSource::text(selector)?,
            Some("html") => AttributeSource::html(selector)?,
            Some("query") => {
                let inner = descriptor
                    .get("query")
                    .map(|inner| AttributeSource::from_descriptor(attribute, inner))
                    .transpose()?
                    .ok_or_else(|| SchemaError::invalid_source(attribute, "missing query"))?;
                AttributeSource::query(selector, inner)?
            }
            other => {
                return Err(SchemaError::invalid_source(
                    attribute,
                    format!("unknown source {:?}", other),
                ))
            }
        };
        Ok(source)
    }
}

impl fmt::Debug for AttributeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let selector = |s: &Option<Selector>| s.as_ref().map(|s| s.as_str().to_string());
        match &self.kind {
            SourceKind::Attribute {
                selector: s,
                attribute,
            } => f
                .debug_struct("Attribute")
                .field("selector", &selector(s))
                .field("attribute", attribute)
                .finish(),
            SourceKind::Text { selector: s } => f
                .debug_struct("Text")
                .field("selector", &selector(s))
                .finish(),
            SourceKind::Html { selector: s } => f
                .debug_struct("Html")
                .field("selector", &selector(s))
                .finish(),
            SourceKind::Query { selector, inner } => f
                .debug_struct("Query")
                .field("selector", &selector.as_str())
                .field("inner", inner)
                .finish(),
            SourceKind::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Whether a JSON descriptor names a known extraction source with the fields
/// that source requires.
pub fn is_valid_source(candidate: &Value) -> bool {
    let object = match candidate.as_object() {
        Some(object) => object,
        None => return false,
    };
    let string_field = |name: &str| object.get(name).map(Value::is_string);

    let kind = match object.get("source").and_then(Value::as_str) {
        Some(kind) if DESCRIPTOR_KINDS.contains(&kind) => kind,
        _ => return false,
    };
    if string_field("selector") == Some(false) {
        return false;
    }

    match kind {
        "attribute" => string_field("attribute") == Some(true),
        "query" => {
            string_field("selector") == Some(true)
                && object.get("query").map(is_valid_source).unwrap_or(false)
        }
        _ => true,
    }
}

fn optional_selector(selector: &str) -> Result<Option<Selector>, SelectorError> {
    if selector.trim().is_empty() {
        Ok(None)
    } else {
        Selector::parse(selector).map(Some)
    }
}

fn target(scope: &ContentNode, selector: Option<&Selector>) -> Option<ContentNode> {
    match selector {
        Some(selector) => scope.select_first(selector),
        None => Some(scope.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentTree;
    use serde_json::json;

    const FIGURE: &str = r#"<figure><img src="a.png" alt="Alt"><figcaption>The <em>caption</em></figcaption></figure>"#;

    #[test]
    fn test_attribute_source() {
        let tree = ContentTree::parse(FIGURE);

        let src = AttributeSource::attr("img", "src").unwrap();
        assert_eq!(src.extract(tree.root()), Some(json!("a.png")));

        let missing = AttributeSource::attr("img", "title").unwrap();
        assert_eq!(missing.extract(tree.root()), None);

        let no_match = AttributeSource::attr("video", "src").unwrap();
        assert_eq!(no_match.extract(tree.root()), None);
    }

    #[test]
    fn test_text_and_html_sources() {
        let tree = ContentTree::parse(FIGURE);

        let text = AttributeSource::text("figcaption").unwrap();
        assert_eq!(text.extract(tree.root()), Some(json!("The caption")));

        let html = AttributeSource::html("figcaption").unwrap();
        assert_eq!(html.extract(tree.root()), Some(json!("The <em>caption</em>")));
    }

    #[test]
    fn test_empty_selector_reads_scope() {
        let tree = ContentTree::parse("<p>one</p><p>two</p>");

        let html = AttributeSource::html("").unwrap();
        assert_eq!(html.extract(tree.root()), Some(json!("<p>one</p><p>two</p>")));
    }

    #[test]
    fn test_query_source() {
        let tree = ContentTree::parse(r#"<ul><li><a href="/a">A</a></li><li>B</li></ul>"#);
        let links = AttributeSource::query("li", AttributeSource::attr("a", "href").unwrap()).unwrap();

        assert_eq!(links.extract(tree.root()), Some(json!(["/a", null])));
    }

    #[test]
    fn test_custom_source() {
        let tree = ContentTree::parse("<p>a</p><p>b</p><p>c</p>");
        let count = AttributeSource::custom(|node| Some(json!(node.children().len())));

        assert_eq!(count.extract(tree.root()), Some(json!(3)));
    }

    #[test]
    fn test_is_valid_source() {
        assert!(is_valid_source(&json!({"source": "text", "selector": "p"})));
        assert!(is_valid_source(&json!({"source": "html"})));
        assert!(is_valid_source(&json!({
            "source": "attribute", "selector": "img", "attribute": "src"
        })));
        assert!(is_valid_source(&json!({
            "source": "query", "selector": "li", "query": {"source": "text"}
        })));

        assert!(!is_valid_source(&json!("text")));
        assert!(!is_valid_source(&json!({"selector": "p"})));
        assert!(!is_valid_source(&json!({"source": "meta", "meta": "x"})));
        assert!(!is_valid_source(&json!({"source": "attribute", "selector": "img"})));
        assert!(!is_valid_source(&json!({"source": "text", "selector": 4})));
        assert!(!is_valid_source(&json!({"source": "query", "selector": "li"})));
    }

    #[test]
    fn test_from_descriptor() {
        let tree = ContentTree::parse(FIGURE);
        let source = AttributeSource::from_descriptor(
            "url",
            &json!({"source": "attribute", "selector": "img", "attribute": "src"}),
        )
        .unwrap();
        assert_eq!(source.extract(tree.root()), Some(json!("a.png")));

        let err = AttributeSource::from_descriptor("url", &json!({"source": "text", "selector": "p!"}))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Selector(_)));

        let err = AttributeSource::from_descriptor("url", &json!({"source": "nope"})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSource { .. }));
    }
}
