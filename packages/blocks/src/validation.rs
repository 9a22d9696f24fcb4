//! Structural comparison of block markup.
//!
//! Saved content rarely matches stored content byte for byte: attribute
//! order, class order and whitespace drift between editors. Two fragments are
//! equivalent when their normalized trees are equal.

use crate::content::ContentTree;
use markup5ever_rcdom::{Handle, NodeData};

/// Decides whether two pieces of block markup are equivalent
pub trait HtmlValidator: Send + Sync {
    fn is_equivalent(&self, actual: &str, expected: &str) -> bool;
}

/// Compares html5ever trees after normalization
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralValidator;

impl HtmlValidator for StructuralValidator {
    fn is_equivalent(&self, actual: &str, expected: &str) -> bool {
        if actual == expected {
            return true;
        }
        normalize_fragment(actual) == normalize_fragment(expected)
    }
}

#[derive(Debug, PartialEq)]
enum Normalized {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<Normalized>,
    },
    Text(String),
    Comment(String),
}

fn normalize_fragment(html: &str) -> Vec<Normalized> {
    let tree = ContentTree::parse(html);
    normalize_children(tree.root().handle())
}

fn normalize_children(node: &Handle) -> Vec<Normalized> {
    node.children
        .borrow()
        .iter()
        .filter_map(normalize_node)
        .collect()
}

fn normalize_node(node: &Handle) -> Option<Normalized> {
    match &node.data {
        NodeData::Element { name, attrs, .. } => {
            let mut attributes: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let name = attr.name.local.to_string();
                    let value = normalize_attribute(&name, &attr.value);
                    (name, value)
                })
                .collect();
            attributes.sort();

            Some(Normalized::Element {
                name: name.local.to_string(),
                attributes,
                children: normalize_children(node),
            })
        }
        NodeData::Text { contents } => {
            let text = collapse_whitespace(&contents.borrow());
            (!text.is_empty()).then_some(Normalized::Text(text))
        }
        NodeData::Comment { contents } => Some(Normalized::Comment(contents.trim().to_string())),
        _ => None,
    }
}

fn normalize_attribute(name: &str, value: &str) -> String {
    match name {
        "class" => {
            let mut classes: Vec<&str> = value.split_ascii_whitespace().collect();
            classes.sort_unstable();
            classes.dedup();
            classes.join(" ")
        }
        "style" => {
            let mut declarations: Vec<String> = value
                .split(';')
                .filter_map(|declaration| {
                    let (property, value) = declaration.split_once(':')?;
                    Some(format!(
                        "{}:{}",
                        property.trim().to_ascii_lowercase(),
                        collapse_whitespace(value)
                    ))
                })
                .collect();
            declarations.sort();
            declarations.join(";")
        }
        _ => value.trim().to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
