//! Parsed block content that attribute sources query.
//!
//! Content is parsed once with html5ever into an `RcDom`; sources only see
//! [`ContentNode`], never the DOM types themselves.

use crate::selector::Selector;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Prefix that puts the parser in the "in body" insertion mode, so leading
/// comments and text stay inside the fragment instead of moving before `<html>`.
const BODY_PREFIX: &str = "<!DOCTYPE html><body>";

/// A parsed content fragment
pub struct ContentTree {
    root: ContentNode,
    // Dropping the dom empties every node below the document, so it lives
    // as long as the root handle.
    _dom: RcDom,
}

impl ContentTree {
    pub fn parse(html: &str) -> Self {
        let input = format!("{}{}", BODY_PREFIX, html);
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(input.as_str());

        let body = find_child_element(&dom.document, "html")
            .and_then(|html| find_child_element(&html, "body"));
        let handle = body.unwrap_or_else(|| dom.document.clone());

        Self {
            root: ContentNode { handle },
            _dom: dom,
        }
    }

    /// The node containing the whole fragment
    pub fn root(&self) -> &ContentNode {
        &self.root
    }
}

/// An element (or the fragment root) within parsed content
#[derive(Clone)]
pub struct ContentNode {
    handle: Handle,
}

impl std::fmt::Debug for ContentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentNode")
            .field("tag", &self.tag_name())
            .finish()
    }
}

impl ContentNode {
    pub fn tag_name(&self) -> Option<String> {
        element_name(&self.handle)
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        element_attribute(&self.handle, name)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut text = String::new();
        collect_text(&self.handle, &mut text);
        text
    }

    /// Serialized markup of the node's children
    pub fn inner_html(&self) -> Option<String> {
        let mut output = Vec::new();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        serialize(&mut output, &SerializableHandle::from(self.handle.clone()), opts).ok()?;
        String::from_utf8(output).ok()
    }

    /// Element children, skipping text and comments
    pub fn children(&self) -> Vec<ContentNode> {
        self.handle
            .children
            .borrow()
            .iter()
            .filter(|child| matches!(child.data, NodeData::Element { .. }))
            .map(|child| ContentNode {
                handle: child.clone(),
            })
            .collect()
    }

    /// First descendant matching the selector, in document order
    pub fn select_first(&self, selector: &Selector) -> Option<ContentNode> {
        let mut found = Vec::new();
        walk(&self.handle, &mut Vec::new(), selector, &mut found, true);
        found.into_iter().next()
    }

    /// All descendants matching the selector, in document order
    pub fn select_all(&self, selector: &Selector) -> Vec<ContentNode> {
        let mut found = Vec::new();
        walk(&self.handle, &mut Vec::new(), selector, &mut found, false);
        found
    }

    pub(crate) fn handle(&self) -> &Handle {
        &self.handle
    }
}

/// Depth-first search below `node`. Returns true once searching can stop.
fn walk(
    node: &Handle,
    ancestors: &mut Vec<Handle>,
    selector: &Selector,
    found: &mut Vec<ContentNode>,
    first_only: bool,
) -> bool {
    for child in node.children.borrow().iter() {
        if !matches!(child.data, NodeData::Element { .. }) {
            continue;
        }

        if selector.matches(child, ancestors) {
            found.push(ContentNode {
                handle: child.clone(),
            });
            if first_only {
                return true;
            }
        }

        ancestors.push(child.clone());
        let done = walk(child, ancestors, selector, found, first_only);
        ancestors.pop();
        if done {
            return true;
        }
    }
    false
}

fn collect_text(node: &Handle, text: &mut String) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => text.push_str(&contents.borrow()),
            NodeData::Element { .. } => collect_text(child, text),
            _ => {}
        }
    }
}

fn find_child_element(node: &Handle, name: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| element_name(child).as_deref() == Some(name))
        .cloned()
}

/// Local name of an element node
pub(crate) fn element_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

/// Value of an attribute on an element node
pub(crate) fn element_attribute(node: &Handle, attribute: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attribute)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}
