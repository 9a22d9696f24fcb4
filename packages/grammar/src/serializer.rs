use crate::ast::{Attributes, DEFAULT_VERSION};
use crate::delimiter::{serialized_name, DELIMITER_PREFIX};
use std::fmt::Write;

/// Serialize delimiter attributes as a JSON object.
///
/// A literal `--` would end the surrounding HTML comment early, so it is
/// written with unicode escapes, which decode to the same JSON string.
pub fn serialize_attributes(attributes: &Attributes) -> String {
    serde_json::Value::Object(attributes.clone())
        .to_string()
        .replace("--", "\\u002d\\u002d")
}

/// Wrap block content in its comment delimiters.
///
/// Content-less blocks are written as a single void delimiter.
pub fn comment_delimited_content(
    name: &str,
    attributes: &Attributes,
    content: &str,
    version: u32,
) -> String {
    let name = serialized_name(name);
    let mut opening = String::new();

    let _ = write!(opening, "<!-- {}{} ", DELIMITER_PREFIX, name);
    if version != DEFAULT_VERSION {
        let _ = write!(opening, "v={} ", version);
    }
    if !attributes.is_empty() {
        opening.push_str(&serialize_attributes(attributes));
        opening.push(' ');
    }

    if content.is_empty() {
        opening.push_str("/-->");
        return opening;
    }

    opening.push_str("-->");
    format!(
        "{}\n{}\n<!-- /{}{} -->",
        opening, content, DELIMITER_PREFIX, name
    )
}
