//! Decoding of the text inside a block delimiter comment.
//!
//! The tokenizer only guarantees the overall shape of a delimiter. Here the
//! name is normalized, the optional `v=N` version is read and the attribute
//! object is decoded with serde_json.

use crate::ast::{Attributes, DEFAULT_VERSION};
use crate::error::{DelimiterError, DelimiterResult};
use serde_json::Value;

/// Prefix marking block delimiters in serialized content
pub const DELIMITER_PREFIX: &str = "wp:";

/// Namespace implied by a `wp:` name without one
pub const DEFAULT_NAMESPACE: &str = "core";

/// A decoded opening delimiter
#[derive(Debug, Clone, PartialEq)]
pub struct Delimiter {
    pub name: String,
    pub attrs: Attributes,
    pub version: u32,
    pub self_closing: bool,
}

impl Delimiter {
    /// Decode an opening delimiter such as `<!-- wp:image v=2 {"id":4} /-->`.
    ///
    /// `pos` is the byte offset of the delimiter, used for error reporting.
    pub fn parse_open(source: &str, pos: usize) -> DelimiterResult<Self> {
        let mut inner = comment_body(source, pos)?;

        let self_closing = match inner.strip_suffix('/') {
            Some(rest) => {
                inner = rest.trim_end();
                true
            }
            None => false,
        };

        let (raw_name, rest) = split_word(inner);
        let name = canonical_name(raw_name)
            .ok_or_else(|| DelimiterError::invalid_name(pos, raw_name))?;

        let mut rest = rest.trim_start();
        let mut version = DEFAULT_VERSION;
        if let Some(tail) = rest.strip_prefix("v=") {
            let (digits, after) = split_word(tail);
            version = digits
                .parse()
                .map_err(|_| DelimiterError::invalid_version(pos, digits))?;
            rest = after.trim_start();
        }

        let attrs = if rest.is_empty() {
            Attributes::new()
        } else {
            match serde_json::from_str::<Value>(rest) {
                Ok(Value::Object(map)) => map,
                Ok(other) => {
                    return Err(DelimiterError::invalid_attributes(
                        pos,
                        format!("expected an object, found {}", other),
                    ))
                }
                Err(e) => return Err(DelimiterError::invalid_attributes(pos, e.to_string())),
            }
        };

        Ok(Self {
            name,
            attrs,
            version,
            self_closing,
        })
    }

    /// Decode a closing delimiter such as `<!-- /wp:image -->`, returning the
    /// normalized block name.
    pub fn parse_close(source: &str, pos: usize) -> DelimiterResult<String> {
        let inner = comment_body(source, pos)?;
        let raw_name = inner
            .strip_prefix('/')
            .ok_or_else(|| DelimiterError::malformed(pos))?
            .trim();
        canonical_name(raw_name).ok_or_else(|| DelimiterError::invalid_name(pos, raw_name))
    }

    /// Name of an opening delimiter without decoding its attributes. Used to
    /// track nesting of same-named blocks.
    pub fn open_name(source: &str) -> Option<String> {
        let inner = source.strip_prefix("<!--")?.trim_start();
        let (raw_name, _) = split_word(inner);
        let raw_name = raw_name.strip_suffix("-->").unwrap_or(raw_name);
        canonical_name(raw_name)
    }
}

/// Normalize a delimiter name: `wp:paragraph` becomes `core/paragraph`,
/// `wp:ns/x` and `ns/x` become `ns/x`. Returns `None` for names the grammar
/// does not accept.
pub fn canonical_name(raw: &str) -> Option<String> {
    let (prefixed, name) = match raw.strip_prefix(DELIMITER_PREFIX) {
        Some(name) => (true, name),
        None => (false, raw),
    };

    let mut segments = name.split('/');
    let first = segments.next()?;
    let second = segments.next();
    if segments.next().is_some() || !is_segment(first) {
        return None;
    }

    match second {
        Some(second) if is_segment(second) => Some(format!("{}/{}", first, second)),
        Some(_) => None,
        None if prefixed => Some(format!("{}/{}", DEFAULT_NAMESPACE, first)),
        None => None,
    }
}

/// Whether `name` is a full `namespace/name` block name the grammar can read
/// back from a delimiter.
pub fn is_valid_block_name(name: &str) -> bool {
    match name.split_once('/') {
        Some((namespace, rest)) => is_segment(namespace) && is_segment(rest),
        None => false,
    }
}

/// Name as written in serialized delimiters: the default namespace is
/// implied and omitted.
pub fn serialized_name(name: &str) -> &str {
    name.strip_prefix(DEFAULT_NAMESPACE)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(name)
}

fn is_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

fn comment_body(source: &str, pos: usize) -> DelimiterResult<&str> {
    source
        .strip_prefix("<!--")
        .and_then(|s| s.strip_suffix("-->"))
        .map(str::trim)
        .ok_or_else(|| DelimiterError::malformed(pos))
}

fn split_word(input: &str) -> (&str, &str) {
    match input.find(|c: char| c.is_ascii_whitespace()) {
        Some(idx) => (&input[..idx], &input[idx..]),
        None => (input, ""),
    }
}
