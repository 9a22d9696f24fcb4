use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute values keyed by attribute name, as stored in a delimiter.
pub type Attributes = Map<String, Value>;

/// Version assumed for delimiters that do not declare one.
pub const DEFAULT_VERSION: u32 = 1;

/// Byte range of a node in the source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// One region of the document: either a delimited block or a run of
/// freeform content between blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlockNode {
    /// Normalized block name, `None` for freeform content
    pub block_name: Option<String>,
    /// Content between the delimiters, untouched
    pub raw_content: String,
    /// Attributes decoded from the opening delimiter
    pub attrs: Attributes,
    /// Schema version the block was serialized with
    pub version: u32,
    pub span: Span,
}

impl RawBlockNode {
    pub fn block(
        name: impl Into<String>,
        raw_content: impl Into<String>,
        attrs: Attributes,
        version: u32,
        span: Span,
    ) -> Self {
        Self {
            block_name: Some(name.into()),
            raw_content: raw_content.into(),
            attrs,
            version,
            span,
        }
    }

    pub fn freeform(raw_content: impl Into<String>, span: Span) -> Self {
        Self {
            block_name: None,
            raw_content: raw_content.into(),
            attrs: Attributes::new(),
            version: DEFAULT_VERSION,
            span,
        }
    }

    pub fn is_freeform(&self) -> bool {
        self.block_name.is_none()
    }
}
