use crate::id_generator::IdGenerator;
use blocks_grammar::Attributes;
use serde::{Deserialize, Serialize};

/// A block resolved from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedBlock {
    pub uid: String,
    pub name: String,
    pub attributes: Attributes,
    /// Whether saving `attributes` reproduces `original_content`
    pub is_valid: bool,
    pub original_content: String,
}

/// Creates blocks and gives each one a fresh identity
pub trait BlockFactory {
    /// Build a block with `is_valid` set and empty original content; the
    /// resolver fills those in.
    fn create_block(&mut self, name: &str, attributes: Attributes) -> ParsedBlock;
}

/// Numbers blocks in creation order under a per-document seed
#[derive(Debug, Clone)]
pub struct SequentialFactory {
    ids: IdGenerator,
}

impl SequentialFactory {
    pub fn new(ids: IdGenerator) -> Self {
        Self { ids }
    }

    pub fn for_document(document: &str) -> Self {
        Self::new(IdGenerator::new(document))
    }
}

impl BlockFactory for SequentialFactory {
    fn create_block(&mut self, name: &str, attributes: Attributes) -> ParsedBlock {
        ParsedBlock {
            uid: self.ids.new_id(),
            name: name.to_string(),
            attributes,
            is_valid: true,
            original_content: String::new(),
        }
    }
}
