use crate::block_type::BlockType;
use crate::factory::ParsedBlock;
use crate::registry::BlockTypeRegistry;
use blocks_grammar::{comment_delimited_content, Attributes};

const BLOCK_SEPARATOR: &str = "\n\n";

/// Render blocks back to document text
pub fn serialize(blocks: &[ParsedBlock], registry: &dyn BlockTypeRegistry) -> String {
    blocks
        .iter()
        .map(|block| serialize_block(block, registry))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Render one block.
///
/// Invalid blocks and blocks of unregistered types keep their original
/// content so nothing is lost. The unknown type handler saves without
/// delimiters.
pub fn serialize_block(block: &ParsedBlock, registry: &dyn BlockTypeRegistry) -> String {
    if !block.is_valid {
        return block.original_content.clone();
    }

    let block_type = match registry.block_type(&block.name) {
        Some(block_type) => block_type,
        None => return block.original_content.clone(),
    };

    let content = block_type.save_content(&block.attributes);
    if registry.unknown_type_handler_name() == Some(block.name.as_str()) {
        return content;
    }

    comment_delimited_content(
        &block.name,
        &comment_attributes(block_type, &block.attributes),
        &content,
        block_type.version,
    )
}

/// Attributes that belong in the delimiter: stored ones that differ from
/// their default
fn comment_attributes(block_type: &BlockType, attributes: &Attributes) -> Attributes {
    block_type
        .attributes
        .iter()
        .filter(|(_, schema)| schema.is_stored())
        .filter_map(|(name, schema)| {
            let value = attributes.get(name)?;
            if schema.default_value() == Some(value) {
                return None;
            }
            Some((name.clone(), value.clone()))
        })
        .collect()
}
