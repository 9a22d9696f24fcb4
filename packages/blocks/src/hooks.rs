use crate::block_type::BlockType;
use crate::coerce::AttributeType;
use crate::schema::AttributeSchema;
use crate::selector::Selector;
use crate::source::AttributeSource;

/// Adjusts a block type while it is being registered
pub type RegistrationHook = Box<dyn Fn(&mut BlockType) + Send + Sync>;

pub const ANCHOR_ATTRIBUTE: &str = "anchor";

/// Give anchor-supporting types an `anchor` attribute read from the `id` of
/// any element in their content
pub fn anchor_hook(block_type: &mut BlockType) {
    if !block_type.supports_anchor || block_type.attributes.contains_key(ANCHOR_ATTRIBUTE) {
        return;
    }

    let source = AttributeSource::attr_in(Some(Selector::universal()), "id");
    block_type.attributes.insert(
        ANCHOR_ATTRIBUTE.to_string(),
        AttributeSchema::sourced(source, AttributeType::String),
    );
}
