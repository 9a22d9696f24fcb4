use crate::content::ContentTree;
use crate::schema::Schema;
use blocks_grammar::Attributes;

/// Read every content-sourced attribute of `schema` from `raw_content`.
///
/// The content is parsed once and all sources run against that same tree.
/// Attributes whose source finds nothing are left out of the result.
pub fn extract_sourced_attributes(raw_content: &str, schema: &Schema) -> Attributes {
    let mut sources = schema
        .iter()
        .filter_map(|(name, attribute)| attribute.source().map(|source| (name, source)))
        .peekable();

    let mut sourced = Attributes::new();
    if sources.peek().is_none() {
        return sourced;
    }

    let tree = ContentTree::parse(raw_content);
    for (name, source) in sources {
        if let Some(value) = source.extract(tree.root()) {
            sourced.insert(name.clone(), value);
        }
    }
    sourced
}
