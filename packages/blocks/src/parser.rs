use crate::diagnostics::Diagnostic;
use crate::factory::{BlockFactory, ParsedBlock, SequentialFactory};
use crate::registry::BlockTypeRegistry;
use crate::resolver::DocumentParser;
use blocks_grammar::RawBlockNode;
use tracing::{debug, info, instrument};

/// Parse a document with the default configuration
pub fn parse(document: &str, registry: &dyn BlockTypeRegistry) -> Vec<ParsedBlock> {
    DocumentParser::new(registry).parse_document(document)
}

impl<'r> DocumentParser<'r> {
    /// Split `document` into raw blocks and resolve each one, in order.
    /// Blocks that cannot be resolved are left out.
    pub fn parse_document(&self, document: &str) -> Vec<ParsedBlock> {
        let mut factory = SequentialFactory::for_document(document);
        self.parse_document_with(document, &mut factory)
    }

    #[instrument(skip(self, document, factory), fields(len = document.len()))]
    pub fn parse_document_with(&self, document: &str, factory: &mut dyn BlockFactory) -> Vec<ParsedBlock> {
        let nodes = blocks_grammar::parse(document);
        info!(nodes = nodes.len(), "Resolving document blocks");

        let blocks: Vec<ParsedBlock> = nodes
            .iter()
            .filter_map(|node| self.resolve_node(factory, node))
            .collect();

        info!(blocks = blocks.len(), "Document parsed");
        blocks
    }

    fn resolve_node(&self, factory: &mut dyn BlockFactory, node: &RawBlockNode) -> Option<ParsedBlock> {
        let name = node.block_name.as_deref();
        let raw_content = node.raw_content.trim();

        match self.resolve_block(factory, name, raw_content, &node.attrs, node.version) {
            Ok(block) => block,
            Err(error) => {
                self.report(Diagnostic::CoercionFailed {
                    name: node.block_name.clone(),
                    error,
                });
                self.resolve_fallback(factory, name, raw_content, &node.attrs, node.version)
                    .unwrap_or_else(|error| {
                        debug!("Dropping block after failed fallback: {}", error);
                        None
                    })
            }
        }
    }
}
