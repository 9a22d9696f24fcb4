//! Resolution of block-delimited documents into typed blocks.
//!
//! The grammar crate splits a document into raw blocks; this crate looks each
//! one up in a [`Registry`], resolves its attributes from the delimiter and
//! the content, migrates old versions and routes anything unknown to the
//! unknown type handler.
//!
//! ```ignore
//! let blocks = blocks::parse(document, &registry);
//! let text = blocks::serialize(&blocks, &registry);
//! ```

pub mod block_type;
pub mod coerce;
pub mod config;
pub mod content;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod factory;
pub mod hooks;
pub mod id_generator;
pub mod parser;
pub mod registry;
pub mod resolve;
pub mod resolver;
pub mod schema;
pub mod selector;
pub mod serializer;
pub mod source;
pub mod validation;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests_parser;
#[cfg(test)]
mod tests_resolver;

pub use block_type::{BlockType, MigrateFn, Migration, SaveFn};
pub use blocks_grammar::Attributes;
pub use coerce::{coerce, AttributeType};
pub use config::ParserConfig;
pub use content::{ContentNode, ContentTree};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use error::{
    BlockError, BlockResult, CoercionError, ConfigError, RegistrationError, SchemaError,
    SelectorError,
};
pub use extract::extract_sourced_attributes;
pub use factory::{BlockFactory, ParsedBlock, SequentialFactory};
pub use id_generator::IdGenerator;
pub use parser::parse;
pub use registry::{BlockTypeRegistry, Registry};
pub use resolve::resolve_attributes;
pub use resolver::{DocumentParser, Rejection, ResolutionPath};
pub use schema::{schema_from_json, AttributeSchema, Schema};
pub use selector::Selector;
pub use serializer::{serialize, serialize_block};
pub use source::{is_valid_source, AttributeSource};
pub use validation::{HtmlValidator, StructuralValidator};
