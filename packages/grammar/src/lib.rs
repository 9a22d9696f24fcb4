//! Grammar for block-delimited post content.
//!
//! Stored posts are HTML interleaved with comment delimiters that mark where
//! each block starts and ends:
//!
//! ```text
//! <!-- wp:paragraph {"align":"right"} -->
//! <p>Hello</p>
//! <!-- /wp:paragraph -->
//! ```
//!
//! [`parse`] splits a document into [`RawBlockNode`]s and never fails;
//! [`comment_delimited_content`] produces the same syntax back.

pub mod ast;
pub mod delimiter;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use ast::{Attributes, RawBlockNode, Span, DEFAULT_VERSION};
pub use delimiter::{canonical_name, is_valid_block_name, Delimiter};
pub use error::{DelimiterError, DelimiterResult};
pub use parser::{parse, Parser};
pub use serializer::{comment_delimited_content, serialize_attributes};
pub use tokenizer::{tokenize, Token};
