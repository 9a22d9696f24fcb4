//! Per-block resolution: direct parse, migration or fallback.

use crate::block_type::{BlockType, Migration};
use crate::config::ParserConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::CoercionError;
use crate::factory::{BlockFactory, ParsedBlock};
use crate::registry::BlockTypeRegistry;
use crate::resolve::resolve_attributes;
use crate::validation::{HtmlValidator, StructuralValidator};
use blocks_grammar::{comment_delimited_content, Attributes};
use std::sync::Arc;
use tracing::debug;

/// Which way a block is resolved
#[derive(Debug)]
pub enum ResolutionPath<'r> {
    /// The stored version is the current one
    DirectParse(&'r BlockType),
    /// An older version with a matching migration
    Migrate(&'r BlockType, &'r Migration),
    /// Handed to the unknown type handler
    Fallback(&'r BlockType),
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Neither a name nor any content
    Empty,
    /// Fallback was needed but no unknown type handler is registered
    MissingFallback,
}

/// Resolves raw blocks against a registry of block types
pub struct DocumentParser<'r> {
    registry: &'r dyn BlockTypeRegistry,
    config: ParserConfig,
    validator: Box<dyn HtmlValidator>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl<'r> DocumentParser<'r> {
    pub fn new(registry: &'r dyn BlockTypeRegistry) -> Self {
        Self {
            registry,
            config: ParserConfig::default(),
            validator: Box::new(StructuralValidator),
            diagnostics: Arc::new(TracingSink),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_validator(mut self, validator: impl HtmlValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Choose how a block is resolved. `name` must already be canonical.
    pub fn resolution_path(&self, name: Option<&str>, raw_content: &str, version: u32) -> ResolutionPath<'r> {
        if let Some(block_type) = name.and_then(|name| self.registry.block_type(name)) {
            if block_type.version == version {
                return ResolutionPath::DirectParse(block_type);
            }
            if let Some(migration) = block_type.find_migration(version) {
                return ResolutionPath::Migrate(block_type, migration);
            }
        }
        self.fallback_path(name, raw_content)
    }

    fn fallback_path(&self, name: Option<&str>, raw_content: &str) -> ResolutionPath<'r> {
        if name.map_or(true, str::is_empty) && raw_content.is_empty() {
            return ResolutionPath::Rejected(Rejection::Empty);
        }

        let registry = self.registry;
        match registry
            .unknown_type_handler_name()
            .and_then(|handler| registry.block_type(handler))
        {
            Some(handler) => ResolutionPath::Fallback(handler),
            None => ResolutionPath::Rejected(Rejection::MissingFallback),
        }
    }

    /// Resolve one raw block. `Ok(None)` means the block is dropped.
    ///
    /// Only a failed array coercion is returned as an error; callers decide
    /// whether to retry the block through [`DocumentParser::resolve_fallback`].
    pub fn resolve_block(
        &self,
        factory: &mut dyn BlockFactory,
        name: Option<&str>,
        raw_content: &str,
        attributes: &Attributes,
        version: u32,
    ) -> Result<Option<ParsedBlock>, CoercionError> {
        let name = name.map(|name| self.config.canonical_name(name));

        match self.resolution_path(name, raw_content, version) {
            ResolutionPath::DirectParse(block_type) => {
                let resolved =
                    resolve_attributes(&block_type.attributes, raw_content, attributes, self.dev_sink())?;
                let content = block_type.save_content(&resolved);
                Ok(Some(self.finish(factory, &block_type.name, resolved, &content, raw_content)))
            }
            ResolutionPath::Migrate(block_type, migration) => {
                debug!(
                    "Migrating {} from version {} to {}",
                    block_type.name, version, block_type.version
                );
                let old =
                    resolve_attributes(&migration.attributes, raw_content, attributes, self.dev_sink())?;
                let content = migration.save_content(&old);
                let migrated = migration.apply(old);
                Ok(Some(self.finish(factory, &block_type.name, migrated, &content, raw_content)))
            }
            ResolutionPath::Fallback(handler) => {
                self.fallback_block(factory, handler, name, raw_content, attributes, version)
            }
            ResolutionPath::Rejected(rejection) => {
                self.reject(name, rejection);
                Ok(None)
            }
        }
    }

    /// Resolve a block through the unknown type handler regardless of its
    /// registered type.
    pub fn resolve_fallback(
        &self,
        factory: &mut dyn BlockFactory,
        name: Option<&str>,
        raw_content: &str,
        attributes: &Attributes,
        version: u32,
    ) -> Result<Option<ParsedBlock>, CoercionError> {
        let name = name.map(|name| self.config.canonical_name(name));

        match self.fallback_path(name, raw_content) {
            ResolutionPath::Fallback(handler) => {
                self.fallback_block(factory, handler, name, raw_content, attributes, version)
            }
            ResolutionPath::Rejected(rejection) => {
                self.reject(name, rejection);
                Ok(None)
            }
            ResolutionPath::DirectParse(_) | ResolutionPath::Migrate(..) => Ok(None),
        }
    }

    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.report(diagnostic);
    }

    fn fallback_block(
        &self,
        factory: &mut dyn BlockFactory,
        handler: &BlockType,
        name: Option<&str>,
        raw_content: &str,
        attributes: &Attributes,
        version: u32,
    ) -> Result<Option<ParsedBlock>, CoercionError> {
        // Named blocks keep their delimiters, version included, so they
        // survive a save
        let content = match name {
            Some(name) if !name.is_empty() => {
                comment_delimited_content(name, attributes, raw_content, version)
            }
            _ => raw_content.to_string(),
        };

        let resolved = resolve_attributes(&handler.attributes, &content, attributes, self.dev_sink())?;
        let saved = handler.save_content(&resolved);
        Ok(Some(self.finish(factory, &handler.name, resolved, &saved, &content)))
    }

    fn finish(
        &self,
        factory: &mut dyn BlockFactory,
        name: &str,
        attributes: Attributes,
        content_to_validate: &str,
        original_content: &str,
    ) -> ParsedBlock {
        let mut block = factory.create_block(name, attributes);
        block.is_valid = self
            .validator
            .is_equivalent(content_to_validate, original_content);
        if !block.is_valid {
            debug!("Block {} content does not match its saved form", name);
        }
        block.original_content = original_content.to_string();
        block
    }

    fn reject(&self, name: Option<&str>, rejection: Rejection) {
        match rejection {
            Rejection::Empty => {}
            Rejection::MissingFallback => self.report(Diagnostic::MissingFallback {
                name: name.map(str::to_string),
            }),
        }
    }

    /// Sink for development-only diagnostics
    fn dev_sink(&self) -> Option<&dyn DiagnosticSink> {
        if self.config.dev_mode {
            Some(self.diagnostics.as_ref())
        } else {
            None
        }
    }
}
