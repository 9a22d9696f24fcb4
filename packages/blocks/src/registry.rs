use crate::block_type::BlockType;
use crate::error::RegistrationError;
use crate::hooks::{anchor_hook, RegistrationHook};
use blocks_grammar::is_valid_block_name;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Read-only view of registered block types used while parsing
pub trait BlockTypeRegistry {
    fn block_type(&self, name: &str) -> Option<&BlockType>;

    /// Name of the type that receives blocks nothing else can handle
    fn unknown_type_handler_name(&self) -> Option<&str>;
}

/// In-memory block type registry.
///
/// Populate it before parsing; parsing only ever borrows it immutably.
pub struct Registry {
    block_types: BTreeMap<String, BlockType>,
    unknown_type_handler: Option<String>,
    hooks: Vec<RegistrationHook>,
}

impl Registry {
    /// Registry with the built-in registration hooks
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.add_hook(anchor_hook);
        registry
    }

    /// Registry without any hooks
    pub fn empty() -> Self {
        Self {
            block_types: BTreeMap::new(),
            unknown_type_handler: None,
            hooks: Vec::new(),
        }
    }

    /// Run `hook` on every type registered from now on
    pub fn add_hook<F>(&mut self, hook: F)
    where
        F: Fn(&mut BlockType) + Send + Sync + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    pub fn register(&mut self, mut block_type: BlockType) -> Result<(), RegistrationError> {
        if !is_valid_block_name(&block_type.name) {
            return Err(RegistrationError::InvalidName {
                name: block_type.name,
            });
        }
        if self.block_types.contains_key(&block_type.name) {
            return Err(RegistrationError::AlreadyRegistered {
                name: block_type.name,
            });
        }

        let mut versions = HashSet::new();
        for migration in &block_type.migrations {
            if !versions.insert(migration.version) {
                warn!(
                    "Block {} declares several migrations for version {}, only the first is used",
                    block_type.name, migration.version
                );
            }
        }

        for hook in &self.hooks {
            hook(&mut block_type);
        }

        debug!("Registered block type {}", block_type.name);
        self.block_types.insert(block_type.name.clone(), block_type);
        Ok(())
    }

    pub fn unregister(&mut self, name: &str) -> Result<BlockType, RegistrationError> {
        let removed = self
            .block_types
            .remove(name)
            .ok_or_else(|| RegistrationError::NotRegistered {
                name: name.to_string(),
            })?;

        if self.unknown_type_handler.as_deref() == Some(name) {
            self.unknown_type_handler = None;
        }
        Ok(removed)
    }

    /// Route unknown blocks to `name`; it must be registered already
    pub fn set_unknown_type_handler(&mut self, name: &str) -> Result<(), RegistrationError> {
        if !self.block_types.contains_key(name) {
            return Err(RegistrationError::NotRegistered {
                name: name.to_string(),
            });
        }
        self.unknown_type_handler = Some(name.to_string());
        Ok(())
    }

    pub fn block_types(&self) -> impl Iterator<Item = &BlockType> {
        self.block_types.values()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTypeRegistry for Registry {
    fn block_type(&self, name: &str) -> Option<&BlockType> {
        self.block_types.get(name)
    }

    fn unknown_type_handler_name(&self) -> Option<&str> {
        self.unknown_type_handler.as_deref()
    }
}
