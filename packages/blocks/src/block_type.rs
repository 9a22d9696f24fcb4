use crate::schema::{AttributeSchema, Schema};
use blocks_grammar::{Attributes, DEFAULT_VERSION};
use std::fmt;
use std::sync::Arc;

/// Renders block attributes to the markup stored between the delimiters
pub type SaveFn = Arc<dyn Fn(&Attributes) -> String + Send + Sync>;

/// Turns attributes of an old block version into current attributes
pub type MigrateFn = Arc<dyn Fn(Attributes) -> Attributes + Send + Sync>;

/// A registered kind of block
#[derive(Clone)]
pub struct BlockType {
    pub name: String,
    pub attributes: Schema,
    pub version: u32,
    pub migrations: Vec<Migration>,
    /// Whether the block keeps an `id` on its wrapper as its anchor
    pub supports_anchor: bool,
    pub save: SaveFn,
}

/// How to read a block saved by an older version of its type
#[derive(Clone)]
pub struct Migration {
    pub version: u32,
    /// Schema the old version declared
    pub attributes: Schema,
    /// Save function of the old version
    pub save: SaveFn,
    pub migrate: MigrateFn,
}

impl BlockType {
    pub fn new<F>(name: impl Into<String>, save: F) -> Self
    where
        F: Fn(&Attributes) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            attributes: Schema::new(),
            version: DEFAULT_VERSION,
            migrations: Vec::new(),
            supports_anchor: false,
            save: Arc::new(save),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: AttributeSchema) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn with_attributes(mut self, attributes: Schema) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_migration(mut self, migration: Migration) -> Self {
        self.migrations.push(migration);
        self
    }

    pub fn with_anchor_support(mut self) -> Self {
        self.supports_anchor = true;
        self
    }

    pub fn save_content(&self, attributes: &Attributes) -> String {
        (self.save)(attributes)
    }

    /// Migration declared for `version`; the first one wins when several are
    pub fn find_migration(&self, version: u32) -> Option<&Migration> {
        self.migrations
            .iter()
            .find(|migration| migration.version == version)
    }
}

impl fmt::Debug for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockType")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("version", &self.version)
            .field("migrations", &self.migrations)
            .field("supports_anchor", &self.supports_anchor)
            .finish()
    }
}

impl Migration {
    pub fn new<S, M>(version: u32, save: S, migrate: M) -> Self
    where
        S: Fn(&Attributes) -> String + Send + Sync + 'static,
        M: Fn(Attributes) -> Attributes + Send + Sync + 'static,
    {
        Self {
            version,
            attributes: Schema::new(),
            save: Arc::new(save),
            migrate: Arc::new(migrate),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: AttributeSchema) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn with_attributes(mut self, attributes: Schema) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn save_content(&self, attributes: &Attributes) -> String {
        (self.save)(attributes)
    }

    pub fn apply(&self, attributes: Attributes) -> Attributes {
        (self.migrate)(attributes)
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("attributes", &self.attributes)
            .finish()
    }
}
