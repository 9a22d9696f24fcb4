use thiserror::Error;

pub type BlockResult<T> = Result<T, BlockError>;

/// Raised when a value cannot be coerced to its declared attribute type.
///
/// This is the only failure allowed to escape the resolution of a single
/// block; every other problem degrades to the fallback path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("Cannot coerce non-iterable {found} to array")]
    NotIterable { found: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected '{found}' at {pos} in selector '{selector}'")]
    UnexpectedChar {
        selector: String,
        pos: usize,
        found: char,
    },

    #[error("Unexpected end of selector '{selector}'")]
    UnexpectedEnd { selector: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Attribute '{attribute}' must be described by an object")]
    NotAnObject { attribute: String },

    #[error("Attribute schema must be an object of attribute descriptions")]
    NotASchema,

    #[error("Invalid source for attribute '{attribute}': {message}")]
    InvalidSource { attribute: String, message: String },

    #[error("Invalid selector: {0}")]
    Selector(#[from] SelectorError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("Block names must contain a namespace prefix, e.g. my-plugin/my-block: '{name}'")]
    InvalidName { name: String },

    #[error("Block '{name}' is already registered")]
    AlreadyRegistered { name: String },

    #[error("Block '{name}' is not registered")]
    NotRegistered { name: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read parser configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parser configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Common error type for everything that can go wrong outside of parsing
#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Coercion error: {0}")]
    Coercion(#[from] CoercionError),

    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CoercionError {
    pub fn not_iterable(found: &'static str) -> Self {
        Self::NotIterable { found }
    }
}

impl SelectorError {
    pub fn unexpected_char(selector: impl Into<String>, pos: usize, found: char) -> Self {
        Self::UnexpectedChar {
            selector: selector.into(),
            pos,
            found,
        }
    }

    pub fn unexpected_end(selector: impl Into<String>) -> Self {
        Self::UnexpectedEnd {
            selector: selector.into(),
        }
    }
}

impl SchemaError {
    pub fn invalid_source(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSource {
            attribute: attribute.into(),
            message: message.into(),
        }
    }
}
