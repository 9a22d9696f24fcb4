use thiserror::Error;

pub type DelimiterResult<T> = Result<T, DelimiterError>;

/// Reasons a block delimiter is rejected. A rejected delimiter is never fatal:
/// the parser keeps its text as freeform content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DelimiterError {
    #[error("Malformed delimiter at {pos}")]
    Malformed { pos: usize },

    #[error("Invalid block name at {pos}: {name}")]
    InvalidName { pos: usize, name: String },

    #[error("Invalid block version at {pos}: {value}")]
    InvalidVersion { pos: usize, value: String },

    #[error("Invalid block attributes at {pos}: {message}")]
    InvalidAttributes { pos: usize, message: String },
}

impl DelimiterError {
    pub fn malformed(pos: usize) -> Self {
        Self::Malformed { pos }
    }

    pub fn invalid_name(pos: usize, name: impl Into<String>) -> Self {
        Self::InvalidName {
            pos,
            name: name.into(),
        }
    }

    pub fn invalid_version(pos: usize, value: impl Into<String>) -> Self {
        Self::InvalidVersion {
            pos,
            value: value.into(),
        }
    }

    pub fn invalid_attributes(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidAttributes {
            pos,
            message: message.into(),
        }
    }
}
