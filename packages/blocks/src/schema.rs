use crate::coerce::AttributeType;
use crate::error::SchemaError;
use crate::source::{is_valid_source, AttributeSource};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute schema of a block type, keyed by attribute name
pub type Schema = BTreeMap<String, AttributeSchema>;

/// How a single attribute gets its value
#[derive(Debug, Clone)]
pub enum AttributeSchema {
    /// Read from content; falls back to the delimiter, then the default
    Sourced {
        source: AttributeSource,
        ty: AttributeType,
        default: Option<Value>,
    },
    /// Stored in the block delimiter, with an optional default
    Stored {
        ty: AttributeType,
        default: Option<Value>,
    },
    /// Never persisted: always starts from its default
    Computed { ty: AttributeType, default: Value },
}

impl AttributeSchema {
    pub fn sourced(source: AttributeSource, ty: AttributeType) -> Self {
        AttributeSchema::Sourced {
            source,
            ty,
            default: None,
        }
    }

    pub fn stored(ty: AttributeType) -> Self {
        AttributeSchema::Stored { ty, default: None }
    }

    pub fn computed(ty: AttributeType, default: impl Into<Value>) -> Self {
        AttributeSchema::Computed {
            ty,
            default: default.into(),
        }
    }

    /// Set the default used when no value is found
    pub fn with_default(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self {
            AttributeSchema::Sourced { source, ty, .. } => AttributeSchema::Sourced {
                source,
                ty,
                default: Some(value),
            },
            AttributeSchema::Stored { ty, .. } => AttributeSchema::Stored {
                ty,
                default: Some(value),
            },
            AttributeSchema::Computed { ty, .. } => AttributeSchema::Computed { ty, default: value },
        }
    }

    pub fn ty(&self) -> AttributeType {
        match self {
            AttributeSchema::Sourced { ty, .. }
            | AttributeSchema::Stored { ty, .. }
            | AttributeSchema::Computed { ty, .. } => *ty,
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            AttributeSchema::Sourced { default, .. } | AttributeSchema::Stored { default, .. } => {
                default.as_ref()
            }
            AttributeSchema::Computed { default, .. } => Some(default),
        }
    }

    pub fn source(&self) -> Option<&AttributeSource> {
        match self {
            AttributeSchema::Sourced { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the value is written into the block delimiter on save
    pub fn is_stored(&self) -> bool {
        matches!(self, AttributeSchema::Stored { .. })
    }

    /// Build one attribute from a JSON description:
    /// `{"type": "string", "default": "x", "source": {...}}`.
    ///
    /// A `source` that is not a valid source descriptor is ignored and the
    /// attribute is stored in the delimiter instead.
    pub fn from_json(attribute: &str, description: &Value) -> Result<Self, SchemaError> {
        let object = description
            .as_object()
            .ok_or_else(|| SchemaError::NotAnObject {
                attribute: attribute.to_string(),
            })?;

        let ty = match object.get("type") {
            Some(ty) => serde_json::from_value(ty.clone()).unwrap_or(AttributeType::Any),
            None => AttributeType::Any,
        };
        let default = object.get("default").cloned();

        let schema = match object.get("source") {
            Some(source) if is_valid_source(source) => AttributeSchema::Sourced {
                source: AttributeSource::from_descriptor(attribute, source)?,
                ty,
                default,
            },
            _ => AttributeSchema::Stored { ty, default },
        };
        Ok(schema)
    }
}

/// Build a whole schema from a JSON object of attribute descriptions
pub fn schema_from_json(description: &Value) -> Result<Schema, SchemaError> {
    let object = description.as_object().ok_or(SchemaError::NotASchema)?;
    object
        .iter()
        .map(|(name, attribute)| {
            AttributeSchema::from_json(name, attribute).map(|schema| (name.clone(), schema))
        })
        .collect()
}
