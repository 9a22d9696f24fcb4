use crate::coerce::{coerce, AttributeType};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::CoercionError;
use crate::extract::extract_sourced_attributes;
use crate::schema::{AttributeSchema, Schema};
use blocks_grammar::Attributes;
use serde_json::Value;

/// Resolve the attributes of one block against `schema`.
///
/// Sourced attributes prefer the value found in `raw_content`, then the
/// delimiter value, then the default. Stored attributes skip the content and
/// computed ones only ever take their default. Attributes without any value
/// are omitted from the result.
///
/// When `diagnostics` is given, a delimiter or default value that changes
/// under coercion is reported as a type mismatch; the coerced value is used
/// either way.
pub fn resolve_attributes(
    schema: &Schema,
    raw_content: &str,
    stored: &Attributes,
    diagnostics: Option<&dyn DiagnosticSink>,
) -> Result<Attributes, CoercionError> {
    let sourced = extract_sourced_attributes(raw_content, schema);
    let mut resolved = Attributes::new();

    for (name, attribute) in schema {
        let (value, from_content) = match select_value(name, attribute, &sourced, stored) {
            Some(found) => found,
            None => continue,
        };

        let coerced = coerce(value, attribute.ty())?;
        if !from_content && coerced != *value {
            report_mismatch(diagnostics, name, attribute.ty());
        }
        resolved.insert(name.clone(), coerced);
    }

    Ok(resolved)
}

/// Pick the value for one attribute and whether it came from content
fn select_value<'a>(
    name: &str,
    attribute: &'a AttributeSchema,
    sourced: &'a Attributes,
    stored: &'a Attributes,
) -> Option<(&'a Value, bool)> {
    match attribute {
        AttributeSchema::Sourced { default, .. } => sourced
            .get(name)
            .map(|value| (value, true))
            .or_else(|| stored.get(name).map(|value| (value, false)))
            .or_else(|| default.as_ref().map(|value| (value, false))),
        AttributeSchema::Stored { default, .. } => stored
            .get(name)
            .or(default.as_ref())
            .map(|value| (value, false)),
        AttributeSchema::Computed { default, .. } => Some((default, false)),
    }
}

fn report_mismatch(diagnostics: Option<&dyn DiagnosticSink>, name: &str, ty: AttributeType) {
    if let Some(sink) = diagnostics {
        sink.report(Diagnostic::TypeMismatch {
            attribute: name.to_string(),
            expected: ty,
        });
    }
}
