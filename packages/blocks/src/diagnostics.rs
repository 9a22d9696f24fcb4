//! Non-fatal findings reported while resolving blocks.
//!
//! The resolver never logs directly; it reports to an injected
//! [`DiagnosticSink`]. Tests collect diagnostics, applications log them.

use crate::coerce::AttributeType;
use crate::error::CoercionError;
use std::sync::Mutex;
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A value taken from the delimiter or a default changed under coercion
    TypeMismatch {
        attribute: String,
        expected: AttributeType,
    },
    /// A block needed the fallback path but no unknown type handler exists
    MissingFallback { name: Option<String> },
    /// Coercion failed while resolving a block
    CoercionFailed {
        name: Option<String>,
        error: CoercionError,
    },
}

impl Diagnostic {
    pub fn message(&self) -> String {
        match self {
            Diagnostic::TypeMismatch {
                attribute,
                expected,
            } => format!("Expected attribute \"{}\" of type {}", attribute, expected),
            Diagnostic::MissingFallback { name } => format!(
                "Block {} ignored, no fallback block",
                name.as_deref().unwrap_or("(freeform)")
            ),
            Diagnostic::CoercionFailed { name, error } => format!(
                "Block {} could not be resolved: {}",
                name.as_deref().unwrap_or("(freeform)"),
                error
            ),
        }
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::TypeMismatch { .. } => error!("{}", diagnostic.message()),
            Diagnostic::MissingFallback { .. } | Diagnostic::CoercionFailed { .. } => {
                warn!("{}", diagnostic.message())
            }
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|diagnostics| diagnostics.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.clear();
        }
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diagnostic);
        }
    }
}
