//! Error types for the `skybook-models` crate.
//!
//! [`ModelError`] covers malformed input to model constructors.
//! [`ValidationError`] is raised when a form submission is blocked by
//! failing field validators.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::validation::FieldError;

/// Errors produced when constructing or parsing model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A flight id was not a valid integer.
    #[error("invalid flight id \"{value}\": {reason}")]
    InvalidFlightId {
        /// The value that failed to parse.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// A validation pattern did not compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// A form has no field with this name.
    #[error("unknown form field: {field}")]
    UnknownField {
        /// The requested field name.
        field: String,
    },
}

/// A submission rejected on the client before any request was issued.
///
/// Failures are grouped per field, in field-name order.
#[derive(Debug, Clone, PartialEq, Eq, Default, thiserror::Error)]
#[error("validation failed{}", format_fields(.fields))]
pub struct ValidationError {
    /// Field name → failures for that field.
    pub fields: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationError {
    /// Record one failure against a field.
    pub fn push(&mut self, field: &str, error: FieldError) {
        self.fields.entry(field.to_string()).or_default().push(error);
    }

    /// Return `true` if no field has failures.
    pub fn is_empty(&self) -> bool {
        self.fields.values().all(Vec::is_empty)
    }

    /// Failures recorded against one field.
    pub fn errors_for(&self, field: &str) -> &[FieldError] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Turn an empty collection into `Ok(())`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Render the failures as `": field message; field message"`.
fn format_fields(fields: &BTreeMap<String, Vec<FieldError>>) -> String {
    let mut out = String::new();
    let mut sep = ": ";
    for (field, errors) in fields {
        for error in errors {
            let _ = write!(out, "{sep}{field} {error}");
            sep = "; ";
        }
    }
    out
}
