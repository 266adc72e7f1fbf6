//! Structural validation.
//!
//! Two schema variants gate the normalizer:
//!
//! | Mode        | Input                          | Accepts aliases |
//! |-------------|--------------------------------|-----------------|
//! | `authoring` | raw documents, after shape     | yes             |
//! | `canonical` | the normalizer's JSON output   | no              |
//!
//! Violations are collected, never short-circuited, and returned together.

pub mod authoring;
pub mod canonical;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BlueprintError;

pub use authoring::validate_authoring;
pub use canonical::{
    validate_canonical, validate_canonical_value, validate_canonical_value_with, validate_canonical_with,
    PatternCheck,
};

/// Which schema a report was produced against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaMode {
    /// Permissive author-facing shape.
    Authoring,
    /// Strict canonical shape.
    Canonical,
}

impl fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authoring => write!(f, "authoring"),
            Self::Canonical => write!(f, "canonical"),
        }
    }
}

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// JSON-pointer-like location, e.g. `/prompts/2/should/0/multiplier`.
    pub path: String,
    /// What is wrong at that location.
    pub message: String,
}

impl SchemaViolation {
    /// Create a violation.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every violation found by one schema pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Schema that was applied.
    pub mode: SchemaMode,
    /// Violations in discovery order.
    pub violations: Vec<SchemaViolation>,
}

impl ValidationReport {
    /// Empty report for `mode`.
    pub fn new(mode: SchemaMode) -> Self {
        Self {
            mode,
            violations: Vec::new(),
        }
    }

    /// Record a violation.
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(SchemaViolation::new(path, message));
    }

    /// Whether no violation was found.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// `Ok` when valid, otherwise [`BlueprintError::Schema`] with every violation.
    pub fn into_result(self) -> Result<(), BlueprintError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(BlueprintError::Schema {
                mode: self.mode,
                violations: self.violations,
            })
        }
    }
}

/// JSON type name used in violation messages.
pub(crate) fn type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_collects_violations() {
        let mut report = ValidationReport::new(SchemaMode::Authoring);
        assert!(report.is_valid());
        report.push("/prompts/0", "must be an object");
        report.push("/title", "must be a string");
        assert!(!report.is_valid());

        let err = report.into_result().unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.to_string().starts_with("Blueprint failed authoring schema validation: "));
    }

    #[test]
    fn test_valid_report_is_ok() {
        assert!(ValidationReport::new(SchemaMode::Canonical).into_result().is_ok());
    }
}
