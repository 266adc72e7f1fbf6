//! Rubric points.
//!
//! A point is either a free-text criterion graded later by a judge, or a
//! named deterministic check with arguments. It never carries both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Smallest accepted point multiplier.
pub const MIN_MULTIPLIER: f64 = 0.1;

/// Largest accepted point multiplier.
pub const MAX_MULTIPLIER: f64 = 10.0;

/// Multiplier applied when the author gives none.
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// What a point checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointKind {
    /// Conceptual criterion graded by a judge.
    Text {
        /// Criterion text.
        text: String,
    },
    /// Deterministic check.
    Function {
        /// Canonical function name (e.g. `contains`).
        #[serde(rename = "fn")]
        function: String,
        /// Function arguments, verbatim from the author.
        #[serde(rename = "fnArgs", default)]
        args: Value,
    },
}

/// A canonical rubric point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Text or function criterion.
    #[serde(flatten)]
    pub kind: PointKind,
    /// Weight in `[MIN_MULTIPLIER, MAX_MULTIPLIER]`.
    pub multiplier: f64,
    /// Optional source reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

impl Point {
    /// Create a text point with the default multiplier.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: PointKind::Text { text: text.into() },
            multiplier: DEFAULT_MULTIPLIER,
            citation: None,
        }
    }

    /// Create a function point with the default multiplier.
    pub fn function(function: impl Into<String>, args: Value) -> Self {
        Self {
            kind: PointKind::Function {
                function: function.into(),
                args,
            },
            multiplier: DEFAULT_MULTIPLIER,
            citation: None,
        }
    }

    /// Set the multiplier.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the citation.
    pub fn with_citation(mut self, citation: impl Into<String>) -> Self {
        self.citation = Some(citation.into());
        self
    }

    /// Criterion text, if this is a text point.
    pub fn criterion(&self) -> Option<&str> {
        match &self.kind {
            PointKind::Text { text } => Some(text),
            PointKind::Function { .. } => None,
        }
    }

    /// Function name, if this is a function point.
    pub fn function_name(&self) -> Option<&str> {
        match &self.kind {
            PointKind::Function { function, .. } => Some(function),
            PointKind::Text { .. } => None,
        }
    }

    /// Function arguments, if this is a function point.
    pub fn function_args(&self) -> Option<&Value> {
        match &self.kind {
            PointKind::Function { args, .. } => Some(args),
            PointKind::Text { .. } => None,
        }
    }

    /// Whether the multiplier is inside the accepted range.
    pub fn multiplier_in_range(&self) -> bool {
        multiplier_in_range(self.multiplier)
    }
}

/// Whether `value` is an accepted multiplier.
pub fn multiplier_in_range(value: f64) -> bool {
    value.is_finite() && (MIN_MULTIPLIER..=MAX_MULTIPLIER).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_point_shape() {
        let point = Point::text("A point");
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({"text": "A point", "multiplier": 1.0})
        );
    }

    #[test]
    fn test_function_point_shape() {
        let point = Point::function("matches", json!("[0-9]+"))
            .with_multiplier(0.5)
            .with_citation("c1");
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({"fn": "matches", "fnArgs": "[0-9]+", "multiplier": 0.5, "citation": "c1"})
        );
    }

    #[test]
    fn test_point_deserializes_both_kinds() {
        let text: Point = serde_json::from_value(json!({"text": "B", "multiplier": 3.0})).unwrap();
        assert_eq!(text.criterion(), Some("B"));

        let function: Point =
            serde_json::from_value(json!({"fn": "is_json", "multiplier": 1.0})).unwrap();
        assert_eq!(function.function_name(), Some("is_json"));
        assert_eq!(function.function_args(), Some(&Value::Null));
    }

    #[test]
    fn test_multiplier_bounds() {
        assert!(multiplier_in_range(0.1));
        assert!(multiplier_in_range(10.0));
        assert!(!multiplier_in_range(0.05));
        assert!(!multiplier_in_range(100.0));
        assert!(!multiplier_in_range(f64::NAN));
    }
}
