//! Closed JSON shape descriptors and the generic shape checker.
//!
//! # Invariants
//! - Checking is pure and never stops at the first violation.
//! - Violation order is: root type, declared fields in declaration order,
//!   then unrecognized fields in key order.

use chrono::DateTime;
use serde_json::Value;

/// Primitive type a declared field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    /// String in RFC 3339 `date-time` format.
    DateTime,
}

/// One declared property of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// Closed object shape: undeclared properties are violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Canonical item payload: `{ name, color?, price? }`.
pub const ITEM_SHAPE: Shape = Shape {
    name: "item",
    fields: &[
        FieldSpec {
            name: "name",
            kind: FieldKind::String,
            required: true,
        },
        FieldSpec {
            name: "color",
            kind: FieldKind::String,
            required: false,
        },
        FieldSpec {
            name: "price",
            kind: FieldKind::Number,
            required: false,
        },
    ],
};

/// Event payload: `{ location, custodian, timestamp? }`.
pub const EVENT_SHAPE: Shape = Shape {
    name: "event",
    fields: &[
        FieldSpec {
            name: "location",
            kind: FieldKind::String,
            required: true,
        },
        FieldSpec {
            name: "custodian",
            kind: FieldKind::String,
            required: true,
        },
        FieldSpec {
            name: "timestamp",
            kind: FieldKind::DateTime,
            required: false,
        },
    ],
};

impl Shape {
    /// Returns every violation of `value` against this shape.
    ///
    /// An empty result means the value conforms.
    pub fn violations(&self, value: &Value) -> Vec<String> {
        let Some(object) = value.as_object() else {
            return vec!["must be object".to_string()];
        };

        let mut violations = Vec::new();
        for field in self.fields {
            match object.get(field.name) {
                None if field.required => {
                    violations.push(format!("must have required property '{}'", field.name));
                }
                None => {}
                Some(candidate) => {
                    if let Some(message) = field.check(candidate) {
                        violations.push(message);
                    }
                }
            }
        }

        for key in object.keys() {
            if !self.declares(key) {
                violations.push(format!("must NOT have additional property '{key}'"));
            }
        }

        violations
    }

    fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field.name == key)
    }
}

impl FieldSpec {
    fn check(&self, candidate: &Value) -> Option<String> {
        match self.kind {
            FieldKind::String if !candidate.is_string() => {
                Some(format!("/{} must be string", self.name))
            }
            FieldKind::Number if !candidate.is_number() => {
                Some(format!("/{} must be number", self.name))
            }
            FieldKind::DateTime => match candidate.as_str() {
                None => Some(format!("/{} must be string", self.name)),
                Some(raw) if DateTime::parse_from_rfc3339(raw).is_err() => Some(format!(
                    "/{} must match format \"date-time\"",
                    self.name
                )),
                Some(_) => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EVENT_SHAPE, ITEM_SHAPE};
    use serde_json::json;

    #[test]
    fn non_object_root_reports_single_violation() {
        assert_eq!(ITEM_SHAPE.violations(&json!([1, 2])), vec!["must be object"]);
        assert_eq!(EVENT_SHAPE.violations(&json!("x")), vec!["must be object"]);
    }

    #[test]
    fn violations_follow_declaration_then_key_order() {
        let violations = ITEM_SHAPE.violations(&json!({
            "zeta": 1,
            "price": "cheap",
            "alpha": true
        }));
        assert_eq!(
            violations,
            vec![
                "must have required property 'name'",
                "/price must be number",
                "must NOT have additional property 'alpha'",
                "must NOT have additional property 'zeta'",
            ]
        );
    }

    #[test]
    fn integer_price_counts_as_number() {
        assert!(ITEM_SHAPE
            .violations(&json!({"name": "Crate", "price": 12}))
            .is_empty());
    }
}
