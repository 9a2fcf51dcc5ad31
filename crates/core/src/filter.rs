//! Filter expression types
//!
//! A filter decides whether a candidate subtree matches. The language is a
//! closed sum: child comparisons (`child(path, op, literal)`) combined with
//! `and(...)` / `or(...)`. Filters are pure values; evaluation lives with the
//! store facade, which resolves child paths via point lookups.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator for child filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Equal
    Eq,
    /// Not equal (matches absent targets)
    Neq,
    /// Less than
    Lt,
    /// Greater than
    Gt,
    /// Less than or equal
    Lte,
    /// Greater than or equal
    Gte,
}

/// Combinator for logical filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    /// All children must match; short-circuits on first non-match
    And,
    /// At least one child must match; short-circuits on first match
    Or,
}

/// A filter expression evaluated against a candidate subtree root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Compare the scalar at a relative child path against a literal.
    Child {
        /// Path relative to the candidate root
        path: String,
        /// Comparison operator
        op: Op,
        /// Literal to compare against (scalar)
        literal: Value,
    },
    /// Combine child filters with AND/OR.
    Logical {
        /// How to combine the children
        combinator: Combinator,
        /// Child filters, evaluated left to right
        filters: Vec<Filter>,
    },
}

impl Filter {
    /// Build a child comparison filter.
    pub fn child(path: impl Into<String>, op: Op, literal: impl Into<Value>) -> Filter {
        Filter::Child {
            path: path.into(),
            op,
            literal: literal.into(),
        }
    }

    /// Combine filters; all must match.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Filter {
        Filter::Logical {
            combinator: Combinator::And,
            filters: filters.into_iter().collect(),
        }
    }

    /// Combine filters; at least one must match.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Filter {
        Filter::Logical {
            combinator: Combinator::Or,
            filters: filters.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_child_builder() {
        let filter = Filter::child("name", Op::Eq, "u2");
        assert_eq!(
            filter,
            Filter::Child {
                path: "name".into(),
                op: Op::Eq,
                literal: json!("u2"),
            }
        );
    }

    #[test]
    fn test_and_builder() {
        let filter = Filter::and([
            Filter::child("age", Op::Gt, 9),
            Filter::child("name", Op::Lt, "u3"),
        ]);
        match filter {
            Filter::Logical {
                combinator: Combinator::And,
                filters,
            } => assert_eq!(filters.len(), 2),
            other => panic!("unexpected filter: {:?}", other),
        }
    }

    #[test]
    fn test_or_builder() {
        let filter = Filter::or([Filter::child("a", Op::Eq, 1)]);
        assert!(matches!(
            filter,
            Filter::Logical {
                combinator: Combinator::Or,
                ..
            }
        ));
    }

    #[test]
    fn test_filters_are_plain_values() {
        let filter = Filter::child("n", Op::Gte, 1.5);
        let copy = filter.clone();
        assert_eq!(filter, copy);
    }

    #[test]
    fn test_filter_serde_round_trip() {
        let filter = Filter::and([
            Filter::child("tag", Op::Eq, "x"),
            Filter::or([Filter::child("n", Op::Gt, 1), Filter::child("n", Op::Lt, -1)]),
        ]);
        let text = serde_json::to_string(&filter).unwrap();
        let back: Filter = serde_json::from_str(&text).unwrap();
        assert_eq!(filter, back);
    }
}
