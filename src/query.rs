//! Filter evaluation
//!
//! Filters are evaluated against candidate subtree roots (the immediate
//! children of a collection path) using targeted point lookups, never a full
//! reconstruction of the candidate. Missing comparison targets are a
//! non-match for every operator except `Neq`; type mismatches are a
//! non-match for the ordering operators.

use serde_json::Value;
use strand_core::codec;
use strand_core::error::Result;
use strand_core::filter::{Combinator, Filter, Op};
use strand_core::path::DbPath;
use strand_core::record::LeafValue;
use strand_storage::Backend;

/// Decide whether the subtree rooted at `candidate` matches `filter`.
///
/// `And` of no filters matches; `Or` of no filters does not.
pub(crate) fn evaluate(
    backend: &dyn Backend,
    candidate: &DbPath,
    filter: &Filter,
) -> Result<bool> {
    match filter {
        Filter::Child { path, op, literal } => {
            let target = resolve(candidate, path)?;
            match backend.get(target.as_str())? {
                Some(record) => Ok(matches_op(&record.value, *op, literal)),
                // Absence is "not equal" to any concrete literal.
                None => Ok(*op == Op::Neq),
            }
        }
        Filter::Logical {
            combinator: Combinator::And,
            filters,
        } => {
            for child in filters {
                if !evaluate(backend, candidate, child)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Filter::Logical {
            combinator: Combinator::Or,
            filters,
        } => {
            for child in filters {
                if evaluate(backend, candidate, child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

/// Resolve a filter's relative path against a candidate root.
///
/// Only the relative part is parsed; the candidate is already normalized
/// and may contain encoded index segments that must not be re-validated.
fn resolve(candidate: &DbPath, relative: &str) -> Result<DbPath> {
    let rel = DbPath::parse(relative)?;
    Ok(candidate.join(&rel))
}

/// Apply `op` between a stored leaf and a literal.
pub(crate) fn matches_op(stored: &LeafValue, op: Op, literal: &Value) -> bool {
    match op {
        Op::Eq => scalars_equal(stored, literal),
        Op::Neq => !scalars_equal(stored, literal),
        Op::Lt | Op::Gt | Op::Lte | Op::Gte => match scalars_compare(stored, literal) {
            Some(ordering) => match op {
                Op::Lt => ordering.is_lt(),
                Op::Gt => ordering.is_gt(),
                Op::Lte => ordering.is_le(),
                Op::Gte => ordering.is_ge(),
                Op::Eq | Op::Neq => unreachable!("handled above"),
            },
            // Incomparable types never match an ordering operator.
            None => false,
        },
    }
}

/// Equality across compatible scalar types only.
fn scalars_equal(stored: &LeafValue, literal: &Value) -> bool {
    match (stored, literal) {
        (LeafValue::Null, Value::Null) => true,
        (LeafValue::Bool(a), Value::Bool(b)) => a == b,
        (LeafValue::String(a), Value::String(b)) => a == b,
        (LeafValue::Number(text), Value::Number(n)) => {
            numbers_compare(text, n).map_or(false, |ordering| ordering.is_eq())
        }
        _ => false,
    }
}

/// Ordering across compatible scalar types; `None` for mismatches.
fn scalars_compare(stored: &LeafValue, literal: &Value) -> Option<std::cmp::Ordering> {
    match (stored, literal) {
        (LeafValue::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (LeafValue::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (LeafValue::Number(text), Value::Number(n)) => numbers_compare(text, n),
        _ => None,
    }
}

/// Compare a stored number literal with a filter literal.
///
/// Prefers the order-preserving codec encoding (exact for plain decimals of
/// any precision); falls back to f64 for exponent-form literals.
fn numbers_compare(stored: &str, literal: &serde_json::Number) -> Option<std::cmp::Ordering> {
    let literal_text = literal.to_string();
    match (
        codec::encode_decimal(stored),
        codec::encode_decimal(&literal_text),
    ) {
        (Ok(a), Ok(b)) => Some(a.cmp(&b)),
        _ => {
            let a = stored.parse::<f64>().ok()?;
            let b = literal.as_f64()?;
            a.partial_cmp(&b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === Scalar comparisons ===

    #[test]
    fn test_string_equality() {
        let stored = LeafValue::String("u2".into());
        assert!(matches_op(&stored, Op::Eq, &json!("u2")));
        assert!(!matches_op(&stored, Op::Eq, &json!("u3")));
        assert!(matches_op(&stored, Op::Neq, &json!("u3")));
    }

    #[test]
    fn test_string_ordering() {
        let stored = LeafValue::String("u2".into());
        assert!(matches_op(&stored, Op::Lt, &json!("u3")));
        assert!(matches_op(&stored, Op::Gte, &json!("u2")));
        assert!(!matches_op(&stored, Op::Gt, &json!("u2")));
    }

    #[test]
    fn test_number_ordering_is_numeric_not_textual() {
        let stored = LeafValue::Number("9".into());
        // "9" > "10" textually, but 9 < 10 numerically.
        assert!(matches_op(&stored, Op::Lt, &json!(10)));
        assert!(!matches_op(&stored, Op::Gt, &json!(10)));
    }

    #[test]
    fn test_number_equality_across_representations() {
        let stored = LeafValue::Number("10".into());
        assert!(matches_op(&stored, Op::Eq, &json!(10)));
        assert!(matches_op(&stored, Op::Lte, &json!(10)));
        assert!(matches_op(&stored, Op::Gte, &json!(10)));
        assert!(!matches_op(&stored, Op::Neq, &json!(10)));
    }

    #[test]
    fn test_decimal_ordering() {
        let stored = LeafValue::Number("3.52".into());
        assert!(matches_op(&stored, Op::Gt, &json!(3.5)));
        assert!(matches_op(&stored, Op::Lt, &json!(25)));
    }

    #[test]
    fn test_bool_ordering() {
        let stored = LeafValue::Bool(false);
        assert!(matches_op(&stored, Op::Lt, &json!(true)));
        assert!(matches_op(&stored, Op::Eq, &json!(false)));
    }

    #[test]
    fn test_null_equality_only() {
        assert!(matches_op(&LeafValue::Null, Op::Eq, &json!(null)));
        assert!(!matches_op(&LeafValue::Null, Op::Lt, &json!(null)));
    }

    #[test]
    fn test_type_mismatch_never_matches_ordering() {
        let stored = LeafValue::String("10".into());
        assert!(!matches_op(&stored, Op::Lt, &json!(11)));
        assert!(!matches_op(&stored, Op::Gt, &json!(9)));
        // Eq across mismatched types is simply unequal.
        assert!(!matches_op(&stored, Op::Eq, &json!(10)));
        assert!(matches_op(&stored, Op::Neq, &json!(10)));
    }

    // === Evaluation against a backend ===

    use std::sync::Arc;
    use strand_core::flatten::flatten;
    use strand_storage::{Batch, MemoryBackend};

    fn seeded_backend() -> Arc<MemoryBackend> {
        let backend = Arc::new(MemoryBackend::new());
        let base = DbPath::parse("/items/a").unwrap();
        let records = flatten(&base, &json!({"tag": "x", "n": 1})).unwrap();
        backend.apply(Batch::new().insert_all(records)).unwrap();
        backend
    }

    #[test]
    fn test_evaluate_child_filter() {
        let backend = seeded_backend();
        let candidate = DbPath::parse("/items/a").unwrap();
        let matched = evaluate(
            backend.as_ref(),
            &candidate,
            &Filter::child("tag", Op::Eq, "x"),
        )
        .unwrap();
        assert!(matched);
    }

    #[test]
    fn test_evaluate_missing_target() {
        let backend = seeded_backend();
        let candidate = DbPath::parse("/items/a").unwrap();
        assert!(!evaluate(
            backend.as_ref(),
            &candidate,
            &Filter::child("missing", Op::Eq, "x"),
        )
        .unwrap());
        // Absence matches Neq.
        assert!(evaluate(
            backend.as_ref(),
            &candidate,
            &Filter::child("missing", Op::Neq, "x"),
        )
        .unwrap());
    }

    #[test]
    fn test_evaluate_nested_relative_path() {
        let backend = Arc::new(MemoryBackend::new());
        let base = DbPath::parse("/items/a").unwrap();
        let records = flatten(&base, &json!({"meta": {"level": 3}})).unwrap();
        backend.apply(Batch::new().insert_all(records)).unwrap();

        let candidate = DbPath::parse("/items/a").unwrap();
        assert!(evaluate(
            backend.as_ref(),
            &candidate,
            &Filter::child("meta/level", Op::Gte, 3),
        )
        .unwrap());
    }

    #[test]
    fn test_evaluate_candidate_inside_array() {
        // Array-element candidates carry encoded index segments, which must
        // survive child-path resolution untouched.
        let backend = Arc::new(MemoryBackend::new());
        let base = DbPath::parse("/items/0").unwrap();
        assert_eq!(base.as_str(), "/items/[0/");
        let records = flatten(&base, &json!({"tag": "x"})).unwrap();
        backend.apply(Batch::new().insert_all(records)).unwrap();

        assert!(evaluate(
            backend.as_ref(),
            &base,
            &Filter::child("tag", Op::Eq, "x"),
        )
        .unwrap());
    }

    #[test]
    fn test_evaluate_logical_short_circuit_semantics() {
        let backend = seeded_backend();
        let candidate = DbPath::parse("/items/a").unwrap();

        let both = Filter::and([
            Filter::child("tag", Op::Eq, "x"),
            Filter::child("n", Op::Gt, 0),
        ]);
        assert!(evaluate(backend.as_ref(), &candidate, &both).unwrap());

        let either = Filter::or([
            Filter::child("tag", Op::Eq, "nope"),
            Filter::child("n", Op::Eq, 1),
        ]);
        assert!(evaluate(backend.as_ref(), &candidate, &either).unwrap());

        let neither = Filter::or([
            Filter::child("tag", Op::Eq, "nope"),
            Filter::child("n", Op::Eq, 99),
        ]);
        assert!(!evaluate(backend.as_ref(), &candidate, &neither).unwrap());
    }

    #[test]
    fn test_empty_logical_filters() {
        let backend = seeded_backend();
        let candidate = DbPath::parse("/items/a").unwrap();
        assert!(evaluate(backend.as_ref(), &candidate, &Filter::and([])).unwrap());
        assert!(!evaluate(backend.as_ref(), &candidate, &Filter::or([])).unwrap());
    }
}
