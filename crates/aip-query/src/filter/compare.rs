//! Type-erased comparison of resolved values.

use crate::error::{Error, Result};
use crate::op::Op;
use crate::record::Record;
use crate::value::Value;

/// Applies `op` to two resolved values.
///
/// A list on either side (a repeated field, or a scatter through one)
/// matches if any element satisfies the comparison; an element whose
/// pairing is unsupported counts as a non-match.
pub(crate) fn compare_any(lhs: &Value<'_>, rhs: &Value<'_>, op: Op) -> Result<bool> {
    if let Value::List(items) = lhs {
        return Ok(items
            .iter()
            .any(|item| compare_any(item, rhs, op).unwrap_or(false)));
    }
    if let Value::List(items) = rhs {
        return Ok(items
            .iter()
            .any(|item| compare_any(lhs, item, op).unwrap_or(false)));
    }

    match op {
        _ if op.is_ordering_op() => ordered(lhs, rhs, op),
        Op::Has => Ok(has(lhs, rhs)),
        Op::Eq => Ok(lhs == rhs),
        _ => Ok(lhs != rhs),
    }
}

fn has(lhs: &Value<'_>, rhs: &Value<'_>) -> bool {
    match (lhs, rhs) {
        (Value::String(l), Value::String(r)) => l.contains(r),
        (Value::Map(pairs), _) => pairs
            .iter()
            .any(|(k, v)| k == rhs || v == rhs || contains(k, rhs) || contains(v, rhs)),
        _ => lhs == rhs,
    }
}

fn contains(value: &Value<'_>, needle: &Value<'_>) -> bool {
    matches!((value, needle), (Value::String(v), Value::String(n)) if v.contains(n))
}

fn ordered(lhs: &Value<'_>, rhs: &Value<'_>, op: Op) -> Result<bool> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => {
            Ok(a.compare(*b).map(|o| op.eval_ordering(o)).unwrap_or(false))
        }
        (Value::String(a), Value::String(b)) => Ok(op.eval_ordering(a.cmp(b))),
        _ => Err(Error::UnsupportedComparison {
            op: op.as_str(),
            lhs: lhs.type_name(),
            rhs: rhs.type_name(),
        }),
    }
}

/// Case-insensitive search for `term` (already lower-cased) in every string
/// reachable from `record`.
///
/// Walks singular and repeated records, repeated strings, and the string
/// keys and values of maps. Records stored as map values are not searched.
pub(crate) fn search(record: &dyn Record, term: &str) -> bool {
    record.descriptor().fields().iter().any(|desc| {
        record
            .field(desc.name)
            .is_some_and(|field| value_contains(&field.value(), term))
    })
}

fn value_contains(value: &Value<'_>, term: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(term),
        Value::Record(r) => search(*r, term),
        Value::List(items) => items.iter().any(|item| value_contains(item, term)),
        Value::Map(pairs) => pairs
            .iter()
            .any(|(k, v)| string_contains(k, term) || string_contains(v, term)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

fn string_contains(value: &Value<'_>, term: &str) -> bool {
    matches!(value, Value::String(s) if s.to_lowercase().contains(term))
}
