//! Schema-driven field path resolution.
//!
//! Resolution walks a record one segment at a time, guided by the schema
//! rather than the instance, so that absent data (an unset embedded record,
//! an empty repeated field) still has its remaining path checked. The rules:
//!
//! - map fields are returned whole and cannot be descended into
//! - repeated fields are returned whole, or, when the path continues, each
//!   element is resolved independently ("scatter") into a `Value::List`
//! - an unset embedded record resolves the rest of the path to the zero
//!   value of the leaf
//! - scalars cannot be descended into

use crate::error::{Error, Result};
use crate::record::{Cardinality, Kind, Record, Schema};
use crate::value::Value;

/// Resolves a filter comparable against a record.
///
/// A single segment that names no field is a literal: `true` and `false`
/// become booleans, anything else the segment text itself. A longer path
/// with an unknown head is an error.
pub(crate) fn resolve_member<'a>(record: &'a dyn Record, segments: &'a [String]) -> Result<Value<'a>> {
    let Some(head) = segments.first() else {
        return Err(Error::field_path("", "empty path"));
    };
    let schema = record.descriptor();
    if schema.field(head).is_none() {
        if segments.len() == 1 {
            return Ok(literal(head));
        }
        return Err(Error::field_path(
            segments.join("."),
            format!("unknown top-level field {head:?}"),
        ));
    }
    walk(Some(record), schema, segments, 0)
}

/// Resolves a path that must name a field, against a possibly absent record.
pub(crate) fn resolve_path<'a>(
    record: Option<&'a dyn Record>,
    schema: &'static Schema,
    segments: &[String],
) -> Result<Value<'a>> {
    if segments.is_empty() {
        return Err(Error::field_path("", "empty path"));
    }
    walk(record, schema, segments, 0)
}

fn literal(text: &str) -> Value<'_> {
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text),
    }
}

fn walk<'a>(
    record: Option<&'a dyn Record>,
    schema: &'static Schema,
    segments: &[String],
    at: usize,
) -> Result<Value<'a>> {
    let name = &segments[at];
    let path = || segments.join(".");
    let desc = schema
        .field(name)
        .ok_or_else(|| Error::field_path(path(), format!("no field {name:?} on {}", schema.name())))?;
    let descends = at + 1 < segments.len();
    let field = record.and_then(|r| r.field(name));

    match desc.cardinality {
        Cardinality::Map(_) => {
            if descends {
                return Err(Error::field_path(
                    path(),
                    format!("cannot descend into map field {name:?}"),
                ));
            }
            Ok(field.map(|f| f.value()).unwrap_or(Value::Map(Vec::new())))
        }
        Cardinality::Repeated => {
            if !descends {
                return Ok(field.map(|f| f.value()).unwrap_or(Value::List(Vec::new())));
            }
            let Kind::Record(child) = desc.kind else {
                return Err(Error::field_path(
                    path(),
                    format!("cannot descend into repeated scalar field {name:?}"),
                ));
            };
            let child = child();
            // Check the remaining path even when there are no elements.
            walk(None, child, segments, at + 1)?;

            let items = match field.map(|f| f.value()) {
                Some(Value::List(items)) => items,
                _ => Vec::new(),
            };
            let scattered = items
                .into_iter()
                .map(|item| match item {
                    Value::Record(r) => walk(Some(r), child, segments, at + 1).unwrap_or(Value::Null),
                    _ => Value::Null,
                })
                .collect();
            Ok(Value::List(scattered))
        }
        Cardinality::Singular => match desc.kind {
            Kind::Record(child) => {
                if !descends {
                    return Ok(field.map(|f| f.value()).unwrap_or(Value::Null));
                }
                let nested = field
                    .filter(|f| f.is_set())
                    .and_then(|f| f.value().as_record());
                walk(nested, child(), segments, at + 1)
            }
            kind => {
                if descends {
                    return Err(Error::field_path(
                        path(),
                        format!("cannot descend into scalar field {name:?}"),
                    ));
                }
                Ok(field.map(|f| f.value()).unwrap_or_else(|| kind.zero()))
            }
        },
    }
}

/// Checks that a path can serve as a sort key and returns the leaf kind.
///
/// Sort keys may only pass through singular record fields and must end at a
/// singular scalar.
pub(crate) fn validate_sort_path(schema: &'static Schema, segments: &[String]) -> Result<Kind> {
    let path = || segments.join(".");
    let mut schema = schema;
    for (at, name) in segments.iter().enumerate() {
        let desc = schema
            .field(name)
            .ok_or_else(|| Error::field_path(path(), format!("no field {name:?} on {}", schema.name())))?;
        match desc.cardinality {
            Cardinality::Repeated => {
                return Err(Error::field_path(
                    path(),
                    format!("repeated field {name:?} cannot be a sort key"),
                ))
            }
            Cardinality::Map(_) => {
                return Err(Error::field_path(
                    path(),
                    format!("map field {name:?} cannot be a sort key"),
                ))
            }
            Cardinality::Singular => {}
        }
        let last = at + 1 == segments.len();
        match (desc.kind, last) {
            (Kind::Record(_), true) => {
                return Err(Error::UnsupportedComparison {
                    op: "order_by",
                    lhs: "record",
                    rhs: "record",
                })
            }
            (Kind::Record(child), false) => schema = child(),
            (kind, true) => return Ok(kind),
            (_, false) => {
                return Err(Error::field_path(
                    path(),
                    format!("cannot descend into scalar field {name:?}"),
                ))
            }
        }
    }
    Err(Error::field_path(path(), "empty path"))
}

/// Reads a validated sort key; absent values read as the zero of `kind`.
pub(crate) fn sort_key<'a>(record: &'a dyn Record, segments: &[String], kind: Kind) -> Value<'a> {
    match resolve_path(Some(record), record.descriptor(), segments) {
        Ok(Value::Null) | Err(_) => kind.zero(),
        Ok(value) => value,
    }
}
