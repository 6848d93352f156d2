//! Runtime value types for field comparison.
//!
//! The [`Value`] enum is the type-erased value produced when a field path is
//! resolved against a record, or when a filter literal is evaluated. It
//! borrows from the record (and from the filter AST), so resolution never
//! clones record data.

use std::cmp::Ordering;
use std::fmt;

use crate::record::{records_equal, Record};

/// Runtime value for comparison, borrowed from the source record.
///
/// Lists come from repeated fields and maps from map fields; both are kept
/// as flat vectors so evaluation can dispatch over them uniformly.
///
/// # Example
///
/// ```
/// use aip_query::{Number, Value};
///
/// let pages = Value::Number(Number::U64(320));
/// assert!(pages.is_number());
/// assert_eq!(pages, Value::Number(Number::F64(320.0)));
/// ```
#[derive(Clone)]
pub enum Value<'a> {
    /// Absent value: an unset embedded record, or a missing list element.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value (borrowed).
    String(&'a str),
    /// Elements of a repeated field.
    List(Vec<Value<'a>>),
    /// Key/value pairs of a map field.
    Map(Vec<(Value<'a>, Value<'a>)>),
    /// An embedded record.
    Record(&'a dyn Record),
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if this is a `String` value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Returns `true` if this is a `Number` value.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Returns `true` if this is a `Bool` value.
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the embedded record, if present.
    pub fn as_record(&self) -> Option<&'a dyn Record> {
        match self {
            Value::Record(r) => Some(*r),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
        }
    }
}

impl PartialEq for Value<'_> {
    /// Numbers compare numerically across variants, records structurally,
    /// and maps as unordered sets of pairs. Mismatched variants are unequal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|pair| b.contains(pair))
            }
            (Value::Record(a), Value::Record(b)) => records_equal(*a, *b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(pairs) => f
                .debug_map()
                .entries(pairs.iter().map(|(k, v)| (k, v)))
                .finish(),
            Value::Record(r) => write!(f, "Record({})", r.descriptor().name()),
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
///
/// Comparisons between different numeric types widen to a common
/// representation, so `I64(5)`, `U64(5)` and `F64(5.0)` are all equal.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns the value as `i64` when it is integral and in range.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::I64(n) => Some(n),
            Number::U64(n) => i64::try_from(n).ok(),
            Number::F64(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 => {
                Some(n as i64)
            }
            Number::F64(_) => None,
        }
    }

    /// Returns the value as `u64` when it is integral and non-negative.
    pub fn as_u64(self) -> Option<u64> {
        match self {
            Number::I64(n) => u64::try_from(n).ok(),
            Number::U64(n) => Some(n),
            Number::F64(n) if n.fract() == 0.0 && n >= 0.0 && n <= u64::MAX as f64 => {
                Some(n as u64)
            }
            Number::F64(_) => None,
        }
    }

    /// Returns `true` for a floating point NaN.
    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            // Same type comparisons
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),

            // Mixed integers stay exact
            (Number::I64(a), Number::U64(b)) => Some(match u64::try_from(a) {
                Ok(a) => a.cmp(&b),
                Err(_) => Ordering::Less,
            }),
            (Number::U64(_), Number::I64(_)) => other.compare(self).map(Ordering::reverse),

            // Anything involving a float widens to f64
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total ordering used for sorting: NaN sorts after every number.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.compare(*other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

macro_rules! number_from {
    ($($ty:ty => $variant:ident as $wide:ty),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number::$variant(n as $wide)
                }
            }
        )*
    };
}

number_from! {
    i8 => I64 as i64,
    i16 => I64 as i64,
    i32 => I64 as i64,
    i64 => I64 as i64,
    isize => I64 as i64,
    u8 => U64 as u64,
    u16 => U64 as u64,
    u32 => U64 as u64,
    u64 => U64 as u64,
    usize => U64 as u64,
    f32 => F64 as f64,
    f64 => F64 as f64,
}
