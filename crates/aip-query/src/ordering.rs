//! Ordering: AIP-132 `order_by` strings and compiled comparators.
//!
//! Provides [`Dir`] for sort direction, [`OrderBy`] for one key, [`Order`]
//! for a parsed `order_by` string and [`Comparator`] for an order validated
//! against a record type.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::path::FieldPath;
use crate::record::{Kind, Record};
use crate::resolve::{sort_key, validate_sort_path};
use crate::value::Value;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }

    fn parse(word: &str) -> Option<Dir> {
        if word.eq_ignore_ascii_case("asc") {
            Some(Dir::Asc)
        } else if word.eq_ignore_ascii_case("desc") {
            Some(Dir::Desc)
        } else {
            None
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ordering key: a field path and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// The field to sort by.
    pub field: FieldPath,
    /// The sort direction.
    pub dir: Dir,
}

impl OrderBy {
    /// Creates an ascending key.
    pub fn asc(field: FieldPath) -> Self {
        OrderBy {
            field,
            dir: Dir::Asc,
        }
    }

    /// Creates a descending key.
    pub fn desc(field: FieldPath) -> Self {
        OrderBy {
            field,
            dir: Dir::Desc,
        }
    }

    /// Creates a key with the given direction.
    pub fn new(field: FieldPath, dir: Dir) -> Self {
        OrderBy { field, dir }
    }

    /// `path:asc` or `path:desc`.
    fn canonical(&self) -> String {
        format!("{}:{}", self.field, self.dir)
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dir {
            Dir::Asc => write!(f, "{}", self.field),
            Dir::Desc => write!(f, "{} desc", self.field),
        }
    }
}

/// An ordered list of keys with no field path repeated.
///
/// # Example
///
/// ```
/// use aip_query::{Dir, Order};
///
/// let order = Order::parse("author.family_name, title desc").unwrap();
/// assert_eq!(order.keys().len(), 2);
/// assert_eq!(order.keys()[1].dir, Dir::Desc);
/// assert_eq!(order.canonical_text(), "author.family_name:asc|title:desc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Order {
    keys: Vec<OrderBy>,
}

impl Order {
    /// Builds an order from keys, rejecting repeated field paths.
    pub fn new(keys: Vec<OrderBy>) -> Result<Self> {
        let mut seen = HashSet::new();
        for key in &keys {
            if !seen.insert(&key.field) {
                return Err(Error::InvalidOrderBy {
                    message: format!("field appears in order_by multiple times: {:?}", key.field.to_string()),
                });
            }
        }
        Ok(Order { keys })
    }

    /// Parses a comma-separated `field.path [asc|desc]` list.
    ///
    /// Blank input yields an empty order.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Order::default());
        }
        let keys = text
            .split(',')
            .map(parse_key)
            .collect::<Result<Vec<_>>>()?;
        Order::new(keys)
    }

    pub fn keys(&self) -> &[OrderBy] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Appends every key of `default` whose field is not already ordered on.
    ///
    /// Keys of `self` keep their position and direction; appended keys keep
    /// their relative order.
    pub fn merge_with_default(&self, default: &Order) -> Order {
        let named: HashSet<&FieldPath> = self.keys.iter().map(|k| &k.field).collect();
        let mut keys = self.keys.clone();
        keys.extend(
            default
                .keys
                .iter()
                .filter(|k| !named.contains(&k.field))
                .cloned(),
        );
        Order { keys }
    }

    /// Deterministic text that identifies this order: `path:dir` joined by `|`.
    pub fn canonical_text(&self) -> String {
        self.keys
            .iter()
            .map(OrderBy::canonical)
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Validates the order against `R` and returns a comparator.
    pub fn comparator<R: Record>(&self) -> Result<Comparator<R>> {
        let schema = R::schema();
        let keys = self
            .keys
            .iter()
            .map(|key| {
                let kind = validate_sort_path(schema, key.field.segments())?;
                Ok(SortKey {
                    segments: key.field.segments().to_vec(),
                    dir: key.dir,
                    kind,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(order = %self, record = schema.name(), "compiled order");
        Ok(Comparator {
            keys,
            _record: PhantomData,
        })
    }
}

fn parse_key(item: &str) -> Result<OrderBy> {
    let invalid = |message: String| Error::InvalidOrderBy { message };
    let words: Vec<&str> = item.split_whitespace().collect();
    let (path, dir) = match words.as_slice() {
        [] => return Err(invalid("empty order_by item".into())),
        [path] => (*path, Dir::Asc),
        [path, dir] => {
            let dir = Dir::parse(dir)
                .ok_or_else(|| invalid(format!("unknown direction {dir:?} for {path}")))?;
            (*path, dir)
        }
        _ => {
            return Err(invalid(format!(
                "expected \"field [asc|desc]\", got {:?}",
                item.trim()
            )))
        }
    };
    let field = FieldPath::parse(path).map_err(|e| invalid(e.to_string()))?;
    Ok(OrderBy { field, dir })
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Order::parse(s)
    }
}

#[derive(Debug, Clone)]
struct SortKey {
    segments: Vec<String>,
    dir: Dir,
    kind: Kind,
}

/// A multi-key comparator over records of type `R`.
///
/// Keys are compared in order; the first non-equal key decides. Missing
/// values (an unset embedded record on the path) compare as the zero value
/// of the leaf type.
pub struct Comparator<R> {
    keys: Vec<SortKey>,
    _record: PhantomData<fn(&R, &R) -> Ordering>,
}

impl<R: Record> Comparator<R> {
    /// Three-way comparison of two records.
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        for key in &self.keys {
            let av = sort_key(a, &key.segments, key.kind);
            let bv = sort_key(b, &key.segments, key.kind);
            let ordering = key.dir.apply(compare_values(&av, &bv));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Returns `true` if `a` sorts strictly before `b`.
    pub fn less(&self, a: &R, b: &R) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Stable in-place sort.
    pub fn sort(&self, records: &mut [R]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

impl<R> Clone for Comparator<R> {
    fn clone(&self) -> Self {
        Comparator {
            keys: self.keys.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Comparator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.keys.iter().map(|k| (k.segments.join("."), k.dir)))
            .finish()
    }
}

/// Total order over sort key values.
///
/// Numbers compare numerically with NaN last, strings lexicographically by
/// bytes, `false` before `true`. `Null` sorts first; any other pairing of
/// different kinds is treated as equal.
pub fn compare_values(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),

        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,

        _ => Ordering::Equal,
    }
}
