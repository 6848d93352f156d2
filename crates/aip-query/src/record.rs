//! Schema introspection for structured records.
//!
//! Everything in this crate is written against three traits:
//!
//! - [`Record`]: a struct whose fields can be listed and looked up by name
//! - [`FieldType`]: a single field, viewed as a borrowed [`Value`]
//! - [`Element`]: something that can sit inside a repeated or map field
//!
//! Most users never implement these by hand; `#[derive(Record)]` does it.
//! Manual implementations follow the same shape:
//!
//! ```
//! use std::sync::OnceLock;
//! use aip_query::{FieldDescriptor, FieldType, Record, Schema};
//!
//! #[derive(Default)]
//! struct Shelf {
//!     label: String,
//!     capacity: u32,
//! }
//!
//! impl Record for Shelf {
//!     fn schema() -> &'static Schema {
//!         static SCHEMA: OnceLock<Schema> = OnceLock::new();
//!         SCHEMA.get_or_init(|| {
//!             Schema::new(
//!                 "Shelf",
//!                 vec![
//!                     FieldDescriptor::of::<String>("label"),
//!                     FieldDescriptor::of::<u32>("capacity"),
//!                 ],
//!             )
//!         })
//!     }
//!
//!     fn descriptor(&self) -> &'static Schema {
//!         Self::schema()
//!     }
//!
//!     fn field(&self, name: &str) -> Option<&dyn FieldType> {
//!         match name {
//!             "label" => Some(&self.label),
//!             "capacity" => Some(&self.capacity),
//!             _ => None,
//!         }
//!     }
//!
//!     fn field_mut(&mut self, name: &str) -> Option<&mut dyn FieldType> {
//!         match name {
//!             "label" => Some(&mut self.label),
//!             "capacity" => Some(&mut self.capacity),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! assert_eq!(Shelf::schema().fields().len(), 2);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::value::{Number, Value};

/// The scalar or record type stored in a field.
#[derive(Clone, Copy)]
pub enum Kind {
    Bool,
    /// Signed integers (`i32`, `i64`).
    Int,
    /// Unsigned integers (`u32`, `u64`).
    Uint,
    /// Floating point (`f32`, `f64`).
    Float,
    String,
    /// An embedded record. The schema is reached through a function so that
    /// self-referential schemas stay finite.
    Record(fn() -> &'static Schema),
}

impl Kind {
    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Record(_) => "record",
        }
    }

    /// The value an unset field of this kind reads as.
    pub fn zero(self) -> Value<'static> {
        match self {
            Kind::Bool => Value::Bool(false),
            Kind::Int => Value::Number(Number::I64(0)),
            Kind::Uint => Value::Number(Number::U64(0)),
            Kind::Float => Value::Number(Number::F64(0.0)),
            Kind::String => Value::String(""),
            Kind::Record(_) => Value::Null,
        }
    }

    /// Schema of an embedded record kind.
    pub fn schema(self) -> Option<&'static Schema> {
        match self {
            Kind::Record(schema) => Some(schema()),
            _ => None,
        }
    }

    pub fn is_record(self) -> bool {
        matches!(self, Kind::Record(_))
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Kind::Record(a), Kind::Record(b)) => a().name() == b().name(),
            _ => self.name() == other.name(),
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Record(schema) => write!(f, "Record({})", schema().name()),
            other => f.write_str(other.name()),
        }
    }
}

/// How many values a field holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cardinality {
    Singular,
    Repeated,
    /// A key/value map; carries the key kind.
    Map(Kind),
}

/// Static description of one field of a record type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: Kind,
    pub cardinality: Cardinality,
}

impl FieldDescriptor {
    /// Describes a field of Rust type `T`.
    pub fn of<T: FieldType>(name: &'static str) -> Self {
        FieldDescriptor {
            name,
            kind: T::kind(),
            cardinality: T::cardinality(),
        }
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    pub fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map(_))
    }
}

/// The fields of a record type, in declaration order.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new(name: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Schema { name, fields }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A structured record whose fields can be inspected by name.
///
/// Implemented by `#[derive(Record)]`. The trait is object safe; the
/// evaluator works on `&dyn Record` so that nested records of different
/// types can be walked uniformly.
pub trait Record {
    /// Schema of this record type.
    fn schema() -> &'static Schema
    where
        Self: Sized;

    /// Schema of this instance. Always `Self::schema()`.
    fn descriptor(&self) -> &'static Schema;

    /// Borrows a field by name.
    fn field(&self, name: &str) -> Option<&dyn FieldType>;

    /// Mutably borrows a field by name.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn FieldType>;
}

/// A single field of a record.
pub trait FieldType {
    fn kind() -> Kind
    where
        Self: Sized;

    fn cardinality() -> Cardinality
    where
        Self: Sized,
    {
        Cardinality::Singular
    }

    /// Borrowed view of the field's contents.
    fn value(&self) -> Value<'_>;

    /// Whether the field holds a non-default value.
    fn is_set(&self) -> bool;

    /// Overwrites a scalar field. `Value::Null` resets to the zero value.
    fn assign(&mut self, value: &Value<'_>) -> Result<()>;

    /// The embedded record, created with its default if absent.
    ///
    /// `None` for fields that do not hold a single record.
    fn record_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }
}

/// A value that can appear inside a repeated or map field.
pub trait Element {
    fn element_kind() -> Kind
    where
        Self: Sized;

    fn element_value(&self) -> Value<'_>;
}

/// Structural equality of two records: same schema, equal field values.
pub fn records_equal(a: &dyn Record, b: &dyn Record) -> bool {
    let schema = a.descriptor();
    if schema.name() != b.descriptor().name() {
        return false;
    }
    schema.fields().iter().all(|desc| {
        let lhs = a.field(desc.name).map(|f| f.value());
        let rhs = b.field(desc.name).map(|f| f.value());
        lhs == rhs
    })
}

fn mismatch(expected: &'static str, actual: &Value<'_>) -> Error {
    Error::TypeMismatch {
        expected,
        actual: actual.type_name(),
    }
}

impl FieldType for bool {
    fn kind() -> Kind {
        Kind::Bool
    }

    fn value(&self) -> Value<'_> {
        Value::Bool(*self)
    }

    fn is_set(&self) -> bool {
        *self
    }

    fn assign(&mut self, value: &Value<'_>) -> Result<()> {
        *self = match value {
            Value::Bool(b) => *b,
            Value::Null => false,
            other => return Err(mismatch("bool", other)),
        };
        Ok(())
    }
}

impl FieldType for String {
    fn kind() -> Kind {
        Kind::String
    }

    fn value(&self) -> Value<'_> {
        Value::String(self)
    }

    fn is_set(&self) -> bool {
        !self.is_empty()
    }

    fn assign(&mut self, value: &Value<'_>) -> Result<()> {
        match value {
            Value::String(s) => {
                self.clear();
                self.push_str(s);
            }
            Value::Null => self.clear(),
            other => return Err(mismatch("string", other)),
        }
        Ok(())
    }
}

macro_rules! integer_field {
    ($($ty:ty => $kind:ident via $view:ident),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn kind() -> Kind {
                    Kind::$kind
                }

                fn value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }

                fn is_set(&self) -> bool {
                    *self != 0
                }

                fn assign(&mut self, value: &Value<'_>) -> Result<()> {
                    *self = match value {
                        Value::Number(n) => n
                            .$view()
                            .and_then(|v| <$ty>::try_from(v).ok())
                            .ok_or_else(|| mismatch(stringify!($ty), value))?,
                        Value::Null => 0,
                        other => return Err(mismatch(stringify!($ty), other)),
                    };
                    Ok(())
                }
            }
        )*
    };
}

integer_field! {
    i32 => Int via as_i64,
    i64 => Int via as_i64,
    u32 => Uint via as_u64,
    u64 => Uint via as_u64,
}

macro_rules! float_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn kind() -> Kind {
                    Kind::Float
                }

                fn value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }

                fn is_set(&self) -> bool {
                    *self != 0.0
                }

                fn assign(&mut self, value: &Value<'_>) -> Result<()> {
                    *self = match value {
                        Value::Number(n) => n.to_f64() as $ty,
                        Value::Null => 0.0,
                        other => return Err(mismatch(stringify!($ty), other)),
                    };
                    Ok(())
                }
            }
        )*
    };
}

float_field!(f32, f64);

macro_rules! scalar_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                fn element_kind() -> Kind {
                    <$ty as FieldType>::kind()
                }

                fn element_value(&self) -> Value<'_> {
                    FieldType::value(self)
                }
            }
        )*
    };
}

scalar_element!(bool, String, i32, i64, u32, u64, f32, f64);

/// An optional embedded record; unset reads as `Value::Null`.
impl<T: Record + Default> FieldType for Option<T> {
    fn kind() -> Kind {
        Kind::Record(T::schema)
    }

    fn value(&self) -> Value<'_> {
        match self {
            Some(record) => Value::Record(record),
            None => Value::Null,
        }
    }

    fn is_set(&self) -> bool {
        self.is_some()
    }

    fn assign(&mut self, value: &Value<'_>) -> Result<()> {
        match value {
            Value::Null => {
                *self = None;
                Ok(())
            }
            other => Err(mismatch("record", other)),
        }
    }

    fn record_mut(&mut self) -> Option<&mut dyn Record> {
        Some(self.get_or_insert_with(T::default))
    }
}

impl<T: Element> FieldType for Vec<T> {
    fn kind() -> Kind {
        T::element_kind()
    }

    fn cardinality() -> Cardinality {
        Cardinality::Repeated
    }

    fn value(&self) -> Value<'_> {
        Value::List(self.iter().map(Element::element_value).collect())
    }

    fn is_set(&self) -> bool {
        !self.is_empty()
    }

    fn assign(&mut self, value: &Value<'_>) -> Result<()> {
        match value {
            Value::Null => {
                self.clear();
                Ok(())
            }
            other => Err(mismatch("list", other)),
        }
    }
}

impl<K: Element + Ord, V: Element> FieldType for BTreeMap<K, V> {
    fn kind() -> Kind {
        V::element_kind()
    }

    fn cardinality() -> Cardinality {
        Cardinality::Map(K::element_kind())
    }

    fn value(&self) -> Value<'_> {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.element_value(), v.element_value()))
                .collect(),
        )
    }

    fn is_set(&self) -> bool {
        !self.is_empty()
    }

    fn assign(&mut self, value: &Value<'_>) -> Result<()> {
        match value {
            Value::Null => {
                self.clear();
                Ok(())
            }
            other => Err(mismatch("map", other)),
        }
    }
}

impl<K: Element + Eq + Hash, V: Element> FieldType for HashMap<K, V> {
    fn kind() -> Kind {
        V::element_kind()
    }

    fn cardinality() -> Cardinality {
        Cardinality::Map(K::element_kind())
    }

    fn value(&self) -> Value<'_> {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.element_value(), v.element_value()))
                .collect(),
        )
    }

    fn is_set(&self) -> bool {
        !self.is_empty()
    }

    fn assign(&mut self, value: &Value<'_>) -> Result<()> {
        match value {
            Value::Null => {
                self.clear();
                Ok(())
            }
            other => Err(mismatch("map", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{Author, Book};

    #[test]
    fn schema_lists_fields_in_order() {
        let names: Vec<_> = Book::schema().fields().iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            [
                "name",
                "title",
                "author",
                "authors",
                "reviews",
                "items",
                "tags",
                "page_count",
                "rating",
                "in_print",
            ]
        );
    }

    #[test]
    fn descriptors_report_kind_and_cardinality() {
        let schema = Book::schema();

        let author = schema.field("author").unwrap();
        assert!(author.kind.is_record());
        assert_eq!(author.cardinality, Cardinality::Singular);
        assert_eq!(author.kind.schema().unwrap().name(), "Author");

        let authors = schema.field("authors").unwrap();
        assert!(authors.is_repeated());

        let reviews = schema.field("reviews").unwrap();
        assert_eq!(reviews.cardinality, Cardinality::Map(Kind::String));
        assert_eq!(reviews.kind, Kind::String);

        let items = schema.field("items").unwrap();
        assert_eq!(items.cardinality, Cardinality::Map(Kind::Int));

        assert_eq!(schema.field("rating").unwrap().kind, Kind::Float);
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn zero_values() {
        assert_eq!(Kind::String.zero(), Value::String(""));
        assert_eq!(Kind::Int.zero(), Value::Number(Number::I64(0)));
        assert_eq!(Kind::Bool.zero(), Value::Bool(false));
        assert!(Kind::Record(Author::schema).zero().is_null());
    }

    #[test]
    fn scalar_assignment() {
        let mut book = Book::default();
        book.field_mut("title")
            .unwrap()
            .assign(&Value::String("Dune"))
            .unwrap();
        book.field_mut("page_count")
            .unwrap()
            .assign(&Value::Number(Number::U64(412)))
            .unwrap();
        book.field_mut("rating")
            .unwrap()
            .assign(&Value::Number(Number::I64(4)))
            .unwrap();

        assert_eq!(book.title, "Dune");
        assert_eq!(book.page_count, 412);
        assert_eq!(book.rating, 4.0);
    }

    #[test]
    fn assignment_rejects_wrong_type() {
        let mut book = Book::default();
        let err = book
            .field_mut("page_count")
            .unwrap()
            .assign(&Value::String("many"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: "i64",
                actual: "string"
            }
        ));
    }

    #[test]
    fn record_mut_creates_missing_child() {
        let mut book = Book::default();
        assert!(book.author.is_none());

        let author = book.field_mut("author").unwrap().record_mut().unwrap();
        author
            .field_mut("family_name")
            .unwrap()
            .assign(&Value::String("Herbert"))
            .unwrap();

        assert_eq!(book.author.unwrap().family_name, "Herbert");
    }

    #[test]
    fn presence() {
        let book = Book {
            title: "Dune".into(),
            ..Book::default()
        };
        assert!(book.field("title").unwrap().is_set());
        assert!(!book.field("author").unwrap().is_set());
        assert!(!book.field("tags").unwrap().is_set());
        assert!(!book.field("page_count").unwrap().is_set());
    }

    #[test]
    fn structural_equality() {
        let a = Book {
            title: "Dune".into(),
            author: Some(Author::new("Frank", "Herbert")),
            ..Book::default()
        };
        let mut b = a.clone();
        assert!(records_equal(&a, &b));

        b.author = Some(Author::new("Brian", "Herbert"));
        assert!(!records_equal(&a, &b));
        assert!(!records_equal(&a, &Author::default()));
    }
}
