//! AIP query semantics over schema-described records.
//!
//! This crate implements the query conventions of Google's API Improvement
//! Proposals for resource list methods:
//!
//! - **Filtering** ([AIP-160]): a small expression language with `AND`,
//!   `OR`, `NOT`, parentheses, the comparators `= != > < >= <= :` and bare
//!   "global" search terms
//! - **Ordering** ([AIP-132]): `order_by` strings compiled into multi-key
//!   comparators, or rendered as SQL `ORDER BY` clauses
//! - **Pagination** ([AIP-158]): encrypted page tokens bound to the order
//!   and a caller context, plus the "after this cursor" predicate
//!
//! Everything works against the [`Record`] trait, which lists a type's
//! fields and lets them be read by name. `#[derive(Record)]` implements it
//! for plain structs.
//!
//! [AIP-160]: https://google.aip.dev/160
//! [AIP-132]: https://google.aip.dev/132
//! [AIP-158]: https://google.aip.dev/158
//!
//! # Quick Start
//!
//! ```rust
//! use aip_query::{compile_filter, Order, Record};
//!
//! #[derive(Record, Default)]
//! struct Author {
//!     given_name: String,
//!     family_name: String,
//! }
//!
//! #[derive(Record, Default)]
//! struct Book {
//!     title: String,
//!     author: Option<Author>,
//!     authors: Vec<Author>,
//!     page_count: i64,
//! }
//!
//! let mut books = vec![
//!     Book {
//!         title: "The Pragmatic Programmer".into(),
//!         authors: vec![
//!             Author { given_name: "Andrew".into(), family_name: "Hunt".into() },
//!             Author { given_name: "David".into(), family_name: "Thomas".into() },
//!         ],
//!         page_count: 352,
//!         ..Default::default()
//!     },
//!     Book {
//!         title: "Refactoring".into(),
//!         author: Some(Author { given_name: "Martin".into(), family_name: "Fowler".into() }),
//!         page_count: 448,
//!         ..Default::default()
//!     },
//! ];
//!
//! // Repeated fields match if any element does.
//! let by_thomas = compile_filter::<Book>(r#"authors.family_name = "Thomas""#).unwrap();
//! assert_eq!(by_thomas.count(&books), 1);
//!
//! let longest_first = Order::parse("page_count desc").unwrap().comparator::<Book>().unwrap();
//! longest_first.sort(&mut books);
//! assert_eq!(books[0].title, "Refactoring");
//! ```
//!
//! # Filter Semantics
//!
//! | Form | Meaning |
//! |------|---------|
//! | `a = 1`, `a != "x"` | Equality; numbers compare across integer and float |
//! | `a > 1`, `a <= "m"` | Ordering; both sides numbers or both strings |
//! | `a : "x"` | Substring for strings, key or value for maps |
//! | `word` | Case-insensitive search across every string in the record |
//! | `a b`, `a AND b` | Both |
//! | `a OR b` | Either; binds tighter than `AND` |
//! | `NOT a`, `-a` | Negation |
//!
//! A path through a repeated record field yields one value per element and
//! the comparison holds if any element satisfies it. An unset embedded
//! record reads as the zero value of whatever is below it.
//!
//! # Errors
//!
//! Filters and orders are validated when compiled. Compiled predicates and
//! comparators never fail. Page token decoding reports every failure as
//! [`Error::InvalidPageToken`].

pub mod cursor;
mod error;
pub mod filter;
mod op;
pub mod ordering;
mod path;
mod record;
mod resolve;
pub mod sql;
mod value;

#[cfg(test)]
mod fixtures;

pub use cursor::{cursor_filter, project, Aead, AeadError, ChaChaAead, CursorCodec, CursorFilter};
pub use error::{Error, Result};
pub use filter::{compile_filter, parse_filter, Filter, Predicate};
pub use op::Op;
pub use ordering::{compare_values, Comparator, Dir, Order, OrderBy};
pub use path::FieldPath;
pub use record::{records_equal, Cardinality, Element, FieldDescriptor, FieldType, Kind, Record, Schema};
pub use sql::{quote_like, Column, Table};
pub use value::{Number, Value};

/// Derives [`Record`], [`Element`] and [`FieldType`] for a struct.
pub use aip_query_macros::Record;
