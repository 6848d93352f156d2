//! Proc macros for aip-query.
//!
//! - [`Record`] - Implement record introspection for a struct with named fields

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `Record`, `Element` and `FieldType` for a struct.
///
/// Every named field becomes a queryable field. Field types must implement
/// `aip_query::FieldType`: `bool`, `String`, the integer and float
/// primitives, `Option<R>`, `Vec<T>`, `BTreeMap<K, V>`, `HashMap<K, V>`, or
/// another struct deriving `Record`.
///
/// # Container Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `name = "..."` | Schema name (default: the struct name) |
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `skip` | Exclude this field from queries |
/// | `rename = "..."` | Use a custom name in filter and order paths |
///
/// # Generated Code
///
/// 1. `Record`, with a lazily built `Schema` in declaration order
/// 2. `Element`, so the struct can be held in `Vec` and map fields
/// 3. `FieldType`, so the struct can be embedded directly in another record
///
/// # Example
///
/// ```ignore
/// use aip_query::{compile_filter, Record};
///
/// #[derive(Record, Default)]
/// #[record(name = "library.Book")]
/// struct Book {
///     #[record(rename = "title")]
///     display_title: String,
///     page_count: i64,
///     #[record(skip)]
///     cache_key: u64,
/// }
///
/// let predicate = compile_filter::<Book>("title = \"Dune\"").unwrap();
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
