//! AIP-160 filtering.
//!
//! A filter string is parsed once into a [`Filter`] AST, then compiled
//! against a record type into a [`Predicate`]. Compilation evaluates the
//! whole AST against the type's default value to surface unknown fields and
//! unsupported comparisons up front; the compiled predicate never fails.
//!
//! # Example
//!
//! ```
//! use aip_query::{Filter, Record};
//!
//! #[derive(Record, Default)]
//! struct Book {
//!     title: String,
//!     page_count: i64,
//! }
//!
//! let books = vec![
//!     Book { title: "Dune".into(), page_count: 412 },
//!     Book { title: "Neuromancer".into(), page_count: 271 },
//! ];
//!
//! let predicate = Filter::parse("page_count > 300").unwrap().compile::<Book>().unwrap();
//! let long: Vec<_> = predicate.filter(&books);
//! assert_eq!(long.len(), 1);
//! assert_eq!(long[0].title, "Dune");
//!
//! // Bare words search every string field, case-insensitively.
//! let predicate = Filter::parse("neuro").unwrap().compile::<Book>().unwrap();
//! assert_eq!(predicate.count(&books), 1);
//! ```

mod ast;
mod compare;
mod eval;
mod lexer;
mod parser;

use std::fmt;
use std::marker::PhantomData;

pub use ast::{
    Comparable, Expression, Factor, Filter, Literal, Member, Restriction, Sequence, Simple, Term,
};
pub use parser::parse_filter;

use crate::error::Result;
use crate::record::Record;
use eval::Evaluator;

impl Filter {
    /// Parses filter text. See [`parse_filter`].
    pub fn parse(input: &str) -> Result<Self> {
        parse_filter(input)
    }

    /// Returns `true` if the filter has no restrictions.
    pub fn is_empty(&self) -> bool {
        self.expression.is_none()
    }

    /// Validates the filter against `R` and returns a reusable predicate.
    pub fn compile<R: Record + Default>(&self) -> Result<Predicate<R>> {
        let zero = R::default();
        Evaluator::validating().filter(&zero, self)?;
        tracing::debug!(filter = %self, record = R::schema().name(), "compiled filter");
        Ok(Predicate {
            filter: self.clone(),
            _record: PhantomData,
        })
    }
}

/// Parses and compiles in one step.
pub fn compile_filter<R: Record + Default>(input: &str) -> Result<Predicate<R>> {
    Filter::parse(input)?.compile()
}

/// A compiled filter over records of type `R`.
///
/// Immutable and cheap to share; evaluation is total.
pub struct Predicate<R> {
    filter: Filter,
    _record: PhantomData<fn(&R) -> bool>,
}

impl<R: Record> Predicate<R> {
    /// The filter this predicate was compiled from.
    pub fn source(&self) -> &Filter {
        &self.filter
    }

    /// Checks if a single record matches.
    pub fn matches(&self, record: &R) -> bool {
        Evaluator::matching()
            .filter(record, &self.filter)
            .unwrap_or(false)
    }

    /// Returns references to all matching records, in input order.
    pub fn filter<'a>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Returns clones of all matching records.
    pub fn filter_cloned(&self, records: &[R]) -> Vec<R>
    where
        R: Clone,
    {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// Counts matching records.
    pub fn count(&self, records: &[R]) -> usize {
        records.iter().filter(|r| self.matches(r)).count()
    }

    /// Returns the first matching record.
    pub fn find<'a>(&self, records: &'a [R]) -> Option<&'a R> {
        records.iter().find(|r| self.matches(r))
    }
}

impl<R> Clone for Predicate<R> {
    fn clone(&self) -> Self {
        Predicate {
            filter: self.filter.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> fmt::Debug for Predicate<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("filter", &self.filter.to_string())
            .finish()
    }
}
