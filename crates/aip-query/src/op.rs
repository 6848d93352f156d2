//! Comparison operators for filter restrictions.
//!
//! The [`Op`] enum is the fixed AIP-160 comparator set. Not all operators are
//! valid for all value pairings; see the evaluator for the dispatch rules.

use std::cmp::Ordering;

/// Comparison operator of an explicit restriction.
///
/// - **Equality**: `Eq`, `Ne` work on every value kind
/// - **Ordering**: `Gt`, `Gte`, `Lt`, `Lte` need two numbers or two strings
/// - **Has**: `:` tests containment for strings, maps and repeated fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `:`
    Has,
}

impl Op {
    /// Parses the textual comparator.
    pub fn parse(text: &str) -> Option<Op> {
        Some(match text {
            "=" => Op::Eq,
            "!=" => Op::Ne,
            ">" => Op::Gt,
            ">=" => Op::Gte,
            "<" => Op::Lt,
            "<=" => Op::Lte,
            ":" => Op::Has,
            _ => return None,
        })
    }

    /// Returns `true` for the operators that need an ordering.
    pub fn is_ordering_op(self) -> bool {
        matches!(self, Op::Gt | Op::Gte | Op::Lt | Op::Lte)
    }

    /// Evaluates a comparison given an ordering result.
    ///
    /// `Has` is not ordering-based and always yields `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            Op::Has => false,
        }
    }

    /// Returns the filter syntax of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Has => ":",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
