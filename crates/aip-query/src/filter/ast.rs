//! The parsed form of an AIP-160 filter.
//!
//! The tree mirrors the grammar one level per rule:
//!
//! ```text
//! expression := sequence {"AND" sequence}
//! sequence   := factor {factor}
//! factor     := term {"OR" term}
//! term       := ["NOT" | "-"] simple
//! simple     := restriction | "(" expression ")"
//! restriction:= comparable [comparator comparable]
//! ```
//!
//! Every node renders back to filter text through `Display`.

use std::fmt;

use crate::op::Op;
use crate::value::{Number, Value};

/// A parsed filter. An empty filter matches every record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pub expression: Option<Expression>,
}

/// Conjunction of sequences joined by `AND`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub sequences: Vec<Sequence>,
}

/// Conjunction of adjacent factors.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub factors: Vec<Factor>,
}

/// Disjunction of terms joined by `OR`.
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub negated: bool,
    pub simple: Simple,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Simple {
    Restriction(Restriction),
    /// A parenthesized expression.
    Composite(Expression),
}

/// One condition. Without a comparator it is a global restriction: a
/// case-insensitive search for the comparable's text in every string of
/// the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Restriction {
    pub comparable: Comparable,
    pub comparator: Option<(Op, Comparable)>,
}

impl Restriction {
    pub fn is_global(&self) -> bool {
        self.comparator.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Comparable {
    /// A bare word, resolved against the record; a single unknown segment
    /// falls back to a literal.
    Member(Member),
    Literal(Literal),
}

impl Comparable {
    /// The text a global restriction searches for.
    pub fn search_text(&self) -> String {
        match self {
            Comparable::Member(member) => member.to_string(),
            Comparable::Literal(Literal::String(s)) => s.clone(),
            Comparable::Literal(literal) => literal.to_string(),
        }
    }
}

/// A dotted member path as written in the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub segments: Vec<String>,
}

impl Member {
    pub fn new(text: &str) -> Self {
        Member {
            segments: text.split('.').map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// A quoted string. Never resolved as a field name.
    String(String),
    Int(i64),
    Float(f64),
}

impl Literal {
    pub fn value(&self) -> Value<'_> {
        match self {
            Literal::String(s) => Value::String(s),
            Literal::Int(n) => Value::Number(Number::I64(*n)),
            Literal::Float(n) => Value::Number(Number::F64(*n)),
        }
    }
}

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expression {
            Some(expression) => write!(f, "{expression}"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        join(f, &self.sequences, " AND ")
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        join(f, &self.factors, " ")
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        join(f, &self.terms, " OR ")
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("NOT ")?;
        }
        match &self.simple {
            Simple::Restriction(r) => write!(f, "{r}"),
            Simple::Composite(e) => write!(f, "({e})"),
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.comparable)?;
        if let Some((op, arg)) = &self.comparator {
            write!(f, " {op} {arg}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Comparable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparable::Member(m) => write!(f, "{m}"),
            Comparable::Literal(l) => write!(f, "{l}"),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        join(f, &self.segments, ".")
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' | '\\' => write!(f, "\\{c}")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(n) => write!(f, "{n:?}"),
        }
    }
}
