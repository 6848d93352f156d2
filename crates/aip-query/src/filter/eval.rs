use super::ast::{Comparable, Expression, Factor, Filter, Restriction, Sequence, Simple, Term};
use super::compare::{compare_any, search};
use crate::error::Result;
use crate::record::Record;
use crate::resolve::resolve_member;
use crate::value::Value;

/// Walks a filter AST against one record.
///
/// In matching mode evaluation short-circuits and a restriction that fails
/// to resolve or compare is a non-match. In validating mode every
/// restriction is evaluated and the first error is returned.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Evaluator {
    validating: bool,
}

impl Evaluator {
    pub(crate) fn matching() -> Self {
        Evaluator { validating: false }
    }

    pub(crate) fn validating() -> Self {
        Evaluator { validating: true }
    }

    pub(crate) fn filter(self, record: &dyn Record, filter: &Filter) -> Result<bool> {
        match &filter.expression {
            Some(expression) => self.expression(record, expression),
            None => Ok(true),
        }
    }

    fn expression(self, record: &dyn Record, expression: &Expression) -> Result<bool> {
        self.all(&expression.sequences, |s| self.sequence(record, s))
    }

    fn sequence(self, record: &dyn Record, sequence: &Sequence) -> Result<bool> {
        self.all(&sequence.factors, |f| self.factor(record, f))
    }

    fn factor(self, record: &dyn Record, factor: &Factor) -> Result<bool> {
        self.any(&factor.terms, |t| self.term(record, t))
    }

    fn term(self, record: &dyn Record, term: &Term) -> Result<bool> {
        let matched = match &term.simple {
            Simple::Restriction(r) => self.restriction(record, r)?,
            Simple::Composite(e) => self.expression(record, e)?,
        };
        Ok(matched != term.negated)
    }

    fn restriction(self, record: &dyn Record, restriction: &Restriction) -> Result<bool> {
        let Some((op, arg)) = &restriction.comparator else {
            let term = restriction.comparable.search_text().to_lowercase();
            return Ok(search(record, &term));
        };
        let outcome = comparable(record, &restriction.comparable).and_then(|lhs| {
            let rhs = comparable(record, arg)?;
            compare_any(&lhs, &rhs, *op)
        });
        if self.validating {
            outcome
        } else {
            Ok(outcome.unwrap_or(false))
        }
    }

    fn all<T>(self, items: &[T], mut eval: impl FnMut(&T) -> Result<bool>) -> Result<bool> {
        let mut result = true;
        for item in items {
            let matched = eval(item)?;
            if !matched && !self.validating {
                return Ok(false);
            }
            result &= matched;
        }
        Ok(result)
    }

    fn any<T>(self, items: &[T], mut eval: impl FnMut(&T) -> Result<bool>) -> Result<bool> {
        let mut result = false;
        for item in items {
            let matched = eval(item)?;
            if matched && !self.validating {
                return Ok(true);
            }
            result |= matched;
        }
        Ok(result)
    }
}

fn comparable<'a>(record: &'a dyn Record, comparable: &'a Comparable) -> Result<Value<'a>> {
    match comparable {
        Comparable::Member(member) => resolve_member(record, &member.segments),
        Comparable::Literal(literal) => Ok(literal.value()),
    }
}
