//! Recursive-descent parser from tokens to [`Filter`].

use super::ast::{
    Comparable, Expression, Factor, Filter, Literal, Member, Restriction, Sequence, Simple, Term,
};
use super::lexer::{Lexer, Spanned, Token};
use crate::error::{Error, Result};

/// Parses filter text into an AST.
///
/// Blank input yields an empty filter.
pub fn parse_filter(input: &str) -> Result<Filter> {
    let tokens = Lexer::new(input).collect::<Result<Vec<_>>>()?;
    if tokens.is_empty() {
        return Ok(Filter::default());
    }
    let mut parser = Parser {
        tokens,
        position: 0,
        end: input.len(),
    };
    let expression = parser.parse_expression()?;
    parser.expect_end()?;
    Ok(Filter {
        expression: Some(expression),
    })
}

struct Parser {
    tokens: Vec<Spanned>,
    position: usize,
    /// Byte offset reported for errors at end of input.
    end: usize,
}

impl Parser {
    fn parse_expression(&mut self) -> Result<Expression> {
        let mut sequences = vec![self.parse_sequence()?];
        while self.current() == Some(&Token::And) {
            self.advance();
            sequences.push(self.parse_sequence()?);
        }
        Ok(Expression { sequences })
    }

    fn parse_sequence(&mut self) -> Result<Sequence> {
        let mut factors = vec![self.parse_factor()?];
        while self.starts_factor() {
            factors.push(self.parse_factor()?);
        }
        Ok(Sequence { factors })
    }

    fn parse_factor(&mut self) -> Result<Factor> {
        let mut terms = vec![self.parse_term()?];
        while self.current() == Some(&Token::Or) {
            self.advance();
            terms.push(self.parse_term()?);
        }
        Ok(Factor { terms })
    }

    fn parse_term(&mut self) -> Result<Term> {
        let negated = matches!(self.current(), Some(Token::Not | Token::Minus));
        if negated {
            self.advance();
        }
        let simple = self.parse_simple()?;
        Ok(Term { negated, simple })
    }

    fn parse_simple(&mut self) -> Result<Simple> {
        if self.current() == Some(&Token::LParen) {
            self.advance();
            let expression = self.parse_expression()?;
            self.expect(&Token::RParen, "')'")?;
            return Ok(Simple::Composite(expression));
        }
        Ok(Simple::Restriction(self.parse_restriction()?))
    }

    fn parse_restriction(&mut self) -> Result<Restriction> {
        let comparable = self.parse_comparable()?;
        let comparator = match self.current() {
            Some(Token::Comparator(op)) => {
                let op = *op;
                self.advance();
                Some((op, self.parse_comparable()?))
            }
            _ => None,
        };
        Ok(Restriction {
            comparable,
            comparator,
        })
    }

    fn parse_comparable(&mut self) -> Result<Comparable> {
        let position = self.offset();
        let comparable = match self.current() {
            Some(Token::Word(word)) => Comparable::Member(Member::new(word)),
            Some(Token::Text(text)) => Comparable::Literal(Literal::String(text.clone())),
            Some(Token::Number(raw)) => Comparable::Literal(number(raw, position)?),
            Some(other) => {
                return Err(Error::InvalidFilter {
                    position,
                    message: format!("expected a field or value, found {}", other.describe()),
                })
            }
            None => {
                return Err(Error::InvalidFilter {
                    position,
                    message: "unexpected end of filter".into(),
                })
            }
        };
        self.advance();
        Ok(comparable)
    }

    fn starts_factor(&self) -> bool {
        matches!(
            self.current(),
            Some(
                Token::Word(_)
                    | Token::Text(_)
                    | Token::Number(_)
                    | Token::Not
                    | Token::Minus
                    | Token::LParen
            )
        )
    }

    fn expect(&mut self, expected: &Token, label: &str) -> Result<()> {
        if self.current() == Some(expected) {
            self.advance();
            return Ok(());
        }
        let found = match self.current() {
            Some(token) => token.describe(),
            None => "end of filter".into(),
        };
        Err(Error::InvalidFilter {
            position: self.offset(),
            message: format!("expected {label}, found {found}"),
        })
    }

    fn expect_end(&self) -> Result<()> {
        match self.current() {
            None => Ok(()),
            Some(token) => Err(Error::InvalidFilter {
                position: self.offset(),
                message: format!("unexpected {}", token.describe()),
            }),
        }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(_, token)| token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.end)
    }

    fn advance(&mut self) {
        self.position += 1;
    }
}

fn number(raw: &str, position: usize) -> Result<Literal> {
    if !raw.contains('.') {
        if let Ok(n) = raw.parse::<i64>() {
            return Ok(Literal::Int(n));
        }
    }
    raw.parse::<f64>()
        .map(Literal::Float)
        .map_err(|_| Error::InvalidFilter {
            position,
            message: format!("invalid number {raw}"),
        })
}
