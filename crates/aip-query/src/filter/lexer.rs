use crate::error::{Error, Result};
use crate::op::Op;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// Bare word: a member path or an unquoted literal.
    Word(String),
    /// Quoted string, escapes resolved.
    Text(String),
    /// Numeric literal, as written.
    Number(String),
    And,
    Or,
    Not,
    Minus,
    LParen,
    RParen,
    Comparator(Op),
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("{w:?}"),
            Token::Text(t) => format!("string {t:?}"),
            Token::Number(n) => format!("number {n}"),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::Minus => "'-'".into(),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::Comparator(op) => format!("'{op}'"),
        }
    }
}

/// A token and the byte offset it starts at.
pub(crate) type Spanned = (usize, Token);

pub(crate) struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned>;

    fn next(&mut self) -> Option<Self::Item> {
        self.consume_whitespace();
        let start = self.position;
        let ch = self.peek_char()?;

        let token = match ch {
            '(' => {
                self.advance();
                Ok(Token::LParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RParen)
            }
            '"' | '\'' => self.consume_string(),
            '=' | ':' | '!' | '>' | '<' => self.consume_comparator(),
            '-' => Ok(self.consume_minus()),
            _ => Ok(self.consume_word()),
        };

        Some(token.map(|token| (start, token)))
    }
}

impl<'a> Lexer<'a> {
    fn consume_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Longest comparator at the current position: `>=` wins over `>`.
    fn consume_comparator(&mut self) -> Result<Token> {
        let start = self.position;
        let rest = &self.input[start..];
        for len in [2, 1] {
            let Some(text) = rest.get(..len) else {
                continue;
            };
            if let Some(op) = Op::parse(text) {
                self.position += len;
                return Ok(Token::Comparator(op));
            }
        }
        Err(self.error(start, "expected '=' after '!'"))
    }

    /// A leading `-` is part of a negative number, otherwise it negates.
    fn consume_minus(&mut self) -> Token {
        if is_number(self.word_at(self.position)) {
            return self.consume_word();
        }
        self.advance();
        Token::Minus
    }

    fn consume_word(&mut self) -> Token {
        let text = self.word_at(self.position);
        self.position += text.len();
        match text {
            "AND" => Token::And,
            "OR" => Token::Or,
            "NOT" => Token::Not,
            _ if is_number(text) => Token::Number(text.to_string()),
            _ => Token::Word(text.to_string()),
        }
    }

    /// The run of word characters starting at `from`.
    fn word_at(&self, from: usize) -> &'a str {
        let rest = &self.input[from..];
        let end = rest
            .find(|c: char| !is_word_char(c))
            .unwrap_or(rest.len());
        &rest[..end]
    }

    fn consume_string(&mut self) -> Result<Token> {
        let start = self.position;
        let quote = self.next_char();
        let mut value = String::new();
        while let Some(ch) = self.next_char() {
            if Some(ch) == quote {
                return Ok(Token::Text(value));
            }
            if ch == '\\' {
                match self.next_char() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.error(start, "unterminated escape sequence")),
                }
            } else {
                value.push(ch);
            }
        }
        Err(self.error(start, "unterminated string literal"))
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn advance(&mut self) {
        self.next_char();
    }

    fn error(&self, position: usize, message: &str) -> Error {
        Error::InvalidFilter {
            position,
            message: message.to_string(),
        }
    }
}

fn is_word_char(ch: char) -> bool {
    !ch.is_whitespace() && !matches!(ch, '(' | ')' | '"' | '\'' | '=' | '!' | '<' | '>' | ':')
}

/// `-?digits[.digits]`
pub(crate) fn is_number(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.map_or(true, all_digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .map(|t| t.map(|(_, token)| token))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn words_and_keywords() {
        assert_eq!(
            lex("author.given_name AND NOT title OR x"),
            vec![
                Token::Word("author.given_name".into()),
                Token::And,
                Token::Not,
                Token::Word("title".into()),
                Token::Or,
                Token::Word("x".into()),
            ]
        );
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(
            lex("and or not"),
            vec![
                Token::Word("and".into()),
                Token::Word("or".into()),
                Token::Word("not".into()),
            ]
        );
    }

    #[test]
    fn comparators() {
        assert_eq!(
            lex("a=b a!=b a>b a>=b a<b a<=b a:b"),
            vec![
                Token::Word("a".into()),
                Token::Comparator(Op::Eq),
                Token::Word("b".into()),
                Token::Word("a".into()),
                Token::Comparator(Op::Ne),
                Token::Word("b".into()),
                Token::Word("a".into()),
                Token::Comparator(Op::Gt),
                Token::Word("b".into()),
                Token::Word("a".into()),
                Token::Comparator(Op::Gte),
                Token::Word("b".into()),
                Token::Word("a".into()),
                Token::Comparator(Op::Lt),
                Token::Word("b".into()),
                Token::Word("a".into()),
                Token::Comparator(Op::Lte),
                Token::Word("b".into()),
                Token::Word("a".into()),
                Token::Comparator(Op::Has),
                Token::Word("b".into()),
            ]
        );
    }

    #[test]
    fn comparators_take_the_longest_match() {
        assert_eq!(
            lex("a>=b<c!=:d"),
            vec![
                Token::Word("a".into()),
                Token::Comparator(Op::Gte),
                Token::Word("b".into()),
                Token::Comparator(Op::Lt),
                Token::Word("c".into()),
                Token::Comparator(Op::Ne),
                Token::Comparator(Op::Has),
                Token::Word("d".into()),
            ]
        );
    }

    #[test]
    fn numbers_and_negation() {
        assert_eq!(
            lex("-3 -2.5 -title 2024-01-01 4.5"),
            vec![
                Token::Number("-3".into()),
                Token::Number("-2.5".into()),
                Token::Minus,
                Token::Word("title".into()),
                Token::Word("2024-01-01".into()),
                Token::Number("4.5".into()),
            ]
        );
    }

    #[test]
    fn quoted_strings() {
        assert_eq!(
            lex(r#""Hunt" 'it\'s' "a\"b""#),
            vec![
                Token::Text("Hunt".into()),
                Token::Text("it's".into()),
                Token::Text("a\"b".into()),
            ]
        );
    }

    #[test]
    fn positions_are_byte_offsets() {
        let spans: Vec<usize> = Lexer::new("a = (b)")
            .map(|t| t.unwrap().0)
            .collect();
        assert_eq!(spans, vec![0, 2, 4, 5, 6]);
    }

    #[test]
    fn errors() {
        let err = Lexer::new("title = \"open").find_map(|t| t.err()).unwrap();
        assert!(matches!(err, Error::InvalidFilter { position: 8, .. }), "{err}");

        let err = Lexer::new("a ! b").find_map(|t| t.err()).unwrap();
        assert!(matches!(err, Error::InvalidFilter { position: 2, .. }), "{err}");
    }

    #[test]
    fn number_shapes() {
        assert!(is_number("0"));
        assert!(is_number("-12.50"));
        assert!(!is_number("1."));
        assert!(!is_number(".5"));
        assert!(!is_number("-"));
        assert!(!is_number("1e5"));
    }
}
