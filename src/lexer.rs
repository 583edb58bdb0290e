use serde::Deserialize;
use tracing::warn;

use crate::error::EvalError;
use crate::token::{Operator, Span, Token, TokenKind};

/// What the lexer does with a character that is not part of the expression grammar.
///
/// Whitespace is always skipped regardless of the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownChars {
    /// Drop the character (it still ends a number literal in progress).
    #[default]
    Ignore,
    /// Fail with [`EvalError::UnknownCharacter`].
    Reject,
}

pub struct Lexer<'source> {
    rest: &'source str,
    position: usize,
    unknown_chars: UnknownChars,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str, unknown_chars: UnknownChars) -> Self {
        Self {
            rest: source,
            position: 0,
            unknown_chars,
        }
    }
}

macro_rules! token {
    ($kind:expr, $start:ident, $self:ident) => {
        return Some(Ok(Token {
            kind: $kind,
            span: Span {
                start: $start,
                end: $self.position,
            },
        }))
    };
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<Token, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let c_start = self.position;

            if is_number_char(c) {
                return Some(self.parse_number(c_start));
            }

            self.rest = chars.as_str();
            self.position += c.len_utf8();

            match c {
                '(' => token!(TokenKind::OpenParen, c_start, self),
                ')' => token!(TokenKind::CloseParen, c_start, self),
                c if c.is_whitespace() => continue,
                c => {
                    if let Some(op) = Operator::from_char(c) {
                        token!(TokenKind::Operator(op), c_start, self);
                    }

                    match self.unknown_chars {
                        UnknownChars::Ignore => {
                            warn!(character = ?c, offset = c_start, "ignoring unknown character");
                            continue;
                        }
                        UnknownChars::Reject => {
                            return Some(Err(EvalError::UnknownCharacter {
                                character: c,
                                span: Span::new(c_start, self.position).into(),
                            }));
                        }
                    }
                }
            }
        }
    }
}

impl<'source> Lexer<'source> {
    fn parse_number(&mut self, start: usize) -> Result<Token, EvalError> {
        let len = self
            .rest
            .find(|c: char| !is_number_char(c))
            .unwrap_or(self.rest.len());
        let literal = &self.rest[..len];
        self.rest = &self.rest[len..];
        self.position += len;

        let span = Span::new(start, self.position);
        let value = parse_literal(literal).ok_or_else(|| EvalError::InvalidNumber {
            literal: literal.to_string(),
            span: span.into(),
        })?;

        Ok(Token {
            kind: TokenKind::Number(value),
            span,
        })
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Accepts `digits` or `digits.digits`; anything else (`.5`, `5.`, `1.2.3`) is rejected.
fn parse_literal(literal: &str) -> Option<f64> {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let well_formed = match literal.split_once('.') {
        Some((int, frac)) => all_digits(int) && all_digits(frac),
        None => all_digits(literal),
    };
    if !well_formed {
        return None;
    }

    literal.parse().ok()
}

/// Collects the whole token stream, stopping at the first error.
pub fn tokenize(source: &str, unknown_chars: UnknownChars) -> Result<Vec<Token>, EvalError> {
    Lexer::new(source, unknown_chars).collect()
}
