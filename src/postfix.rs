//! Infix to postfix conversion (shunting-yard).
//!
//! The conversion itself never fails. Malformed input (missing operands, stray
//! operators) passes through and is caught by the stack machine instead.

use tracing::debug;

use crate::token::{format_tokens, Token, TokenKind};

/// Reorders `tokens` into postfix order.
///
/// The output only ever contains numbers and operators. Operators of equal
/// precedence pop each other, which makes them left-associative.
pub fn to_postfix(tokens: &[Token]) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut ops: Vec<Token> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Number(_) => out.push(token.clone()),

            TokenKind::OpenParen => ops.push(token.clone()),

            TokenKind::CloseParen => {
                // An unmatched ')' just drains the stack; brackets were validated upstream.
                while let Some(top) = ops.pop() {
                    if top.kind == TokenKind::OpenParen {
                        break;
                    }
                    out.push(top);
                }
            }

            TokenKind::Operator(op) => {
                // Stops at an open paren or a looser operator.
                while let Some(&Token {
                    kind: TokenKind::Operator(top_op),
                    ..
                }) = ops.last()
                {
                    if top_op.precedence() < op.precedence() {
                        break;
                    }
                    out.extend(ops.pop());
                }
                ops.push(token.clone());
            }
        }
    }

    while let Some(op) = ops.pop() {
        if op.kind != TokenKind::OpenParen {
            out.push(op);
        }
    }

    debug!(postfix = %format_tokens(&out), "converted to postfix");
    out
}
