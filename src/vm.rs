//! Postfix stack machine.

use tracing::trace;

use crate::error::EvalError;
use crate::token::{Operator, Token, TokenKind};

#[derive(Debug, Default)]
pub struct Vm {
    stack: Vec<f64>,
}

impl Vm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduces a postfix sequence to a single value.
    ///
    /// The stack is cleared before running, so a `Vm` can be reused.
    pub fn run(&mut self, postfix: &[Token]) -> Result<f64, EvalError> {
        self.stack.clear();

        for token in postfix {
            match token.kind {
                TokenKind::Number(n) => self.push(n),
                TokenKind::Operator(op) => {
                    let missing = || EvalError::MissingOperand {
                        operator: op,
                        span: token.span.into(),
                    };
                    let b = self.pop().ok_or_else(missing)?;
                    let a = self.pop().ok_or_else(missing)?;

                    let value = apply(op, a, b).ok_or(EvalError::DivisionByZero {
                        span: token.span.into(),
                    })?;
                    trace!(%a, %op, %b, %value, "applied operator");
                    self.push(value);
                }
                TokenKind::OpenParen | TokenKind::CloseParen => {
                    return Err(EvalError::UnexpectedToken {
                        span: token.span.into(),
                    });
                }
            }
        }

        match self.stack.as_slice() {
            [value] => Ok(*value),
            rest => Err(EvalError::StackDepth { depth: rest.len() }),
        }
    }

    fn push(&mut self, value: f64) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> Option<f64> {
        self.stack.pop()
    }
}

/// `a op b`. Returns `None` only for `/` with a zero divisor.
///
/// `%` is the truncated floating remainder (sign of the dividend) and has no zero
/// guard: `x % 0` is NaN.
pub fn apply(op: Operator, a: f64, b: f64) -> Option<f64> {
    Some(match op {
        Operator::Add => a + b,
        Operator::Sub => a - b,
        Operator::Mul => a * b,
        Operator::Div => {
            if b == 0.0 {
                return None;
            }
            a / b
        }
        Operator::Rem => a % b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Span;

    fn num(n: f64) -> Token {
        Token {
            kind: TokenKind::Number(n),
            span: Span::new(0, 1),
        }
    }

    fn op(op: Operator, at: usize) -> Token {
        Token {
            kind: TokenKind::Operator(op),
            span: Span::new(at, at + 1),
        }
    }

    #[test]
    fn operand_order() {
        let mut vm = Vm::new();
        assert_eq!(vm.run(&[num(10.0), num(4.0), op(Operator::Sub, 1)]), Ok(6.0));
        assert_eq!(vm.run(&[num(10.0), num(4.0), op(Operator::Div, 1)]), Ok(2.5));
        assert_eq!(vm.run(&[num(10.0), num(4.0), op(Operator::Rem, 1)]), Ok(2.0));
    }

    #[test]
    fn remainder_follows_dividend() {
        assert_eq!(apply(Operator::Rem, -7.0, 3.0), Some(-1.0));
        assert_eq!(apply(Operator::Rem, 7.0, -3.0), Some(1.0));
        assert_eq!(apply(Operator::Rem, 5.5, 2.0), Some(1.5));
    }

    #[test]
    fn division_by_zero() {
        let mut vm = Vm::new();
        let err = vm
            .run(&[num(1.0), num(0.0), op(Operator::Div, 3)])
            .unwrap_err();
        assert_eq!(err, EvalError::DivisionByZero { span: (3, 1).into() });
        assert_eq!(apply(Operator::Div, 1.0, -0.0), None);
    }

    #[test]
    fn remainder_by_zero_is_nan() {
        assert!(apply(Operator::Rem, 5.0, 0.0).unwrap().is_nan());
    }

    #[test]
    fn underflow() {
        let mut vm = Vm::new();
        for postfix in [
            vec![op(Operator::Add, 0)],
            vec![num(1.0), op(Operator::Mul, 1)],
            vec![num(1.0), num(2.0), op(Operator::Add, 2), op(Operator::Add, 3)],
        ] {
            let result = vm.run(&postfix);
            assert!(
                matches!(result, Err(EvalError::MissingOperand { .. })),
                "{result:?}"
            );
        }
    }

    #[test]
    fn final_depth_must_be_one() {
        let mut vm = Vm::new();
        assert_eq!(vm.run(&[]), Err(EvalError::StackDepth { depth: 0 }));
        assert_eq!(
            vm.run(&[num(1.0), num(2.0)]),
            Err(EvalError::StackDepth { depth: 2 })
        );
    }

    #[test]
    fn brackets_are_not_postfix() {
        let mut vm = Vm::new();
        let paren = Token {
            kind: TokenKind::OpenParen,
            span: Span::new(0, 1),
        };
        assert!(matches!(
            vm.run(&[paren]),
            Err(EvalError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn reusable() {
        let mut vm = Vm::new();
        let _ = vm.run(&[num(1.0), num(2.0)]);
        assert_eq!(vm.run(&[num(3.0)]), Ok(3.0));
    }
}
