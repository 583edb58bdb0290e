use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::token::Operator;

/// Everything that can go wrong between receiving an expression and producing its value.
///
/// Spans point into the whitespace-trimmed expression.
#[derive(Debug, Clone, PartialEq, Diagnostic, Error)]
pub enum EvalError {
    #[error("unbalanced brackets")]
    #[diagnostic(
        code(pocket_calc::unbalanced_brackets),
        help("every '(' needs a matching ')' after it")
    )]
    UnbalancedBrackets {
        #[label("this bracket has no partner")]
        span: SourceSpan,
    },

    #[error("division by zero")]
    #[diagnostic(code(pocket_calc::division_by_zero))]
    DivisionByZero {
        #[label("divisor evaluates to zero")]
        span: SourceSpan,
    },

    #[error("incomplete expression")]
    #[diagnostic(
        code(pocket_calc::incomplete_expression),
        help("finish the expression with a number or ')'")
    )]
    IncompleteExpression,

    #[error("invalid number literal '{literal}'")]
    #[diagnostic(
        code(pocket_calc::invalid_number),
        help("numbers are written as digits with at most one '.' between digits")
    )]
    InvalidNumber {
        literal: String,
        #[label("not a number")]
        span: SourceSpan,
    },

    #[error("unexpected character '{character}'")]
    #[diagnostic(code(pocket_calc::unknown_character))]
    UnknownCharacter {
        character: char,
        #[label("unexpected character")]
        span: SourceSpan,
    },

    #[error("operator '{operator}' is missing an operand")]
    #[diagnostic(code(pocket_calc::missing_operand))]
    MissingOperand {
        operator: Operator,
        #[label("needs a value on both sides")]
        span: SourceSpan,
    },

    #[error("malformed expression: {depth} values left after evaluation")]
    #[diagnostic(code(pocket_calc::stack_depth))]
    StackDepth { depth: usize },

    #[error("unexpected bracket in postfix sequence")]
    #[diagnostic(code(pocket_calc::unexpected_token))]
    UnexpectedToken {
        #[label("here")]
        span: SourceSpan,
    },

    #[error("result is not a finite number ({value})")]
    #[diagnostic(code(pocket_calc::non_finite_result))]
    NonFiniteResult { value: f64 },
}

/// The classification callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnbalancedBrackets,
    DivisionByZero,
    IncompleteExpression,
    InvalidOperation,
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::UnbalancedBrackets { .. } => ErrorKind::UnbalancedBrackets,
            EvalError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            EvalError::IncompleteExpression => ErrorKind::IncompleteExpression,
            EvalError::InvalidNumber { .. }
            | EvalError::UnknownCharacter { .. }
            | EvalError::MissingOperand { .. }
            | EvalError::StackDepth { .. }
            | EvalError::UnexpectedToken { .. }
            | EvalError::NonFiniteResult { .. } => ErrorKind::InvalidOperation,
        }
    }

    /// Whether the caller should throw away the expression being edited.
    ///
    /// Only an incomplete expression is kept so it can be finished.
    pub fn resets_expression(&self) -> bool {
        self.kind() != ErrorKind::IncompleteExpression
    }
}

impl ErrorKind {
    /// Short message for a dialog title or status line.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::UnbalancedBrackets => "Unbalanced brackets",
            ErrorKind::DivisionByZero => "Division by zero",
            ErrorKind::IncompleteExpression => "Incomplete Expression",
            ErrorKind::InvalidOperation => "Invalid Operation",
        }
    }
}
