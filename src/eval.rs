//! The evaluation pipeline.
//!
//! trim -> sanitize -> bracket check -> tokens -> postfix -> stack machine -> round
//!
//! Each stage hands its output forward and none of them feeds back into an earlier
//! one. An evaluation owns all of its intermediate state, so an [`Evaluator`] can be
//! shared between threads freely.

use tracing::debug;

use crate::brackets::find_unbalanced;
use crate::error::EvalError;
use crate::lexer::{tokenize, UnknownChars};
use crate::postfix::to_postfix;
use crate::round::{round_to, DEFAULT_PRECISION};
use crate::sanitize::sanitize;
use crate::token::{format_tokens, Span, Token};
use crate::vm::Vm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    pub unknown_chars: UnknownChars,
    /// Decimal digits kept by the final rounding.
    pub precision: u32,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            unknown_chars: UnknownChars::Ignore,
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Every intermediate product of one evaluation, for debugging output.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub sanitized: String,
    pub tokens: Vec<Token>,
    pub postfix: Vec<Token>,
    pub raw: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    options: EvalOptions,
}

impl Evaluator {
    pub fn new(options: EvalOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EvalOptions {
        self.options
    }

    /// Evaluates `expression` and returns the rounded result.
    ///
    /// Lenient about its input: trailing `+ - * / .` are dropped rather than reported.
    /// Rejecting incomplete input is the caller's job (see [`crate::session`]).
    pub fn evaluate(&self, expression: &str) -> Result<f64, EvalError> {
        self.evaluate_traced(expression).map(|e| e.value)
    }

    /// Like [`Evaluator::evaluate`], keeping the intermediate stages.
    pub fn evaluate_traced(&self, expression: &str) -> Result<Evaluation, EvalError> {
        let (sanitized, tokens) = self.prepare(expression)?;
        let postfix = to_postfix(&tokens);

        let raw = Vm::new().run(&postfix)?;
        if !raw.is_finite() {
            return Err(EvalError::NonFiniteResult { value: raw });
        }

        let mut value = round_to(raw, self.options.precision);
        if value == 0.0 {
            // No negative zero in results.
            value = 0.0;
        }
        debug!(%raw, %value, "evaluated");

        Ok(Evaluation {
            sanitized: sanitized.to_string(),
            tokens,
            postfix,
            raw,
            value,
        })
    }

    /// Runs the stages up to and including tokenization.
    pub fn tokens(&self, expression: &str) -> Result<Vec<Token>, EvalError> {
        self.prepare(expression).map(|(_, tokens)| tokens)
    }

    /// Runs the stages up to and including the postfix conversion.
    pub fn postfix(&self, expression: &str) -> Result<Vec<Token>, EvalError> {
        self.prepare(expression)
            .map(|(_, tokens)| to_postfix(&tokens))
    }

    fn prepare<'a>(&self, expression: &'a str) -> Result<(&'a str, Vec<Token>), EvalError> {
        let sanitized = sanitize(expression.trim());

        if let Some(at) = find_unbalanced(sanitized) {
            return Err(EvalError::UnbalancedBrackets {
                span: Span::new(at, at + 1).into(),
            });
        }

        let tokens = tokenize(sanitized, self.options.unknown_chars)?;
        debug!(input = sanitized, tokens = %format_tokens(&tokens), "tokenized");

        Ok((sanitized, tokens))
    }
}

/// Evaluates `expression` with the default options.
pub fn evaluate(expression: &str) -> Result<f64, EvalError> {
    Evaluator::default().evaluate(expression)
}
