//! The calculator as its user sees it: an expression being edited, a display and a
//! history, driven one key at a time.
//!
//! This is the strict side of the evaluator contract. `=` refuses incomplete input
//! up front instead of letting the sanitizer trim it.

use tracing::{debug, info};

use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::history::History;

/// Characters that leave an expression unfinished when they come last.
pub const INCOMPLETE_TAIL: [char; 6] = ['+', '-', '*', '/', '.', '%'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Appends a character to the expression. Control characters are ignored.
    Input(char),
    /// `C`
    Clear,
    /// `<-`
    Backspace,
    /// `=`
    Equals,
    /// `%`: replaces the expression with its value divided by 100.
    Percent,
}

impl Key {
    /// Parses a keypad label: `C`, `<-`, `=`, `%` or any single character.
    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "C" => Key::Clear,
            "<-" => Key::Backspace,
            "=" => Key::Equals,
            "%" => Key::Percent,
            _ => {
                let mut chars = label.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Key::Input(c)
            }
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    evaluator: Evaluator,
    expression: String,
    display: String,
    history: History,
}

impl Session {
    pub fn new(evaluator: Evaluator, history: History) -> Self {
        Self {
            evaluator,
            expression: String::new(),
            display: String::new(),
            history,
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    /// Applies one key press.
    ///
    /// Returns the computed value for `=` and `%`. On error the expression and display
    /// are cleared, except for [`EvalError::IncompleteExpression`] which leaves them
    /// as they were.
    pub fn press(&mut self, key: Key) -> Result<Option<f64>, EvalError> {
        match key {
            Key::Input(c) if c.is_control() => {
                debug!(key = ?c, "ignored control character");
                Ok(None)
            }
            Key::Input(c) => {
                self.expression.push(c);
                self.display.clone_from(&self.expression);
                Ok(None)
            }
            Key::Clear => {
                self.reset();
                Ok(None)
            }
            Key::Backspace => {
                if self.expression.pop().is_some() {
                    self.display.clone_from(&self.expression);
                }
                Ok(None)
            }
            Key::Equals => self.equals().map(Some),
            Key::Percent => self.percent(),
        }
    }

    /// Presses every key in order, stopping at the first error.
    pub fn press_all(
        &mut self,
        keys: impl IntoIterator<Item = Key>,
    ) -> Result<Option<f64>, EvalError> {
        let mut last = None;
        for key in keys {
            last = self.press(key)?;
        }
        Ok(last)
    }

    /// Replaces the expression with `line` and presses `=`.
    pub fn submit(&mut self, line: &str) -> Result<f64, EvalError> {
        self.expression = line.to_string();
        self.display.clone_from(&self.expression);
        self.equals()
    }

    fn equals(&mut self) -> Result<f64, EvalError> {
        check_complete(&self.expression)?;

        let value = self.evaluate()?;
        let shown = format_number(value);
        let entry = format!("{} = {}", self.expression, shown);
        info!(%entry, "recorded calculation");

        self.history.push(entry);
        self.display = shown;
        self.expression.clear();
        Ok(value)
    }

    fn percent(&mut self) -> Result<Option<f64>, EvalError> {
        if self.expression.is_empty() {
            return Ok(None);
        }

        let value = percent_of(self.evaluate()?);
        self.expression = format_number(value);
        self.display.clone_from(&self.expression);
        Ok(Some(value))
    }

    fn evaluate(&mut self) -> Result<f64, EvalError> {
        self.evaluator.evaluate(&self.expression).inspect_err(|e| {
            debug!(expression = %self.expression, error = %e, "evaluation failed");
            if e.resets_expression() {
                self.reset();
            }
        })
    }

    fn reset(&mut self) {
        self.expression.clear();
        self.display.clear();
    }
}

/// Rejects an empty expression or one ending in an operator or `.`.
pub fn check_complete(expression: &str) -> Result<(), EvalError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() || trimmed.ends_with(INCOMPLETE_TAIL) {
        return Err(EvalError::IncompleteExpression);
    }
    Ok(())
}

/// The `%` key: `value / 100`. Unrelated to the binary `%` operator.
pub fn percent_of(value: f64) -> f64 {
    value / 100.0
}

/// Formats a result for display. Never uses exponent notation, so the text can be
/// typed back in as a number.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}
