//! Trailing-operator trimming.

/// Characters that cannot end an expression and are silently dropped from its tail.
///
/// `%` is deliberately absent: a trailing `%` is left for the later stages to reject.
pub const DANGLING: [char; 5] = ['+', '-', '*', '/', '.'];

/// Strips every trailing `+ - * / .` from `expr`.
///
/// Never fails; an expression made only of those characters becomes empty.
pub fn sanitize(expr: &str) -> &str {
    expr.trim_end_matches(DANGLING)
}
