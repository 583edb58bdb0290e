//! Parenthesis nesting check, run before any token is produced.

/// Returns the byte offset of the first bracket that breaks the nesting, if any.
///
/// That is either a `)` with nothing open, or the innermost `(` still open at the end.
pub fn find_unbalanced(expr: &str) -> Option<usize> {
    let mut open = Vec::new();

    for (i, c) in expr.char_indices() {
        match c {
            '(' => open.push(i),
            ')' => {
                if open.pop().is_none() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    open.pop()
}

pub fn is_balanced(expr: &str) -> bool {
    find_unbalanced(expr).is_none()
}
