//! Splits canonical text into the two sides of an equation.

use crate::cas::CasProvider;
use crate::error::{Error, Result};
use crate::expr::{ExpressionPair, zero};
use crate::symbols::SymbolTable;

/// Longest canonical text accepted, in bytes.
pub const MAX_EQUATION_LEN: usize = 4096;

/// Parses `lhs = rhs`, or a bare expression meaning `expr = 0`.
///
/// Only the first `=` outside parentheses splits the text; each side is built
/// through the provider.
pub fn parse_equation(
    canonical: &str,
    symbols: &SymbolTable,
    cas: &impl CasProvider,
) -> Result<ExpressionPair> {
    if canonical.trim().is_empty() {
        return Err(Error::Parse("empty equation".to_string()));
    }
    if canonical.len() > MAX_EQUATION_LEN {
        return Err(Error::Parse(format!(
            "equation is longer than {MAX_EQUATION_LEN} characters"
        )));
    }
    match split_top_level(canonical) {
        Some((lhs, rhs)) => {
            if lhs.trim().is_empty() || rhs.trim().is_empty() {
                return Err(Error::Parse("equation side is empty".to_string()));
            }
            Ok(ExpressionPair::new(
                cas.build_expression(lhs, symbols)?,
                cas.build_expression(rhs, symbols)?,
            ))
        }
        None => Ok(ExpressionPair::new(
            cas.build_expression(canonical, symbols)?,
            zero(),
        )),
    }
}

fn split_top_level(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '=' if depth == 0 => return Some((&text[..idx], &text[idx + 1..])),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_outside_parentheses_only() {
        assert_eq!(split_top_level("f(a=b) = 3"), Some(("f(a=b) ", " 3")));
        assert_eq!(split_top_level("x + 1"), None);
    }

    #[test]
    fn first_equals_wins() {
        assert_eq!(split_top_level("a = b = c"), Some(("a ", " b = c")));
    }
}
