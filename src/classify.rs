//! Structural classification of a parsed equation.

use std::fmt;

use crate::expr::{Expr, ExpressionPair};
use crate::symbols::SymbolTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Unrecognized,
    FirstOrderLinear,
    Separable,
    SecondOrder,
    HigherOrder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Classification {
    pub order: u32,
    pub tag: TypeTag,
}

impl Classification {
    pub fn label(&self) -> String {
        match (self.tag, self.order) {
            (_, 0) => "Not a differential equation".to_string(),
            (TypeTag::FirstOrderLinear, _) => "First Order Linear".to_string(),
            (TypeTag::Separable, _) => "Separable".to_string(),
            (TypeTag::SecondOrder, _) => "Second Order".to_string(),
            (TypeTag::Unrecognized, 1) => "First Order (type undetermined)".to_string(),
            (TypeTag::HigherOrder | TypeTag::Unrecognized, n) => format!("Order {n}"),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Order from the highest derivative present, then a type from the shape of the
/// equation. The linear test runs before the separable one.
pub fn classify(pair: &ExpressionPair, symbols: &SymbolTable) -> Classification {
    let diff = pair.difference();
    let order = diff
        .derivatives()
        .into_iter()
        .filter_map(|d| match d {
            Expr::Derivative(_, _, order) => Some(*order),
            _ => None,
        })
        .max()
        .unwrap_or(0);

    let tag = match order {
        0 => TypeTag::Unrecognized,
        1 if is_first_order_linear(pair, &diff, symbols.dependent()) => TypeTag::FirstOrderLinear,
        1 if is_bare_first_derivative(&pair.lhs) => TypeTag::Separable,
        1 => TypeTag::Unrecognized,
        2 => TypeTag::SecondOrder,
        _ => TypeTag::HigherOrder,
    };
    Classification { order, tag }
}

fn is_bare_first_derivative(expr: &Expr) -> bool {
    matches!(expr, Expr::Derivative(_, _, 1))
}

/// The derivative is combined with other terms, and the dependent function
/// only ever appears to the first power, outside denominators and functions.
fn is_first_order_linear(pair: &ExpressionPair, diff: &Expr, dependent: &str) -> bool {
    diff.contains_derivative()
        && !is_bare_first_derivative(&pair.lhs)
        && appears_linearly(diff, dependent)
}

fn appears_linearly(expr: &Expr, dependent: &str) -> bool {
    let depends = |e: &Expr| e.contains_function(dependent);
    match expr {
        Expr::Pow(base, exp) if depends(base) => exp.is_one() && appears_linearly(base, dependent),
        Expr::Div(num, den) => !depends(den) && appears_linearly(num, dependent),
        Expr::Pow(_, exp) if depends(exp) => false,
        Expr::Mul(a, b) if depends(a) && depends(b) => false,
        Expr::Sin(a)
        | Expr::Cos(a)
        | Expr::Tan(a)
        | Expr::Atan(a)
        | Expr::Sinh(a)
        | Expr::Cosh(a)
        | Expr::Exp(a)
        | Expr::Log(a)
        | Expr::Abs(a)
            if depends(a) =>
        {
            false
        }
        _ => expr
            .children()
            .into_iter()
            .all(|child| appears_linearly(child, dependent)),
    }
}
