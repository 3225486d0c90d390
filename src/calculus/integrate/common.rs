use crate::calculus::differentiate;
use crate::expr::{Expr, one, product};
use crate::simplify::{simplify_fully, simplify_mul, simplify_sub};

pub(crate) fn is_constant_wrt(expr: &Expr, var: &str) -> bool {
    !expr.contains_var(var)
}

/// Splits a product into the factors free of `var` and the factors that depend on it.
pub(crate) fn split_constant_factors(expr: &Expr, var: &str) -> (Expr, Expr) {
    let mut constant = Vec::new();
    let mut dependent = Vec::new();
    for factor in flatten_product(expr) {
        if is_constant_wrt(&factor, var) {
            constant.push(factor);
        } else {
            dependent.push(factor);
        }
    }
    let coef = if constant.is_empty() {
        one()
    } else {
        simplify_fully(product(constant))
    };
    (coef, product(dependent))
}

/// Factors of a product, with a leading negation kept as a `-1` factor.
pub(crate) fn flatten_product(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Mul(a, b) => {
            let mut out = flatten_product(a);
            out.extend(flatten_product(b));
            out
        }
        Expr::Neg(inner) => {
            let mut out = vec![Expr::integer(-1)];
            out.extend(flatten_product(inner));
            out
        }
        other => vec![other.clone()],
    }
}

/// `(a, b)` such that `expr == a*var + b` with `a != 0` free of `var`.
pub(crate) fn linear_parts(expr: &Expr, var: &str) -> Option<(Expr, Expr)> {
    if !expr.contains_var(var) {
        return None;
    }
    let slope = simplify_fully(differentiate(var, expr));
    if slope.is_zero() || !is_constant_wrt(&slope, var) {
        return None;
    }
    let offset = simplify_fully(simplify_sub(
        expr.clone(),
        simplify_mul(slope.clone(), Expr::var(var)),
    ));
    is_constant_wrt(&offset, var).then_some((slope, offset))
}

/// A variable name not occurring in `expr`.
pub(crate) fn fresh_var_name(expr: &Expr, base: &str) -> String {
    let mut candidate = base.to_string();
    let mut counter = 0usize;
    while expr.contains_var(&candidate) {
        counter += 1;
        candidate = format!("{base}{counter}");
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{add, mul};

    #[test]
    fn linear_parts_of_affine_argument() {
        let expr = add(mul(Expr::integer(3), Expr::var("x")), Expr::integer(2));
        let (a, b) = linear_parts(&expr, "x").expect("affine");
        assert_eq!(a, Expr::integer(3));
        assert_eq!(b, Expr::integer(2));
    }

    #[test]
    fn quadratic_is_not_linear() {
        let expr = mul(Expr::var("x"), Expr::var("x"));
        assert!(linear_parts(&expr, "x").is_none());
    }

    #[test]
    fn constant_factors_split_off() {
        let expr = mul(mul(Expr::integer(2), Expr::var("k")), Expr::var("x"));
        let (coef, rest) = split_constant_factors(&expr, "x");
        assert_eq!(coef, simplify_fully(mul(Expr::integer(2), Expr::var("k"))));
        assert_eq!(rest, Expr::var("x"));
    }
}
