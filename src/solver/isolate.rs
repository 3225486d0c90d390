//! Algebraic isolation of a target sub-expression.

use num_traits::One;

use crate::calculus::integrate::flatten_product;
use crate::expr::{Expr, add, div, exp, log, neg, pow, product, sum};
use crate::simplify::{simplify_fully, split_coeff};

const ISOLATE_STEP_LIMIT: usize = 64;

/// Solves `lhs = rhs` for `target` by undoing one outer operation at a time.
///
/// `rhs` must not contain `target`. Inverses use principal branches, so an
/// even power gives the positive root. Returns `None` when the target occurs
/// in more than one place that no inversion can separate.
pub fn isolate(lhs: &Expr, rhs: &Expr, target: &Expr) -> Option<Expr> {
    let mut lhs = simplify_fully(lhs.clone());
    let mut rhs = simplify_fully(rhs.clone());
    for _ in 0..ISOLATE_STEP_LIMIT {
        if &lhs == target {
            return Some(rhs);
        }
        if !lhs.contains(target) || rhs.contains(target) {
            return None;
        }
        let (next_lhs, next_rhs) = invert_outer(&lhs, rhs, target)?;
        lhs = simplify_fully(next_lhs);
        rhs = simplify_fully(next_rhs);
    }
    None
}

fn invert_outer(lhs: &Expr, rhs: Expr, target: &Expr) -> Option<(Expr, Expr)> {
    let terms = lhs.terms();
    if terms.len() > 1 {
        let (with, without): (Vec<Expr>, Vec<Expr>) =
            terms.into_iter().partition(|t| t.contains(target));
        let [term] = <[Expr; 1]>::try_from(with).ok()?;
        return Some((term, add(rhs, neg(sum(without)))));
    }

    let (coef, base) = split_coeff(lhs);
    if !coef.is_one() {
        return Some((base, div(rhs, Expr::Constant(coef))));
    }

    let factors = flatten_product(&base);
    if factors.len() > 1 {
        let (with, without): (Vec<Expr>, Vec<Expr>) =
            factors.into_iter().partition(|f| f.contains(target));
        let [factor] = <[Expr; 1]>::try_from(with).ok()?;
        return Some((factor, div(rhs, product(without))));
    }

    match lhs {
        Expr::Pow(b, e) if !e.contains(target) => Some((
            (**b).clone(),
            pow(rhs, div(Expr::integer(1), (**e).clone())),
        )),
        Expr::Pow(b, e) if !b.contains(target) => {
            Some(((**e).clone(), div(log(rhs), log((**b).clone()))))
        }
        Expr::Exp(u) => Some(((**u).clone(), log(rhs))),
        Expr::Log(u) => Some(((**u).clone(), exp(rhs))),
        // The sign is absorbed into the arbitrary constant.
        Expr::Abs(u) => Some(((**u).clone(), rhs)),
        Expr::Tan(u) => Some(((**u).clone(), Expr::Atan(rhs.boxed()))),
        Expr::Atan(u) => Some(((**u).clone(), Expr::Tan(rhs.boxed()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::mul;

    #[test]
    fn undoes_scaling_and_offset() {
        let y = Expr::var("y");
        let lhs = add(mul(Expr::integer(2), y.clone()), Expr::integer(4));
        let solved = isolate(&lhs, &Expr::var("x"), &y).expect("isolated");
        assert_eq!(
            solved,
            simplify_fully(div(add(Expr::var("x"), Expr::integer(-4)), Expr::integer(2)))
        );
    }

    #[test]
    fn log_inverts_to_exp() {
        let y = Expr::var("y");
        let solved = isolate(&log(y.clone()), &Expr::var("x"), &y).expect("isolated");
        assert_eq!(solved, exp(Expr::var("x")));
    }

    #[test]
    fn target_on_both_factors_is_not_isolated() {
        let y = Expr::var("y");
        let lhs = add(y.clone(), Expr::Sin(y.clone().boxed()));
        assert!(isolate(&lhs, &Expr::var("x"), &y).is_none());
    }
}
