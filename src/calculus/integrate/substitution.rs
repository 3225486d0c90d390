use std::collections::BTreeSet;

use super::common::fresh_var_name;
use super::{TRANSFORM_SIZE_LIMIT, integrate_inner};
use crate::calculus::differentiate;
use crate::config::Meter;
use crate::error::CasResult;
use crate::expr::Expr;
use crate::simplify::{simplify_div, simplify_fully, substitute, substitute_var};

const SUBSTITUTION_CANDIDATE_LIMIT: usize = 12;

/// `∫ f(g(x)) g'(x) dx = F(g(x))`: tries each inner sub-expression `g`, divides
/// the integrand by `g'` and keeps the first choice that leaves no stray `x`.
pub(super) fn integrate_by_substitution(
    expr: &Expr,
    var: &str,
    meter: &Meter,
    depth: usize,
) -> CasResult<Option<Expr>> {
    let placeholder = fresh_var_name(expr, "u");
    for inner in inner_candidates(expr, var) {
        meter.tick()?;
        let inner_derivative = simplify_fully(differentiate(var, &inner));
        if inner_derivative.is_zero() {
            continue;
        }
        let ratio = simplify_fully(simplify_div(expr.clone(), inner_derivative));
        if ratio.size() > TRANSFORM_SIZE_LIMIT {
            continue;
        }
        let replaced = simplify_fully(substitute(&ratio, &inner, &Expr::var(&placeholder)));
        if replaced.contains_var(var) {
            continue;
        }
        if let Some(result) = integrate_inner(&replaced, &placeholder, meter, depth + 1)? {
            return Ok(Some(simplify_fully(substitute_var(
                &result,
                &placeholder,
                &inner,
            ))));
        }
    }
    Ok(None)
}

/// Proper sub-expressions depending on `var`, largest first.
fn inner_candidates(expr: &Expr, var: &str) -> Vec<Expr> {
    let mut seen = BTreeSet::new();
    collect_candidates(expr, var, &mut seen);
    seen.remove(expr);
    seen.remove(&Expr::var(var));
    let mut candidates: Vec<Expr> = seen.into_iter().collect();
    candidates.sort_by_key(|c| std::cmp::Reverse(c.size()));
    candidates.truncate(SUBSTITUTION_CANDIDATE_LIMIT);
    candidates
}

fn collect_candidates(expr: &Expr, var: &str, out: &mut BTreeSet<Expr>) {
    if !expr.contains_var(var) {
        return;
    }
    out.insert(expr.clone());
    for child in expr.children() {
        collect_candidates(child, var, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Budget;
    use crate::expr::{exp, mul, pow};

    #[test]
    fn chain_rule_pattern_is_undone() {
        let x = Expr::var("x");
        let square = pow(x.clone(), Expr::integer(2));
        let integrand = simplify_fully(mul(x, exp(square.clone())));
        let budget = Budget::default();
        let result = integrate_by_substitution(&integrand, "x", &budget.start(), 0)
            .expect("within budget")
            .expect("closed form");
        assert_eq!(
            result,
            simplify_fully(mul(Expr::constant(1, 2), exp(square)))
        );
    }
}
