use num_traits::Signed;

use super::common::flatten_product;
use super::{TRANSFORM_DEPTH_LIMIT, TRANSFORM_SIZE_LIMIT, integrate_inner};
use crate::calculus::differentiate;
use crate::config::Meter;
use crate::error::CasResult;
use crate::expr::{Expr, product};
use crate::simplify::{simplify_fully, simplify_mul, simplify_sub};

/// LIATE preference for the factor differentiated in `∫ u dv = u v - ∫ v du`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum LiateRank {
    Log,
    InverseTrig,
    Algebraic,
    Trig,
    Exponential,
}

fn factor_rank(expr: &Expr, var: &str) -> Option<LiateRank> {
    match expr {
        Expr::Log(_) => Some(LiateRank::Log),
        Expr::Atan(_) => Some(LiateRank::InverseTrig),
        e if is_polynomial(e, var) => Some(LiateRank::Algebraic),
        Expr::Sin(_) | Expr::Cos(_) | Expr::Tan(_) | Expr::Sinh(_) | Expr::Cosh(_) => {
            Some(LiateRank::Trig)
        }
        Expr::Exp(_) => Some(LiateRank::Exponential),
        Expr::Pow(base, _) => factor_rank(base, var),
        _ => None,
    }
}

fn is_polynomial(expr: &Expr, var: &str) -> bool {
    match expr {
        Expr::Variable(_) | Expr::Constant(_) => true,
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) => {
            is_polynomial(a, var) && is_polynomial(b, var)
        }
        Expr::Neg(a) => is_polynomial(a, var),
        Expr::Pow(base, exp) => {
            exp.as_constant()
                .is_some_and(|n| n.is_integer() && !n.is_negative())
                && is_polynomial(base, var)
        }
        other => !other.contains_var(var),
    }
}

pub(super) fn integrate_by_parts(
    expr: &Expr,
    var: &str,
    meter: &Meter,
    depth: usize,
) -> CasResult<Option<Expr>> {
    let factors = flatten_product(expr);
    if factors.len() < 2 {
        return Ok(None);
    }
    let mut ranked: Vec<(LiateRank, usize)> = factors
        .iter()
        .enumerate()
        .filter_map(|(idx, factor)| factor_rank(factor, var).map(|rank| (rank, idx)))
        .collect();
    ranked.sort();

    for (_, idx) in ranked {
        meter.tick()?;
        let u = &factors[idx];
        let dv = product(
            factors
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, f)| f.clone()),
        );
        // `dv` must integrate directly; nested transforms happen on `v du` only.
        let Some(v) = integrate_inner(&dv, var, meter, TRANSFORM_DEPTH_LIMIT)? else {
            continue;
        };
        let du = simplify_fully(differentiate(var, u));
        let v_du = simplify_fully(simplify_mul(v.clone(), du));
        if v_du.size() > TRANSFORM_SIZE_LIMIT {
            continue;
        }
        let Some(rest) = integrate_inner(&v_du, var, meter, depth + 1)? else {
            continue;
        };
        return Ok(Some(simplify_fully(simplify_sub(
            simplify_mul(u.clone(), v),
            rest,
        ))));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liate_prefers_log_then_algebraic() {
        let x = Expr::var("x");
        assert_eq!(factor_rank(&Expr::Log(x.clone().boxed()), "x"), Some(LiateRank::Log));
        assert_eq!(factor_rank(&x, "x"), Some(LiateRank::Algebraic));
        assert_eq!(
            factor_rank(&Expr::Exp(x.clone().boxed()), "x"),
            Some(LiateRank::Exponential)
        );
        assert!(LiateRank::Algebraic < LiateRank::Trig);
    }
}
