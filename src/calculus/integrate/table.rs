use num_traits::{One, Signed};

use super::common::{flatten_product, linear_parts};
use crate::calculus::differentiate;
use crate::expr::{Expr, Rational, add, div, exp, log, mul, neg, pow, rational, sub};
use crate::simplify::{simplify_fully, simplify_sub};

/// Antiderivatives read straight off a table of elementary forms with affine arguments.
pub(super) fn integrate_known(expr: &Expr, var: &str) -> Option<Expr> {
    if let Some(result) = integrate_exp_trig_product(expr, var) {
        return Some(result);
    }
    match expr {
        Expr::Variable(v) if v == var => Some(div(
            pow(expr.clone(), Expr::integer(2)),
            Expr::integer(2),
        )),
        Expr::Pow(base, exponent) => integrate_power(base, exponent, var),
        Expr::Exp(arg) => over_slope(arg, var, |u| exp(u.clone())),
        Expr::Sin(arg) => over_slope(arg, var, |u| neg(Expr::Cos(u.clone().boxed()))),
        Expr::Cos(arg) => over_slope(arg, var, |u| Expr::Sin(u.clone().boxed())),
        Expr::Tan(arg) => over_slope(arg, var, |u| neg(log(Expr::Cos(u.clone().boxed())))),
        Expr::Sinh(arg) => over_slope(arg, var, |u| Expr::Cosh(u.clone().boxed())),
        Expr::Cosh(arg) => over_slope(arg, var, |u| Expr::Sinh(u.clone().boxed())),
        Expr::Log(arg) => over_slope(arg, var, |u| sub(mul(u.clone(), log(u.clone())), u.clone())),
        Expr::Atan(arg) => over_slope(arg, var, |u| {
            let square = pow(u.clone(), Expr::integer(2));
            sub(
                mul(u.clone(), Expr::Atan(u.clone().boxed())),
                div(log(add(Expr::integer(1), square)), Expr::integer(2)),
            )
        }),
        _ => None,
    }
}

/// `F(a*x + b) / a` for an affine argument.
fn over_slope(arg: &Expr, var: &str, antiderivative: impl Fn(&Expr) -> Expr) -> Option<Expr> {
    let (slope, _) = linear_parts(arg, var)?;
    Some(div(antiderivative(arg), slope))
}

fn integrate_power(base: &Expr, exponent: &Expr, var: &str) -> Option<Expr> {
    if let Some(n) = exponent.as_constant() {
        if n == &-Rational::one() {
            if let Some(result) = integrate_reciprocal_quadratic(base, var) {
                return Some(result);
            }
        }
        if n == &Rational::from_integer((-2).into()) {
            if let Expr::Cos(arg) = base {
                return over_slope(arg, var, |u| Expr::Tan(u.clone().boxed()));
            }
        }
        let (slope, _) = linear_parts(base, var)?;
        if n == &-Rational::one() {
            return Some(div(log(base.clone()), slope));
        }
        let raised = n + Rational::one();
        return Some(div(
            pow(base.clone(), Expr::Constant(raised.clone())),
            mul(Expr::Constant(raised), slope),
        ));
    }
    // c^(a*x + b) for a positive constant base.
    let c = base.as_constant().filter(|c| c.is_positive() && !c.is_one())?;
    let (slope, _) = linear_parts(exponent, var)?;
    Some(div(
        pow(base.clone(), exponent.clone()),
        mul(slope, log(Expr::Constant(c.clone()))),
    ))
}

/// `1/(p*x^2 + q)` with positive rationals `p`, `q` integrates to an arctangent.
fn integrate_reciprocal_quadratic(base: &Expr, var: &str) -> Option<Expr> {
    let slope = simplify_fully(differentiate(var, base));
    let (twice_p, zero) = linear_parts(&slope, var)?;
    if !zero.is_zero() {
        return None;
    }
    let p = twice_p.as_constant()? / Rational::from_integer(2.into());
    let x = Expr::var(var);
    let q = simplify_fully(simplify_sub(
        base.clone(),
        mul(Expr::Constant(p.clone()), pow(x.clone(), Expr::integer(2))),
    ));
    let q = q.as_constant()?.clone();
    if !p.is_positive() || !q.is_positive() {
        return None;
    }
    let half = Expr::Constant(rational(1, 2));
    let scale = pow(Expr::Constant(&p / &q), half.clone());
    let norm = pow(Expr::Constant(&p * &q), half);
    Some(div(Expr::Atan(mul(scale, x).boxed()), norm))
}

/// `e^(a*x+b) * sin(c*x+d)` and `e^(a*x+b) * cos(c*x+d)`.
fn integrate_exp_trig_product(expr: &Expr, var: &str) -> Option<Expr> {
    let factors = flatten_product(expr);
    let [first, second] = factors.as_slice() else {
        return None;
    };
    let (u, trig) = match (first, second) {
        (Expr::Exp(u), other) | (other, Expr::Exp(u)) => (u, other),
        _ => return None,
    };
    let (a, _) = linear_parts(u, var)?;
    let (is_sin, v) = match trig {
        Expr::Sin(v) => (true, v),
        Expr::Cos(v) => (false, v),
        _ => return None,
    };
    let (c, _) = linear_parts(v, var)?;
    let sin_v = Expr::Sin(v.clone());
    let cos_v = Expr::Cos(v.clone());
    let numerator = if is_sin {
        sub(mul(a.clone(), sin_v), mul(c.clone(), cos_v))
    } else {
        add(mul(a.clone(), cos_v), mul(c.clone(), sin_v))
    };
    let denominator = add(pow(a, Expr::integer(2)), pow(c, Expr::integer(2)));
    Some(div(mul(exp((**u).clone()), numerator), denominator))
}
