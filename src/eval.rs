//! Floating-point evaluation of expression trees.

use std::collections::{BTreeSet, HashMap};

use num_traits::ToPrimitive;

use crate::error::{CasResult, ComputationError};
use crate::expr::Expr;

/// Variable bindings for [`evaluate`].
pub type Environment = HashMap<String, f64>;

/// Evaluates `expr` with every free variable looked up in `env`.
///
/// Domain errors such as `log` of a negative number produce `NaN` rather than an
/// error; callers sampling at many points skip those samples.
pub fn evaluate(expr: &Expr, env: &Environment) -> CasResult<f64> {
    let value = match expr {
        Expr::Variable(name) => *env
            .get(name)
            .ok_or_else(|| ComputationError::failed(format!("unbound variable `{name}`")))?,
        Expr::Constant(c) => c
            .to_f64()
            .ok_or_else(|| ComputationError::failed("constant out of floating-point range"))?,
        Expr::Add(a, b) => evaluate(a, env)? + evaluate(b, env)?,
        Expr::Sub(a, b) => evaluate(a, env)? - evaluate(b, env)?,
        Expr::Mul(a, b) => evaluate(a, env)? * evaluate(b, env)?,
        Expr::Div(a, b) => evaluate(a, env)? / evaluate(b, env)?,
        Expr::Pow(base, exp) => power(evaluate(base, env)?, exp, env)?,
        Expr::Neg(a) => -evaluate(a, env)?,
        Expr::Sin(a) => evaluate(a, env)?.sin(),
        Expr::Cos(a) => evaluate(a, env)?.cos(),
        Expr::Tan(a) => evaluate(a, env)?.tan(),
        Expr::Atan(a) => evaluate(a, env)?.atan(),
        Expr::Sinh(a) => evaluate(a, env)?.sinh(),
        Expr::Cosh(a) => evaluate(a, env)?.cosh(),
        Expr::Exp(a) => evaluate(a, env)?.exp(),
        Expr::Log(a) => evaluate(a, env)?.ln(),
        Expr::Abs(a) => evaluate(a, env)?.abs(),
        Expr::Apply(name, _) => {
            return Err(ComputationError::failed(format!(
                "cannot evaluate unknown function `{name}`"
            )));
        }
        Expr::Derivative(..) | Expr::Integral(..) => {
            return Err(ComputationError::failed(
                "cannot evaluate an unevaluated derivative or integral",
            ));
        }
    };
    Ok(value)
}

/// Integer exponents use `powi` so negative bases stay real.
fn power(base: f64, exp: &Expr, env: &Environment) -> CasResult<f64> {
    if let Some(k) = exp
        .as_constant()
        .filter(|c| c.is_integer())
        .and_then(|c| c.to_integer().to_i32())
    {
        return Ok(base.powi(k));
    }
    Ok(base.powf(evaluate(exp, env)?))
}

/// Names of the free variables in `expr`, sorted.
pub fn free_variables(expr: &Expr) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    collect_variables(expr, &mut out);
    out
}

fn collect_variables(expr: &Expr, out: &mut BTreeSet<String>) {
    if let Expr::Variable(name) = expr {
        out.insert(name.clone());
    }
    for child in expr.children() {
        collect_variables(child, out);
    }
}

/// Relative-or-absolute closeness used when comparing sampled values.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= tolerance * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{exp, mul, pow};

    #[test]
    fn evaluates_with_bindings() {
        let env = Environment::from([("x".to_string(), 2.0)]);
        let expr = mul(Expr::integer(3), pow(Expr::var("x"), Expr::integer(2)));
        assert_eq!(evaluate(&expr, &env), Ok(12.0));
    }

    #[test]
    fn negative_base_with_integer_exponent() {
        let env = Environment::from([("x".to_string(), -2.0)]);
        let expr = pow(Expr::var("x"), Expr::integer(3));
        assert_eq!(evaluate(&expr, &env), Ok(-8.0));
    }

    #[test]
    fn unbound_variable_is_an_error() {
        assert!(evaluate(&exp(Expr::var("t")), &Environment::new()).is_err());
    }
}
