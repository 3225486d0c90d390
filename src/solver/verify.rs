//! Numeric check that a candidate solution satisfies its equation.

use tracing::debug;

use crate::calculus::differentiate_n;
use crate::config::Meter;
use crate::error::{CasResult, ComputationError};
use crate::eval::{Environment, evaluate, free_variables};
use crate::expr::Expr;
use crate::simplify::{simplify_fully, substitute};

const SAMPLE_POINTS: [f64; 4] = [0.3, 0.7, 1.1, 1.7];
const SAMPLE_CONSTANTS: [f64; 4] = [0.8, -1.3, 0.6, 1.7];
const TOLERANCE: f64 = 1e-6;

/// Substitutes `solution` for `unknown` and its derivatives in `residual == 0`
/// and samples the result. Samples that leave the real domain are skipped.
pub(crate) fn verify_solution(
    residual: &Expr,
    unknown: &Expr,
    var: &str,
    order: u32,
    solution: &Expr,
    meter: &Meter,
) -> CasResult<()> {
    let mut substituted = residual.clone();
    for k in (1..=order).rev() {
        meter.tick()?;
        let target = Expr::derivative(unknown.clone(), var, k);
        let value = differentiate_n(var, solution, k);
        substituted = substitute(&substituted, &target, &value);
    }
    substituted = substitute(&substituted, unknown, solution);
    if substituted.contains_derivative() {
        return Err(ComputationError::failed(
            "solution leaves derivatives of the unknown behind",
        ));
    }
    let simplified = simplify_fully(substituted.clone());
    if simplified.is_zero() {
        return Ok(());
    }

    let mut env = Environment::new();
    let names = free_variables(&substituted);
    for (idx, name) in names.iter().filter(|n| n.as_str() != var).enumerate() {
        env.insert(name.clone(), SAMPLE_CONSTANTS[idx % SAMPLE_CONSTANTS.len()]);
    }

    let terms = substituted.terms();
    let mut checked = 0usize;
    for point in SAMPLE_POINTS {
        meter.tick()?;
        env.insert(var.to_string(), point);
        let mut total = 0.0;
        let mut scale = 1.0f64;
        for term in &terms {
            let value = evaluate(term, &env)?;
            total += value;
            scale = scale.max(value.abs());
        }
        if !total.is_finite() {
            continue;
        }
        if total.abs() > TOLERANCE * scale {
            debug!(point, residual = total, "solution failed numeric check");
            return Err(ComputationError::failed(
                "candidate solution does not satisfy the equation",
            ));
        }
        checked += 1;
    }
    if checked == 0 {
        return Err(ComputationError::failed(
            "solution could not be evaluated at any sample point",
        ));
    }
    Ok(())
}
