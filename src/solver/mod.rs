//! Closed-form solving of equations in an unknown function `y(x)`.

pub mod isolate;
mod ode;
mod verify;

use tracing::debug;

use crate::config::Meter;
use crate::error::{CasResult, ComputationError};
use crate::expr::{Expr, ExpressionPair, sub, zero};
use crate::simplify::simplify_fully;

pub use isolate::isolate;

/// Solves `lhs = rhs` for `unknown`, which must have the form `y(x)`.
///
/// Differential equations go through the ODE strategies; equations without
/// derivatives are solved algebraically. Explicit results are verified
/// numerically before they are returned.
pub fn solve_closed_form(
    lhs: &Expr,
    rhs: &Expr,
    unknown: &Expr,
    meter: &Meter,
) -> CasResult<ExpressionPair> {
    let Expr::Apply(_, arg) = unknown else {
        return Err(ComputationError::failed("unknown must be a function application"));
    };
    let Expr::Variable(var) = &**arg else {
        return Err(ComputationError::failed("unknown must be applied to a variable"));
    };
    meter.check_size(lhs)?;
    meter.check_size(rhs)?;
    meter.tick()?;

    let residual = simplify_fully(sub(lhs.clone(), rhs.clone()));
    let order = residual
        .derivatives()
        .into_iter()
        .filter_map(|d| match d {
            Expr::Derivative(inner, v, order) if **inner == *unknown && v == var => Some(*order),
            _ => None,
        })
        .max()
        .unwrap_or(0);
    debug!(order, residual = %residual, "closed-form solve");

    if order == 0 {
        if residual.contains_derivative() {
            return Err(ComputationError::not_closed(
                "derivatives of another function or variable",
            ));
        }
        let solution = isolate(&residual, &zero(), unknown)
            .ok_or_else(|| ComputationError::not_closed("unknown cannot be isolated"))?;
        return Ok(ExpressionPair::new(unknown.clone(), solution));
    }

    ode::Ode {
        residual,
        unknown: unknown.clone(),
        var: var.clone(),
        order,
        meter,
    }
    .solve()
}
