//! Symbolic integration by table lookup, linearity, substitution and parts.
//!
//! Strategies are tried from cheapest to most expensive. Every attempt ticks the
//! caller's [`Meter`], so a pathological integrand ends in a budget error
//! instead of an unbounded search.

mod common;
mod parts;
mod substitution;
mod table;

use std::fmt;

use tracing::debug;

use crate::config::Meter;
use crate::error::CasResult;
use crate::expr::{Expr, sum};
use crate::simplify::{simplify_fully, simplify_mul};

pub(crate) use common::{
    flatten_product, fresh_var_name, is_constant_wrt, split_constant_factors,
};

/// Largest intermediate integrand a transforming strategy will pursue.
pub const TRANSFORM_SIZE_LIMIT: usize = 96;
/// Nesting depth of substitution and by-parts transforms combined.
pub const TRANSFORM_DEPTH_LIMIT: usize = 6;
/// Nesting depth of repeated integration by parts.
pub const PARTS_DEPTH_LIMIT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Constant,
    Linearity,
    Table,
    Substitution,
    IntegrationByParts,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Constant => "constant",
            Strategy::Linearity => "linearity",
            Strategy::Table => "table",
            Strategy::Substitution => "substitution",
            Strategy::IntegrationByParts => "by parts",
        };
        f.write_str(name)
    }
}

/// Antiderivative of `expr` with respect to `var`, without a constant of integration.
///
/// Terms with no closed form are kept as an unevaluated [`Expr::Integral`]; the
/// only failures are budget overruns.
pub fn integrate(var: &str, expr: &Expr, meter: &Meter) -> CasResult<Expr> {
    meter.check_size(expr)?;
    let expr = simplify_fully(expr.clone());
    let mut closed = Vec::new();
    let mut open = Vec::new();
    for term in expr.terms() {
        match integrate_inner(&term, var, meter, 0)? {
            Some(result) => closed.push(result),
            None => open.push(term),
        }
    }
    if !open.is_empty() {
        debug!(var, remaining = open.len(), "integral left unevaluated");
        closed.push(Expr::Integral(simplify_fully(sum(open)).boxed(), var.to_string()));
    }
    let result = simplify_fully(sum(closed));
    meter.check_size(&result)?;
    Ok(result)
}

/// Closed-form antiderivative, or `None` when every strategy gives up.
pub(crate) fn integrate_inner(
    expr: &Expr,
    var: &str,
    meter: &Meter,
    depth: usize,
) -> CasResult<Option<Expr>> {
    meter.tick()?;
    let expr = simplify_fully(expr.clone());

    if is_constant_wrt(&expr, var) {
        return Ok(Some(report(
            Strategy::Constant,
            simplify_mul(expr, Expr::var(var)),
        )));
    }

    let terms = expr.terms();
    if terms.len() > 1 {
        let mut parts = Vec::with_capacity(terms.len());
        for term in &terms {
            match integrate_inner(term, var, meter, depth)? {
                Some(result) => parts.push(result),
                None => return Ok(None),
            }
        }
        return Ok(Some(report(Strategy::Linearity, simplify_fully(sum(parts)))));
    }

    let (coef, rest) = split_constant_factors(&expr, var);
    if !coef.is_one() {
        return Ok(integrate_inner(&rest, var, meter, depth)?
            .map(|result| simplify_mul(coef, result)));
    }

    if let Some(result) = table::integrate_known(&expr, var) {
        return Ok(Some(report(Strategy::Table, simplify_fully(result))));
    }

    if depth >= TRANSFORM_DEPTH_LIMIT || expr.size() > TRANSFORM_SIZE_LIMIT {
        return Ok(None);
    }

    if let Some(result) = substitution::integrate_by_substitution(&expr, var, meter, depth)? {
        return Ok(Some(report(Strategy::Substitution, result)));
    }

    if depth < PARTS_DEPTH_LIMIT {
        if let Some(result) = parts::integrate_by_parts(&expr, var, meter, depth)? {
            return Ok(Some(report(Strategy::IntegrationByParts, result)));
        }
    }

    Ok(None)
}

fn report(strategy: Strategy, result: Expr) -> Expr {
    debug!(%strategy, result = %result, "integrated");
    result
}
