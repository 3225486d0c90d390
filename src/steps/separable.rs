//! Separation-of-variables walk-through for `dy/dx = f(x)·g(y)`.

use tracing::{debug, warn};

use super::{CONSTANT_HINT, Narration, StepKind, StepLog};
use crate::calculus::integrate::flatten_product;
use crate::cas::CasProvider;
use crate::error::{ComputationError, Result};
use crate::expr::{Expr, ExpressionPair, div, one, product};

/// `f(x)` and `g(y)`, with `y` written as a plain variable.
struct Separation {
    f: Expr,
    g: Expr,
}

pub(crate) fn narrate<C: CasProvider>(
    ctx: &Narration<'_, C>,
    log: &mut StepLog,
) -> Option<ExpressionPair> {
    match walk(ctx, log) {
        Ok(solution) => solution,
        Err(err) => {
            warn!(%err, "separable branch stopped");
            log.push_error(&err);
            None
        }
    }
}

fn walk<C: CasProvider>(
    ctx: &Narration<'_, C>,
    log: &mut StepLog,
) -> Result<Option<ExpressionPair>> {
    let cas = ctx.cas;
    let x = ctx.symbols.independent();
    let y = ctx.symbols.dependent();

    log.push_with_hint(
        StepKind::Theory,
        format!("\\frac{{d{y}}}{{d{x}}} = f({x}) \\cdot g({y})"),
        format!(
            "In a separable equation every {y} can be moved to one side and every {x} to the other."
        ),
        format!("Separate the variables: {y} and d{y} on one side, {x} and d{x} on the other."),
    );

    match separate(ctx)? {
        Some(Separation { f, g }) => {
            let dy = cas.simplify(&div(one(), g))?;
            log.push(
                StepKind::Calculation,
                format!("{} \\, d{y} = {} \\, d{x}", cas.render(&dy), cas.render(&f)),
                format!("Divide by g({y}) and multiply by d{x} to separate the variables."),
            );
            let integrals = ExpressionPair::new(
                Expr::Integral(dy.boxed(), y.to_string()),
                Expr::Integral(f.boxed(), x.to_string()),
            );
            log.push(
                StepKind::Calculation,
                ctx.render_pair(&integrals),
                "Integrate both sides.",
            );
        }
        None => {
            log.push(
                StepKind::Calculation,
                format!("\\frac{{d{y}}}{{g({y})}} = f({x}) \\, d{x}"),
                format!(
                    "The right side does not split into a product f({x})·g({y}), \
                     so the separation is written generically."
                ),
            );
            log.push(
                StepKind::Calculation,
                format!("\\int \\frac{{d{y}}}{{g({y})}} = \\int f({x}) \\, d{x}"),
                "Integrate both sides.",
            );
        }
    }

    match cas.solve_closed_form(&ctx.pair.lhs, &ctx.pair.rhs, &ctx.unknown()) {
        Ok(solution) => {
            let explicit = solution.lhs == ctx.unknown();
            let explanation = if explicit {
                format!("Evaluating both integrals and solving for {y} gives the general solution.")
            } else {
                "Evaluating both integrals gives the general solution in implicit form.".to_string()
            };
            log.push_with_hint(
                StepKind::Solution,
                ctx.render_pair(&solution),
                explanation,
                CONSTANT_HINT,
            );
            Ok(Some(solution))
        }
        Err(err) => {
            debug!(%err, "separable closed form not found");
            let explanation = match err {
                ComputationError::BudgetExceeded { .. } | ComputationError::TimedOut(_) => {
                    "Evaluating the integrals ran past the computation limits, \
                     so the solution stays in the integral form above."
                }
                ComputationError::Failed(_) | ComputationError::NotClosed(_) => {
                    "At least one of the two integrals has no elementary closed form, \
                     so the solution stays in the integral form above."
                }
            };
            log.push(StepKind::Warning, "\\text{No closed form}", explanation);
            Ok(None)
        }
    }
}

/// Splits the right side into an `x`-only and a `y`-only factor.
fn separate<C: CasProvider>(ctx: &Narration<'_, C>) -> Result<Option<Separation>> {
    let cas = ctx.cas;
    let x = ctx.symbols.independent();
    let y = Expr::var(ctx.symbols.dependent());
    let slope = cas.simplify(&ctx.pair.rhs)?;
    let slope = cas.substitute(&slope, &ctx.unknown(), &y)?;

    let mut f = Vec::new();
    let mut g = Vec::new();
    for factor in flatten_product(&slope) {
        match (factor.contains_var(x), factor.contains(&y)) {
            (true, true) => return Ok(None),
            (false, true) => g.push(factor),
            _ => f.push(factor),
        }
    }
    let g = cas.simplify(&product(g))?;
    if g.is_zero() || slope.contains_derivative() {
        return Ok(None);
    }
    Ok(Some(Separation {
        f: cas.simplify(&product(f))?,
        g,
    }))
}
