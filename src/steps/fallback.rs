//! Best-effort handling for types without a dedicated walk-through.

use tracing::debug;

use super::{Narration, StepKind, StepLog};
use crate::cas::CasProvider;
use crate::error::Error;
use crate::expr::{Expr, ExpressionPair, neg};
use crate::format::pretty;

pub(crate) fn narrate<C: CasProvider>(
    ctx: &Narration<'_, C>,
    log: &mut StepLog,
) -> Option<ExpressionPair> {
    let label = ctx.classification.label();
    let unsupported = Error::UnsupportedType(label.clone());
    debug!(%unsupported, "using fallback");
    log.push(
        StepKind::Warning,
        format!("\\text{{{label}}}"),
        format!("{label}: a step-by-step method for this type is not yet available."),
    );

    match ctx
        .cas
        .solve_closed_form(&ctx.pair.lhs, &ctx.pair.rhs, &ctx.unknown())
    {
        Ok(solution) => {
            let explanation = match other_branch(ctx, &solution) {
                Some(other) => format!(
                    "A closed-form solution was found directly. It is the principal root; \
                     {} = {} solves the equation as well.",
                    pretty(&solution.lhs),
                    pretty(&other)
                ),
                None => "A closed-form solution was found directly.".to_string(),
            };
            log.push_with_hint(
                StepKind::Solution,
                ctx.render_pair(&solution),
                explanation,
                "The constants are arbitrary; only initial conditions fix their values.",
            );
            Some(solution)
        }
        Err(err) => {
            debug!(%err, "no closed form for fallback");
            None
        }
    }
}

/// For an algebraic equation, the negated root when it also satisfies the equation.
fn other_branch<C: CasProvider>(
    ctx: &Narration<'_, C>,
    solution: &ExpressionPair,
) -> Option<Expr> {
    if ctx.classification.order != 0 {
        return None;
    }
    let other = ctx.cas.simplify(&neg(solution.rhs.clone())).ok()?;
    if other == solution.rhs {
        return None;
    }
    let residual = ctx
        .cas
        .substitute(&ctx.pair.difference(), &solution.lhs, &other)
        .ok()?;
    ctx.cas.simplify(&residual).ok()?.is_zero().then_some(other)
}
