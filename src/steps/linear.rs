//! Integrating-factor walk-through for `y' + P(x) y = Q(x)`.

use tracing::{debug, warn};

use super::{CONSTANT_HINT, Narration, StepKind, StepLog};
use crate::cas::CasProvider;
use crate::error::{ComputationError, Result};
use crate::expr::{Expr, ExpressionPair, add, div, exp, mul, neg, one, sum};
use crate::format::pretty;
use crate::symbols::SymbolTable;

const STANDARD_FORM_HINT: &str =
    "Try writing the equation in the standard form y' + P(x)·y = Q(x).";

/// `P` and `Q` of the standard form `y' + P(x)·y = Q(x)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoefficientPair {
    pub p: Expr,
    pub q: Expr,
}

impl CoefficientPair {
    /// Collects `a(x) y' + b(x) y + r(x) = 0` from `lhs - rhs` and divides by `a`.
    pub fn extract(
        pair: &ExpressionPair,
        symbols: &SymbolTable,
        cas: &impl CasProvider,
    ) -> Result<Self> {
        let slope = symbols.unknown_derivative(1);
        let unknown = symbols.unknown();
        let expanded = cas.simplify(&pair.difference())?;

        let (mut a, mut b, mut r) = (Vec::new(), Vec::new(), Vec::new());
        for term in expanded.terms() {
            if term.contains(&slope) {
                a.push(cas.substitute(&term, &slope, &one())?);
            } else if term.contains(&unknown) {
                b.push(cas.substitute(&term, &unknown, &one())?);
            } else {
                r.push(term);
            }
        }

        let a = cas.simplify(&sum(a))?;
        if a.is_zero() {
            return Err(ComputationError::failed("the coefficient of y' is zero").into());
        }
        let p = cas.simplify(&div(sum(b), a.clone()))?;
        let q = cas.simplify(&div(neg(sum(r)), a.clone()))?;
        for coefficient in [&a, &p, &q] {
            if coefficient.contains_function(symbols.dependent())
                || coefficient.contains_derivative()
            {
                return Err(ComputationError::failed(format!(
                    "coefficient {} still depends on {}",
                    pretty(coefficient),
                    symbols.dependent()
                ))
                .into());
            }
        }
        Ok(Self { p, q })
    }
}

pub(crate) fn narrate<C: CasProvider>(
    ctx: &Narration<'_, C>,
    log: &mut StepLog,
) -> Option<ExpressionPair> {
    match walk(ctx, log) {
        Ok(solution) => solution,
        Err(err) => {
            warn!(%err, "first-order linear branch stopped");
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
    let y = ctx.unknown();
    let y_prime = ctx.symbols.unknown_derivative(1);

    log.push_with_hint(
        StepKind::Theory,
        "y' + P(x) \\cdot y = Q(x)",
        "A first order linear equation can be written in the standard form y' + P(x)·y = Q(x).",
        "We need to identify P(x) and Q(x) in this equation.",
    );

    let CoefficientPair { p, q } = match CoefficientPair::extract(ctx.pair, ctx.symbols, cas) {
        Ok(coefficients) => coefficients,
        Err(err) => {
            warn!(%err, "coefficient extraction failed");
            log.push_error_with_hint(&err, STANDARD_FORM_HINT);
            return Ok(None);
        }
    };
    debug!(p = %pretty(&p), q = %pretty(&q), "extracted coefficients");
    log.push(
        StepKind::Calculation,
        format!("P(x) = {}, \\quad Q(x) = {}", cas.render(&p), cas.render(&q)),
        format!(
            "Comparing with the standard form gives P(x) = {} and Q(x) = {}.",
            pretty(&p),
            pretty(&q)
        ),
    );

    log.push_with_hint(
        StepKind::Theory,
        "\\mu(x) = e^{\\int P(x)\\,dx}",
        "The Integrating Factor μ(x) = e^(∫P(x)dx) turns the left side into an exact derivative.",
        "Multiplying by μ(x) makes the left side the derivative of a product.",
    );

    let integral_p = cas.integrate(&p, x)?;
    log.push(
        StepKind::Calculation,
        format!("\\int P(x)\\,dx = {}", cas.render(&integral_p)),
        format!("Integrate P(x) = {} with respect to {x}.", pretty(&p)),
    );
    let mu = cas.simplify(&exp(integral_p))?;
    log.push(
        StepKind::Calculation,
        format!("\\mu(x) = {}", cas.render(&mu)),
        format!("The integrating factor is μ(x) = {}.", pretty(&mu)),
    );

    let mu_p = cas.simplify(&mul(mu.clone(), p))?;
    let mu_q = cas.simplify(&mul(mu.clone(), q))?;
    let multiplied = ExpressionPair::new(
        add(mul(mu.clone(), y_prime), mul(mu_p, y.clone())),
        mu_q.clone(),
    );
    log.push(
        StepKind::Calculation,
        ctx.render_pair(&multiplied),
        "Multiply both sides of the equation by μ(x).",
    );

    let product = mul(mu.clone(), y.clone());
    log.push_with_hint(
        StepKind::Insight,
        format!(
            "\\frac{{d}}{{d{x}}}\\left[{}\\right] = {}",
            cas.render(&product),
            cas.render(&mu_q)
        ),
        "The left side is exactly the derivative of μ(x)·y, by the product rule read backwards.",
        "This is the step the integrating factor was chosen for.",
    );

    let integral_mu_q = cas.integrate(&mu_q, x)?;
    log.push(
        StepKind::Calculation,
        format!("\\int \\mu(x) Q(x)\\,dx = {}", cas.render(&integral_mu_q)),
        format!("Integrate μ(x)·Q(x) = {} with respect to {x}.", pretty(&mu_q)),
    );
    let constant = Expr::var("C");
    let integrated = add(integral_mu_q, constant);
    log.push(
        StepKind::Calculation,
        ctx.render_pair(&ExpressionPair::new(product, integrated.clone())),
        "Integrating both sides adds an arbitrary constant C.",
    );

    let quotient = div(integrated, mu);
    log.push(
        StepKind::Calculation,
        ctx.render_pair(&ExpressionPair::new(y.clone(), quotient.clone())),
        "Divide both sides by μ(x) to isolate y.",
    );

    let solution = ExpressionPair::new(y, cas.simplify(&quotient)?);
    if solution.rhs.contains_integral() {
        log.push(
            StepKind::Warning,
            ctx.render_pair(&solution),
            "Part of the integral has no elementary closed form and is left unevaluated.",
        );
    }
    log.push_with_hint(
        StepKind::Solution,
        ctx.render_pair(&solution),
        format!("The general solution is y = {}.", pretty(&solution.rhs)),
        CONSTANT_HINT,
    );
    Ok(Some(solution))
}

