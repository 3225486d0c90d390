//! The computer-algebra interface the step pipeline consumes.

use crate::calculus;
use crate::config::Budget;
use crate::error::{CasResult, Result};
use crate::expr::{Expr, ExpressionPair};
use crate::format;
use crate::parser::parse_expr;
use crate::simplify::{simplify_fully, substitute};
use crate::solver::solve_closed_form;
use crate::symbols::SymbolTable;

/// Symbolic primitives used by the pipeline. Implementations must be reentrant.
pub trait CasProvider {
    /// `order`-th derivative with respect to `var`.
    fn differentiate(&self, expr: &Expr, var: &str, order: u32) -> CasResult<Expr>;

    /// Antiderivative without a constant of integration; a part with no closed
    /// form is returned as an unevaluated integral rather than an error.
    fn integrate(&self, expr: &Expr, var: &str) -> CasResult<Expr>;

    fn simplify(&self, expr: &Expr) -> CasResult<Expr>;

    /// Replaces every occurrence of the sub-tree `target`.
    fn substitute(&self, expr: &Expr, target: &Expr, value: &Expr) -> CasResult<Expr>;

    /// `unknown = expr` when explicit, an implicit equation otherwise.
    fn solve_closed_form(&self, lhs: &Expr, rhs: &Expr, unknown: &Expr)
    -> CasResult<ExpressionPair>;

    /// Deterministic LaTeX.
    fn render(&self, expr: &Expr) -> String;

    fn build_expression(&self, text: &str, symbols: &SymbolTable) -> Result<Expr>;
}

/// The bundled provider: exact rational arithmetic with a per-call [`Budget`].
#[derive(Clone, Debug, Default)]
pub struct SymbolicCas {
    budget: Budget,
}

impl SymbolicCas {
    pub fn new(budget: Budget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }
}

impl CasProvider for SymbolicCas {
    fn differentiate(&self, expr: &Expr, var: &str, order: u32) -> CasResult<Expr> {
        let meter = self.budget.start();
        meter.check_size(expr)?;
        meter.tick()?;
        let result = simplify_fully(calculus::differentiate_n(var, expr, order));
        meter.check_size(&result)?;
        Ok(result)
    }

    fn integrate(&self, expr: &Expr, var: &str) -> CasResult<Expr> {
        let meter = self.budget.start();
        calculus::integrate(var, expr, &meter)
    }

    fn simplify(&self, expr: &Expr) -> CasResult<Expr> {
        let meter = self.budget.start();
        meter.check_size(expr)?;
        let result = simplify_fully(expr.clone());
        meter.check_size(&result)?;
        Ok(result)
    }

    fn substitute(&self, expr: &Expr, target: &Expr, value: &Expr) -> CasResult<Expr> {
        let meter = self.budget.start();
        meter.check_size(expr)?;
        let result = substitute(expr, target, value);
        meter.check_size(&result)?;
        Ok(result)
    }

    fn solve_closed_form(
        &self,
        lhs: &Expr,
        rhs: &Expr,
        unknown: &Expr,
    ) -> CasResult<ExpressionPair> {
        let meter = self.budget.start();
        solve_closed_form(lhs, rhs, unknown, &meter)
    }

    fn render(&self, expr: &Expr) -> String {
        format::latex(expr)
    }

    fn build_expression(&self, text: &str, symbols: &SymbolTable) -> Result<Expr> {
        parse_expr(text, symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComputationError;

    #[test]
    fn oversized_input_exceeds_budget() {
        let cas = SymbolicCas::new(Budget {
            max_expr_size: 1,
            ..Budget::default()
        });
        let expr = crate::expr::add(Expr::var("x"), Expr::integer(1));
        assert!(matches!(
            cas.simplify(&expr),
            Err(ComputationError::BudgetExceeded { .. })
        ));
    }

    #[test]
    fn integration_keeps_unclosed_part() {
        let cas = SymbolicCas::default();
        let x = Expr::var("x");
        let integrand = Expr::Exp(crate::expr::pow(x, Expr::integer(2)).boxed());
        let result = cas.integrate(&integrand, "x").expect("within budget");
        assert!(result.contains_integral());
    }
}
