//! Strategies for ordinary differential equations in one unknown function.

use std::cmp::Ordering;

use num_traits::{Signed, Zero};
use tracing::debug;

use super::isolate::isolate;
use super::verify::verify_solution;
use crate::calculus::integrate::{flatten_product, fresh_var_name};
use crate::calculus::{differentiate, integrate};
use crate::config::Meter;
use crate::error::{CasResult, ComputationError};
use crate::expr::{
    Expr, ExpressionPair, Rational, add, div, exp, mul, neg, one, pow, product, rational, sub, sum,
};
use crate::polynomial::Poly;
use crate::simplify::{
    simplify_div, simplify_fully, simplify_mul, simplify_sub, split_coeff, substitute,
    substitute_var,
};

/// An equation `residual == 0` in the unknown `name(var)`.
pub(crate) struct Ode<'m, 'b> {
    pub residual: Expr,
    pub unknown: Expr,
    pub var: String,
    pub order: u32,
    pub meter: &'m Meter<'b>,
}

/// `Σ coeffs[k] · y^(k) + remainder == 0`.
#[derive(Debug, Clone)]
pub(crate) struct LinearForm {
    pub coeffs: Vec<Expr>,
    pub remainder: Expr,
}

impl LinearForm {
    fn constant_coefficients(&self) -> Option<Vec<Rational>> {
        self.coeffs.iter().map(|c| c.as_constant().cloned()).collect()
    }
}

impl Ode<'_, '_> {
    fn derivative_of_order(&self, k: u32) -> Expr {
        if k == 0 {
            self.unknown.clone()
        } else {
            Expr::derivative(self.unknown.clone(), self.var.clone(), k)
        }
    }

    fn depends_on_unknown(&self, expr: &Expr) -> bool {
        expr.contains(&self.unknown) || expr.contains_derivative()
    }

    /// Reads the equation as linear in the unknown and its derivatives.
    pub fn linear_form(&self) -> Option<LinearForm> {
        let mut coeffs: Vec<Vec<Expr>> = vec![Vec::new(); self.order as usize + 1];
        let mut remainder = Vec::new();
        for term in self.residual.terms() {
            let Some(k) = (0..=self.order)
                .rev()
                .find(|k| term.contains(&self.derivative_of_order(*k)))
            else {
                remainder.push(term);
                continue;
            };
            let target = self.derivative_of_order(k);
            let coefficient = simplify_fully(substitute(&term, &target, &one()));
            if self.depends_on_unknown(&coefficient) {
                return None;
            }
            // y^2 and exp(y) also lose the unknown under y -> 1; doubling exposes them.
            let two = Expr::integer(2);
            let doubled = simplify_fully(simplify_sub(
                substitute(&term, &target, &two),
                simplify_mul(two, coefficient.clone()),
            ));
            if !doubled.is_zero() {
                return None;
            }
            coeffs[k as usize].push(coefficient);
        }
        let coeffs: Vec<Expr> = coeffs
            .into_iter()
            .map(|parts| simplify_fully(sum(parts)))
            .collect();
        if coeffs.last().is_none_or(Expr::is_zero) {
            return None;
        }
        Some(LinearForm {
            coeffs,
            remainder: simplify_fully(sum(remainder)),
        })
    }

    pub fn solve(&self) -> CasResult<ExpressionPair> {
        if let Some(form) = self.linear_form() {
            if self.order == 1 {
                return self.solve_first_order_linear(&form);
            }
            if let Some(coeffs) = form.constant_coefficients() {
                return self.solve_constant_coefficients(&coeffs, &form);
            }
            return Err(ComputationError::not_closed(
                "linear equation with variable coefficients",
            ));
        }
        if self.order == 1 {
            return self.solve_separable();
        }
        Err(ComputationError::not_closed(format!(
            "nonlinear equation of order {}",
            self.order
        )))
    }

    /// `y = (∫ μ Q dx + C) / μ` with `μ = exp(∫ P dx)`.
    fn solve_first_order_linear(&self, form: &LinearForm) -> CasResult<ExpressionPair> {
        let p = simplify_div(form.coeffs[0].clone(), form.coeffs[1].clone());
        let q = simplify_div(neg(form.remainder.clone()), form.coeffs[1].clone());
        let integral_p = integrate(&self.var, &p, self.meter)?;
        let mu = simplify_fully(exp(integral_p));
        let integral_mu_q = integrate(&self.var, &simplify_mul(mu.clone(), q), self.meter)?;
        if mu.contains_integral() || integral_mu_q.contains_integral() {
            return Err(ComputationError::not_closed(
                "integrating factor leads to an integral without closed form",
            ));
        }
        let constant = Expr::var(self.constant_names(1).remove(0));
        let solution = simplify_fully(div(add(integral_mu_q, constant), mu));
        debug!(solution = %solution, "first-order linear solution");
        self.checked(solution)
    }

    /// `y' = f(x) g(y)` integrated as `∫ dy / g(y) = ∫ f(x) dx + C`.
    fn solve_separable(&self) -> CasResult<ExpressionPair> {
        let derivative = self.derivative_of_order(1);
        let mut slope_coeff = Vec::new();
        let mut rest = Vec::new();
        for term in self.residual.terms() {
            if term.contains(&derivative) {
                let coefficient = simplify_fully(substitute(&term, &derivative, &one()));
                if coefficient.contains_derivative() {
                    return Err(ComputationError::not_closed(
                        "derivative appears nonlinearly",
                    ));
                }
                slope_coeff.push(coefficient);
            } else {
                rest.push(term);
            }
        }
        let slope_coeff = simplify_fully(sum(slope_coeff));
        if slope_coeff.is_zero() || slope_coeff.contains(&self.unknown) {
            return Err(ComputationError::not_closed(
                "derivative cannot be isolated",
            ));
        }
        let slope = simplify_div(neg(sum(rest)), slope_coeff);

        let dependent = match &self.unknown {
            Expr::Apply(name, _) => name.clone(),
            _ => "y".to_string(),
        };
        let y_name = fresh_var_name(&slope, &dependent);
        let y = Expr::var(&y_name);
        let slope = simplify_fully(substitute(&slope, &self.unknown, &y));

        let (f, g) = separate(&slope, &self.var, &y_name).ok_or_else(|| {
            ComputationError::not_closed("right-hand side does not separate into f(x)·g(y)")
        })?;
        debug!(f = %f, g = %g, "separated variables");

        let lhs = integrate(&y_name, &simplify_div(one(), g), self.meter)?;
        let rhs = integrate(&self.var, &f, self.meter)?;
        if lhs.contains_integral() || rhs.contains_integral() {
            return Err(ComputationError::not_closed(
                "separated integrals have no closed form",
            ));
        }
        let constant_name = self.constant_names(1).remove(0);
        let rhs = add(rhs, Expr::var(&constant_name));

        if let Some(explicit) = isolate(&lhs, &rhs, &y) {
            let explicit = simplify_fully(absorb_constant(explicit, &constant_name));
            match self.checked(explicit) {
                Ok(pair) => return Ok(pair),
                Err(err) => debug!(%err, "explicit separable solution rejected"),
            }
        }
        Ok(ExpressionPair::new(
            simplify_fully(substitute_var(&lhs, &y_name, &self.unknown)),
            simplify_fully(rhs),
        ))
    }

    /// Characteristic roots give the homogeneous basis; a second-order forcing
    /// term is handled by variation of parameters.
    fn solve_constant_coefficients(
        &self,
        coeffs: &[Rational],
        form: &LinearForm,
    ) -> CasResult<ExpressionPair> {
        let characteristic = Poly::from_coeffs(coeffs.iter().cloned());
        let basis = homogeneous_basis(&characteristic, &self.var)?;
        if basis.len() != self.order as usize {
            return Err(ComputationError::not_closed(
                "characteristic polynomial has no closed-form roots",
            ));
        }
        let names = self.constant_names(self.order);
        let homogeneous = sum(names
            .iter()
            .zip(&basis)
            .map(|(name, y_k)| mul(Expr::var(name), y_k.clone())));

        let solution = if form.remainder.is_zero() {
            homogeneous
        } else if self.order == 2 {
            let leading = Expr::Constant(coeffs[2].clone());
            let forcing = simplify_div(neg(form.remainder.clone()), leading);
            let particular = self.variation_of_parameters(&basis[0], &basis[1], &forcing)?;
            add(homogeneous, particular)
        } else {
            return Err(ComputationError::not_closed(format!(
                "forced constant-coefficient equation of order {}",
                self.order
            )));
        };
        self.checked(simplify_fully(solution))
    }

    /// `y_p = -y1 ∫ y2 g / W dx + y2 ∫ y1 g / W dx`.
    fn variation_of_parameters(&self, y1: &Expr, y2: &Expr, forcing: &Expr) -> CasResult<Expr> {
        let wronskian = simplify_fully(sub(
            mul(y1.clone(), differentiate(&self.var, y2)),
            mul(differentiate(&self.var, y1), y2.clone()),
        ));
        if wronskian.is_zero() {
            return Err(ComputationError::failed("basis solutions are dependent"));
        }
        debug!(wronskian = %wronskian, "variation of parameters");
        let u1 = integrate(
            &self.var,
            &simplify_div(simplify_mul(y2.clone(), forcing.clone()), wronskian.clone()),
            self.meter,
        )?;
        let u2 = integrate(
            &self.var,
            &simplify_div(simplify_mul(y1.clone(), forcing.clone()), wronskian),
            self.meter,
        )?;
        if u1.contains_integral() || u2.contains_integral() {
            return Err(ComputationError::not_closed(
                "variation of parameters leads to an integral without closed form",
            ));
        }
        Ok(simplify_fully(simplify_sub(
            simplify_mul(y2.clone(), u2),
            simplify_mul(y1.clone(), u1),
        )))
    }

    fn checked(&self, solution: Expr) -> CasResult<ExpressionPair> {
        self.meter.check_size(&solution)?;
        verify_solution(
            &self.residual,
            &self.unknown,
            &self.var,
            self.order,
            &solution,
            self.meter,
        )?;
        Ok(ExpressionPair::new(self.unknown.clone(), solution))
    }

    /// `C` for a single constant, `C1..Cn` otherwise.
    fn constant_names(&self, count: u32) -> Vec<String> {
        let base = fresh_var_name(&self.residual, "C");
        if count == 1 {
            vec![base]
        } else {
            (1..=count).map(|i| format!("{base}{i}")).collect()
        }
    }
}

/// Splits `slope` into `(f(x), g(y))` with `slope == f * g`.
fn separate(slope: &Expr, x: &str, y: &str) -> Option<(Expr, Expr)> {
    let mut f = Vec::new();
    let mut g = Vec::new();
    for factor in flatten_product(slope) {
        match (factor.contains_var(x), factor.contains_var(y)) {
            (true, true) => return None,
            (false, true) => g.push(factor),
            _ => f.push(factor),
        }
    }
    let g = simplify_fully(product(g));
    if g.is_zero() {
        return None;
    }
    Some((simplify_fully(product(f)), g))
}

/// Basis functions for the roots of a characteristic polynomial, ordered by
/// root magnitude with positive roots first.
fn homogeneous_basis(characteristic: &Poly, var: &str) -> CasResult<Vec<Expr>> {
    let x = Expr::var(var);
    let decomposition = characteristic.rational_roots();
    let mut roots = decomposition.roots;
    roots.sort_by(|(a, _), (b, _)| compare_roots(a, b));

    let mut basis = Vec::new();
    for (root, multiplicity) in roots {
        let exponential = simplify_fully(exp(mul(Expr::Constant(root), x.clone())));
        for k in 0..multiplicity {
            basis.push(simplify_fully(mul(
                pow(x.clone(), Expr::integer(k as u64)),
                exponential.clone(),
            )));
        }
    }

    let residual = decomposition.residual;
    match residual.degree() {
        None | Some(0) => {}
        Some(2) => basis.extend(quadratic_basis(&residual, &x)),
        Some(degree) => {
            return Err(ComputationError::not_closed(format!(
                "irreducible characteristic factor of degree {degree}"
            )));
        }
    }
    Ok(basis)
}

fn compare_roots(a: &Rational, b: &Rational) -> Ordering {
    a.abs()
        .cmp(&b.abs())
        .then_with(|| b.is_positive().cmp(&a.is_positive()))
}

/// Roots of `a r² + b r + c` with no rational root: two real exponentials or an
/// oscillating pair `e^(αx) cos(βx)`, `e^(αx) sin(βx)`.
fn quadratic_basis(quadratic: &Poly, x: &Expr) -> Vec<Expr> {
    let (a, b, c) = (quadratic.coeff(2), quadratic.coeff(1), quadratic.coeff(0));
    let discriminant = &b * &b - Rational::from_integer(4.into()) * &a * &c;
    let two_a = Rational::from_integer(2.into()) * &a;
    let alpha = Expr::Constant(-&b / &two_a);
    let half = Expr::Constant(rational(1, 2));
    let beta = simplify_fully(div(
        pow(Expr::Constant(discriminant.abs()), half),
        Expr::Constant(two_a.abs()),
    ));
    if discriminant.is_positive() {
        [add(alpha.clone(), beta.clone()), sub(alpha, beta)]
            .into_iter()
            .map(|r| simplify_fully(exp(mul(r, x.clone()))))
            .collect()
    } else {
        let envelope = exp(mul(alpha, x.clone()));
        let angle = mul(beta, x.clone());
        vec![
            simplify_fully(mul(envelope.clone(), Expr::Cos(angle.clone().boxed()))),
            simplify_fully(mul(envelope, Expr::Sin(angle.boxed()))),
        ]
    }
}

/// Folds a scaled or shifted arbitrary constant back into the constant itself:
/// `exp(F + k C)` becomes `C exp(F)`, and a lone `k C` term becomes `C`.
fn absorb_constant(expr: Expr, constant: &str) -> Expr {
    let expr = absorb_in_exponentials(&expr, constant);
    if occurrences(&expr, constant) != 1 {
        return expr;
    }
    rescale_constant(&expr, constant)
}

fn absorb_in_exponentials(expr: &Expr, constant: &str) -> Expr {
    let expr = expr.map_children(|child| absorb_in_exponentials(child, constant));
    let Expr::Exp(arg) = &expr else {
        return expr;
    };
    let terms = arg.terms();
    let (with, without): (Vec<Expr>, Vec<Expr>) =
        terms.into_iter().partition(|t| t.contains_var(constant));
    let [term] = with.as_slice() else {
        return expr;
    };
    let (_, base) = split_coeff(term);
    if base != Expr::var(constant) {
        return expr;
    }
    simplify_mul(Expr::var(constant), simplify_fully(exp(sum(without))))
}

fn rescale_constant(expr: &Expr, constant: &str) -> Expr {
    let terms = expr.terms();
    if terms.len() > 1 {
        let rebuilt = terms.into_iter().map(|term| {
            let (coef, base) = split_coeff(&term);
            if base == Expr::var(constant) && !coef.is_zero() {
                base
            } else {
                rescale_constant(&term, constant)
            }
        });
        return sum(rebuilt);
    }
    expr.map_children(|child| rescale_constant(child, constant))
}

fn occurrences(expr: &Expr, name: &str) -> usize {
    match expr {
        Expr::Variable(v) if v == name => 1,
        _ => expr
            .children()
            .into_iter()
            .map(|c| occurrences(c, name))
            .sum(),
    }
}
