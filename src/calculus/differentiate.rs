use crate::expr::{Expr, Rational, one, pow, zero};
use crate::simplify::{simplify, simplify_add, simplify_div, simplify_mul, simplify_neg, simplify_sub};
use num_traits::One;

pub fn differentiate(var: &str, expr: &Expr) -> Expr {
    Differentiator { var }.derive(expr)
}

/// Repeated differentiation; `order == 0` returns the simplified input.
pub fn differentiate_n(var: &str, expr: &Expr, order: u32) -> Expr {
    let differentiator = Differentiator { var };
    (0..order).fold(simplify(expr.clone()), |acc, _| differentiator.derive(&acc))
}

struct Differentiator<'a> {
    var: &'a str,
}

impl Differentiator<'_> {
    fn derive(&self, expr: &Expr) -> Expr {
        if !expr.contains_var(self.var) {
            return zero();
        }
        match expr {
            Expr::Variable(_) => one(),
            Expr::Constant(_) => zero(),

            Expr::Add(a, b) => simplify_add(self.derive(a), self.derive(b)),
            Expr::Sub(a, b) => simplify_sub(self.derive(a), self.derive(b)),
            Expr::Mul(a, b) => self.product_rule(a, b),
            Expr::Div(a, b) => self.quotient_rule(a, b),
            Expr::Pow(a, b) => self.power_rule(a, b),
            Expr::Neg(a) => simplify_neg(self.derive(a)),

            Expr::Sin(a) => self.chain_rule(a, Expr::Cos(a.clone())),
            Expr::Cos(a) => simplify_neg(self.chain_rule(a, Expr::Sin(a.clone()))),
            Expr::Tan(a) => {
                let sec2 = pow(Expr::Cos(a.clone()), Expr::integer(-2));
                self.chain_rule(a, sec2)
            }
            Expr::Atan(a) => {
                let denom = simplify_add(one(), simplify(pow((**a).clone(), Expr::integer(2))));
                simplify_div(self.derive(a), denom)
            }
            Expr::Sinh(a) => self.chain_rule(a, Expr::Cosh(a.clone())),
            Expr::Cosh(a) => self.chain_rule(a, Expr::Sinh(a.clone())),
            Expr::Exp(a) => self.chain_rule(a, Expr::Exp(a.clone())),
            Expr::Log(a) => simplify_div(self.derive(a), (**a).clone()),
            Expr::Abs(a) => {
                let sign = simplify_div((**a).clone(), Expr::Abs(a.clone()));
                simplify_mul(self.derive(a), sign)
            }

            Expr::Apply(_, arg) => match &**arg {
                Expr::Variable(v) if v == self.var => Expr::derivative(expr.clone(), v.clone(), 1),
                _ => self.chain_rule(arg, Expr::derivative(expr.clone(), self.var, 1)),
            },
            Expr::Derivative(inner, v, order) if v == self.var => {
                Expr::Derivative(inner.clone(), v.clone(), order + 1)
            }
            Expr::Integral(inner, v) if v == self.var => simplify((**inner).clone()),
            Expr::Derivative(..) | Expr::Integral(..) => {
                Expr::derivative(expr.clone(), self.var, 1)
            }
        }
    }

    fn product_rule(&self, a: &Expr, b: &Expr) -> Expr {
        let da = self.derive(a);
        let db = self.derive(b);
        simplify_add(
            simplify_mul(da, simplify(b.clone())),
            simplify_mul(simplify(a.clone()), db),
        )
    }

    fn quotient_rule(&self, a: &Expr, b: &Expr) -> Expr {
        let numer = simplify_sub(
            simplify_mul(self.derive(a), simplify(b.clone())),
            simplify_mul(simplify(a.clone()), self.derive(b)),
        );
        simplify_div(numer, simplify(pow(b.clone(), Expr::integer(2))))
    }

    fn power_rule(&self, base: &Expr, exp: &Expr) -> Expr {
        match exp {
            Expr::Constant(n) => {
                let lowered = simplify(pow(base.clone(), Expr::Constant(n - Rational::one())));
                simplify_mul(
                    simplify_mul(Expr::Constant(n.clone()), lowered),
                    self.derive(base),
                )
            }
            _ if !base.contains_var(self.var) => {
                let f = simplify(pow(base.clone(), exp.clone()));
                let log_base = simplify(Expr::Log(base.clone().boxed()));
                simplify_mul(simplify_mul(f, log_base), self.derive(exp))
            }
            _ => {
                let f = simplify(pow(base.clone(), exp.clone()));
                let da = self.derive(base);
                let db = self.derive(exp);
                let log_base = simplify(Expr::Log(base.clone().boxed()));
                let inner = simplify_add(
                    simplify_mul(db, log_base),
                    simplify_div(simplify_mul(simplify(exp.clone()), da), simplify(base.clone())),
                );
                simplify_mul(f, inner)
            }
        }
    }

    fn chain_rule(&self, arg: &Expr, outer_derivative: Expr) -> Expr {
        simplify_mul(self.derive(arg), simplify(outer_derivative))
    }
}
