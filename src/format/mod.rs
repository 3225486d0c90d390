//! Renderers for expressions: plain text for explanations, LaTeX for display.

pub mod expr;
pub mod latex;

pub use expr::pretty;
pub use latex::{latex, latex_equation};

use num_traits::{One, Signed, Zero};

use crate::expr::{Expr, Rational, mul};

/// Pulls a leading minus sign out of a term, so sums can print `a - b`.
pub(crate) fn split_sign(expr: &Expr) -> (bool, Expr) {
    match expr {
        Expr::Neg(inner) => {
            let (neg, rest) = split_sign(inner);
            (!neg, rest)
        }
        Expr::Constant(c) if c.is_negative() => (true, Expr::Constant(-c)),
        Expr::Mul(a, b) => {
            let (neg, head) = split_sign(a);
            if !neg {
                (false, expr.clone())
            } else if head.is_one() {
                (true, (**b).clone())
            } else {
                (true, mul(head, (**b).clone()))
            }
        }
        Expr::Div(a, b) => {
            let (neg, head) = split_sign(a);
            if neg {
                (true, Expr::Div(head.boxed(), b.clone()))
            } else {
                (false, expr.clone())
            }
        }
        other => (false, other.clone()),
    }
}

/// A product read as `coef * num / den`.
pub(crate) struct Fraction {
    pub coef: Rational,
    pub num: Vec<Expr>,
    pub den: Vec<Expr>,
}

impl Fraction {
    pub fn of(expr: &Expr) -> Self {
        let mut fraction = Fraction {
            coef: Rational::one(),
            num: Vec::new(),
            den: Vec::new(),
        };
        fraction.absorb(expr, false);
        fraction
    }

    fn absorb(&mut self, expr: &Expr, inverted: bool) {
        match expr {
            Expr::Mul(a, b) => {
                self.absorb(a, inverted);
                self.absorb(b, inverted);
            }
            Expr::Div(a, b) => {
                self.absorb(a, inverted);
                self.absorb(b, !inverted);
            }
            Expr::Neg(a) => {
                self.coef = -self.coef.clone();
                self.absorb(a, inverted);
            }
            Expr::Constant(c) if !c.is_zero() => {
                if inverted {
                    self.coef = self.coef.clone() / c;
                } else {
                    self.coef = self.coef.clone() * c;
                }
            }
            Expr::Pow(base, exp) => match exp.as_constant() {
                Some(k) if k.is_negative() => {
                    let flipped = if (-k).is_one() {
                        (**base).clone()
                    } else {
                        Expr::Pow(base.clone(), Expr::Constant(-k).boxed())
                    };
                    self.push(flipped, !inverted);
                }
                _ => self.push(expr.clone(), inverted),
            },
            other => self.push(other.clone(), inverted),
        }
    }

    fn push(&mut self, expr: Expr, inverted: bool) {
        if inverted {
            self.den.push(expr);
        } else {
            self.num.push(expr);
        }
    }
}
