//! Expression tree definitions and helpers.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

pub type Rational = BigRational;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Expr {
    Variable(String),
    Constant(Rational),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Sin(Box<Expr>),
    Cos(Box<Expr>),
    Tan(Box<Expr>),
    Atan(Box<Expr>),
    Sinh(Box<Expr>),
    Cosh(Box<Expr>),
    Exp(Box<Expr>),
    Log(Box<Expr>),
    Abs(Box<Expr>),
    /// A named function applied to an argument, e.g. `y(x)`.
    Apply(String, Box<Expr>),
    /// `order`-th derivative of the inner expression with respect to the named variable.
    Derivative(Box<Expr>, String, u32),
    /// Antiderivative that could not be written in closed form.
    Integral(Box<Expr>, String),
}

/// Left and right side of an equation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ExpressionPair {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl ExpressionPair {
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Self { lhs, rhs }
    }

    /// `lhs - rhs`, unsimplified.
    pub fn difference(&self) -> Expr {
        sub(self.lhs.clone(), self.rhs.clone())
    }
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn constant(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::new(num.into(), den.into()))
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::from_integer(value.into()))
    }

    pub fn rational(value: Rational) -> Self {
        Expr::Constant(value)
    }

    /// `name(arg)`.
    pub fn apply(name: impl Into<String>, arg: Expr) -> Self {
        Expr::Apply(name.into(), arg.boxed())
    }

    pub fn derivative(inner: Expr, var: impl Into<String>, order: u32) -> Self {
        Expr::Derivative(inner.boxed(), var.into(), order)
    }

    pub fn negate(self) -> Self {
        match self {
            Expr::Constant(r) => Expr::Constant(-r),
            Expr::Neg(inner) => *inner,
            other => Expr::Neg(Box::new(other)),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Constant(r) if r.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Constant(r) if r.is_one())
    }

    pub fn as_constant(&self) -> Option<&Rational> {
        if let Expr::Constant(c) = self {
            Some(c)
        } else {
            None
        }
    }

    pub fn as_variable(&self) -> Option<&str> {
        if let Expr::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Direct sub-expressions, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Variable(_) | Expr::Constant(_) => Vec::new(),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => vec![&**a, &**b],
            Expr::Neg(a)
            | Expr::Sin(a)
            | Expr::Cos(a)
            | Expr::Tan(a)
            | Expr::Atan(a)
            | Expr::Sinh(a)
            | Expr::Cosh(a)
            | Expr::Exp(a)
            | Expr::Log(a)
            | Expr::Abs(a)
            | Expr::Apply(_, a)
            | Expr::Derivative(a, _, _)
            | Expr::Integral(a, _) => vec![&**a],
        }
    }

    /// Rebuilds this node with every direct child passed through `f`.
    pub fn map_children(&self, mut f: impl FnMut(&Expr) -> Expr) -> Expr {
        match self {
            Expr::Variable(_) | Expr::Constant(_) => self.clone(),
            Expr::Add(a, b) => add(f(a), f(b)),
            Expr::Sub(a, b) => sub(f(a), f(b)),
            Expr::Mul(a, b) => mul(f(a), f(b)),
            Expr::Div(a, b) => div(f(a), f(b)),
            Expr::Pow(a, b) => pow(f(a), f(b)),
            Expr::Neg(a) => neg(f(a)),
            Expr::Sin(a) => Expr::Sin(f(a).boxed()),
            Expr::Cos(a) => Expr::Cos(f(a).boxed()),
            Expr::Tan(a) => Expr::Tan(f(a).boxed()),
            Expr::Atan(a) => Expr::Atan(f(a).boxed()),
            Expr::Sinh(a) => Expr::Sinh(f(a).boxed()),
            Expr::Cosh(a) => Expr::Cosh(f(a).boxed()),
            Expr::Exp(a) => Expr::Exp(f(a).boxed()),
            Expr::Log(a) => Expr::Log(f(a).boxed()),
            Expr::Abs(a) => Expr::Abs(f(a).boxed()),
            Expr::Apply(name, a) => Expr::Apply(name.clone(), f(a).boxed()),
            Expr::Derivative(a, var, order) => Expr::Derivative(f(a).boxed(), var.clone(), *order),
            Expr::Integral(a, var) => Expr::Integral(f(a).boxed(), var.clone()),
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        1 + self.children().into_iter().map(Expr::size).sum::<usize>()
    }

    pub fn contains(&self, target: &Expr) -> bool {
        self == target || self.children().into_iter().any(|c| c.contains(target))
    }

    /// True when the variable occurs free. Variables bound by an `Integral` or
    /// `Derivative` still count, since their results depend on them.
    pub fn contains_var(&self, var: &str) -> bool {
        match self {
            Expr::Variable(name) => name == var,
            Expr::Derivative(_, v, _) | Expr::Integral(_, v) if v == var => true,
            _ => self.children().into_iter().any(|c| c.contains_var(var)),
        }
    }

    /// True when `name(..)` is applied anywhere in the tree.
    pub fn contains_function(&self, name: &str) -> bool {
        match self {
            Expr::Apply(f, _) if f == name => true,
            _ => self.children().into_iter().any(|c| c.contains_function(name)),
        }
    }

    pub fn contains_derivative(&self) -> bool {
        matches!(self, Expr::Derivative(..))
            || self.children().into_iter().any(Expr::contains_derivative)
    }

    pub fn contains_integral(&self) -> bool {
        matches!(self, Expr::Integral(..))
            || self.children().into_iter().any(Expr::contains_integral)
    }

    /// Every derivative node, outermost first.
    pub fn derivatives(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        collect_derivatives(self, &mut out);
        out
    }

    /// Terms of a sum, with subtraction and negation pushed into the terms.
    pub fn terms(&self) -> Vec<Expr> {
        let mut out = Vec::new();
        collect_terms(self, false, &mut out);
        out
    }
}

fn collect_derivatives<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    if matches!(expr, Expr::Derivative(..)) {
        out.push(expr);
    }
    for child in expr.children() {
        collect_derivatives(child, out);
    }
}

fn collect_terms(expr: &Expr, negated: bool, out: &mut Vec<Expr>) {
    match expr {
        Expr::Add(a, b) => {
            collect_terms(a, negated, out);
            collect_terms(b, negated, out);
        }
        Expr::Sub(a, b) => {
            collect_terms(a, negated, out);
            collect_terms(b, !negated, out);
        }
        Expr::Neg(a) => collect_terms(a, !negated, out),
        other if negated => out.push(other.clone().negate()),
        other => out.push(other.clone()),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::pretty(self))
    }
}

impl fmt::Display for ExpressionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

pub fn zero() -> Expr {
    Expr::Constant(Rational::zero())
}

pub fn one() -> Expr {
    Expr::Constant(Rational::one())
}

pub fn rational(num: i64, den: i64) -> Rational {
    Rational::new(num.into(), den.into())
}

pub fn is_negative(r: &Rational) -> bool {
    r.is_negative()
}

pub fn pow(base: Expr, exp: Expr) -> Expr {
    Expr::Pow(base.boxed(), exp.boxed())
}

pub fn add(a: Expr, b: Expr) -> Expr {
    Expr::Add(a.boxed(), b.boxed())
}

pub fn sub(a: Expr, b: Expr) -> Expr {
    Expr::Sub(a.boxed(), b.boxed())
}

pub fn mul(a: Expr, b: Expr) -> Expr {
    Expr::Mul(a.boxed(), b.boxed())
}

pub fn div(a: Expr, b: Expr) -> Expr {
    Expr::Div(a.boxed(), b.boxed())
}

pub fn neg(a: Expr) -> Expr {
    Expr::Neg(a.boxed())
}

pub fn exp(a: Expr) -> Expr {
    Expr::Exp(a.boxed())
}

pub fn log(a: Expr) -> Expr {
    Expr::Log(a.boxed())
}

/// Folds terms into a left-leaning sum; empty input gives zero.
pub fn sum(terms: impl IntoIterator<Item = Expr>) -> Expr {
    terms.into_iter().reduce(add).unwrap_or_else(zero)
}

/// Folds factors into a left-leaning product; empty input gives one.
pub fn product(factors: impl IntoIterator<Item = Expr>) -> Expr {
    factors.into_iter().reduce(mul).unwrap_or_else(one)
}
