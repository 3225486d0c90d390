//! Univariate polynomials with exact rational coefficients.

use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{Expr, Rational, mul, pow, sum};

/// Largest integer whose divisors are enumerated when searching for rational roots.
const ROOT_SEARCH_LIMIT: u64 = 1_000_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    coeffs: BTreeMap<usize, Rational>,
}

/// Rational roots with multiplicities, plus the factor without rational roots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootDecomposition {
    pub roots: Vec<(Rational, usize)>,
    pub residual: Poly,
}

impl Poly {
    pub fn zero() -> Self {
        Poly {
            coeffs: BTreeMap::new(),
        }
    }

    pub fn from_constant(c: Rational) -> Self {
        Self::monomial(c, 0)
    }

    /// `c * x^power`.
    pub fn monomial(c: Rational, power: usize) -> Self {
        let mut coeffs = BTreeMap::new();
        if !c.is_zero() {
            coeffs.insert(power, c);
        }
        Poly { coeffs }
    }

    /// Coefficients listed from the constant term upwards.
    pub fn from_coeffs(coeffs: impl IntoIterator<Item = Rational>) -> Self {
        let coeffs = coeffs
            .into_iter()
            .enumerate()
            .filter(|(_, c)| !c.is_zero())
            .collect();
        Poly { coeffs }
    }

    pub fn degree(&self) -> Option<usize> {
        self.coeffs.keys().next_back().copied()
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn coeff(&self, power: usize) -> Rational {
        self.coeffs.get(&power).cloned().unwrap_or_else(Rational::zero)
    }

    pub fn leading_coeff(&self) -> Rational {
        self.degree().map(|d| self.coeff(d)).unwrap_or_else(Rational::zero)
    }

    /// Reads a polynomial in `var`; `None` when the expression is not one.
    pub fn from_expr(expr: &Expr, var: &str) -> Option<Self> {
        match expr {
            Expr::Constant(c) => Some(Self::from_constant(c.clone())),
            Expr::Variable(v) if v == var => Some(Self::monomial(Rational::one(), 1)),
            Expr::Add(a, b) => Some(Self::from_expr(a, var)? + Self::from_expr(b, var)?),
            Expr::Sub(a, b) => Some(Self::from_expr(a, var)? - Self::from_expr(b, var)?),
            Expr::Mul(a, b) => Some(Self::from_expr(a, var)? * Self::from_expr(b, var)?),
            Expr::Div(a, b) => {
                let denom = b.as_constant().filter(|c| !c.is_zero())?;
                Some(Self::from_expr(a, var)?.scale(&denom.recip()))
            }
            Expr::Neg(inner) => Some(-Self::from_expr(inner, var)?),
            Expr::Pow(base, exp) => {
                let power = exp
                    .as_constant()
                    .filter(|c| c.is_integer() && !c.is_negative())?
                    .to_integer()
                    .to_usize()?;
                Some(Self::from_expr(base, var)?.pow(power))
            }
            _ => None,
        }
    }

    pub fn to_expr(&self, var: &str) -> Expr {
        let terms = self.coeffs.iter().rev().map(|(power, c)| {
            let c = Expr::Constant(c.clone());
            match power {
                0 => c,
                1 => mul(c, Expr::var(var)),
                k => mul(c, pow(Expr::var(var), Expr::integer(*k as u64))),
            }
        });
        sum(terms)
    }

    pub fn pow(&self, exp: usize) -> Self {
        let mut result = Self::from_constant(Rational::one());
        let mut base = self.clone();
        let mut n = exp;
        while n > 0 {
            if n % 2 == 1 {
                result = result * base.clone();
            }
            base = base.clone() * base;
            n /= 2;
        }
        result
    }

    pub fn scale(&self, k: &Rational) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .map(|(power, c)| (*power, c * k))
            .filter(|(_, c)| !c.is_zero())
            .collect();
        Poly { coeffs }
    }

    pub fn derivative(&self) -> Self {
        let coeffs = self
            .coeffs
            .iter()
            .filter(|(power, _)| **power > 0)
            .map(|(power, c)| (power - 1, c * Rational::from_integer(BigInt::from(*power))))
            .collect();
        Poly { coeffs }
    }

    /// Horner evaluation.
    pub fn evaluate(&self, x: &Rational) -> Rational {
        let Some(degree) = self.degree() else {
            return Rational::zero();
        };
        (0..=degree)
            .rev()
            .fold(Rational::zero(), |acc, power| acc * x + self.coeff(power))
    }

    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        let Some(divisor_degree) = divisor.degree() else {
            return (Poly::zero(), self.clone());
        };
        let divisor_lc = divisor.leading_coeff();
        let mut quotient = Poly::zero();
        let mut remainder = self.clone();
        while let Some(r_deg) = remainder.degree() {
            if r_deg < divisor_degree {
                break;
            }
            let coeff = remainder.leading_coeff() / &divisor_lc;
            let term = Poly::monomial(coeff, r_deg - divisor_degree);
            quotient = quotient + term.clone();
            remainder = remainder - term * divisor.clone();
        }
        (quotient, remainder)
    }

    pub fn div_exact(&self, divisor: &Self) -> Option<Self> {
        let (q, r) = self.div_rem(divisor);
        r.is_zero().then_some(q)
    }

    /// Splits off every rational root, repeated according to multiplicity.
    pub fn rational_roots(&self) -> RootDecomposition {
        let mut roots: Vec<(Rational, usize)> = Vec::new();
        let mut current = self.clone();
        while let Some(root) = find_rational_root(&current) {
            let divider = Poly::from_coeffs([-root.clone(), Rational::one()]);
            let Some(next) = current.div_exact(&divider) else {
                break;
            };
            current = next;
            match roots.iter_mut().find(|(r, _)| *r == root) {
                Some((_, multiplicity)) => *multiplicity += 1,
                None => roots.push((root, 1)),
            }
        }
        roots.sort();
        RootDecomposition {
            roots,
            residual: current,
        }
    }
}

fn find_rational_root(poly: &Poly) -> Option<Rational> {
    let degree = poly.degree()?;
    if degree == 0 {
        return None;
    }
    if poly.coeff(0).is_zero() {
        return Some(Rational::zero());
    }
    let (constant, leading) = integer_coeffs(poly);
    let p_candidates = divisors(&constant)?;
    let q_candidates = divisors(&leading)?;

    let mut candidates = Vec::new();
    for p in &p_candidates {
        for q in &q_candidates {
            let candidate = Rational::new(p.clone(), q.clone());
            candidates.push(candidate.clone());
            candidates.push(-candidate);
        }
    }
    candidates.sort();
    candidates.dedup();
    candidates
        .into_iter()
        .find(|candidate| poly.evaluate(candidate).is_zero())
}

/// Constant and leading coefficient after clearing denominators.
fn integer_coeffs(poly: &Poly) -> (BigInt, BigInt) {
    let lcm = poly
        .coeffs
        .values()
        .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
    let scaled = |c: Rational| (c * Rational::from_integer(lcm.clone())).to_integer();
    (scaled(poly.coeff(0)), scaled(poly.leading_coeff()))
}

fn divisors(n: &BigInt) -> Option<Vec<BigInt>> {
    let abs_n = n.abs().to_u64().filter(|v| *v <= ROOT_SEARCH_LIMIT)?;
    let mut result = Vec::new();
    let mut d = 1u64;
    while d * d <= abs_n {
        if abs_n % d == 0 {
            result.push(BigInt::from(d));
            if abs_n / d != d {
                result.push(BigInt::from(abs_n / d));
            }
        }
        d += 1;
    }
    result.sort();
    Some(result)
}

impl Add for Poly {
    type Output = Poly;

    fn add(self, rhs: Poly) -> Poly {
        let mut coeffs = self.coeffs;
        for (power, c) in rhs.coeffs {
            let entry = coeffs.entry(power).or_insert_with(Rational::zero);
            *entry += c;
            if entry.is_zero() {
                coeffs.remove(&power);
            }
        }
        Poly { coeffs }
    }
}

impl Sub for Poly {
    type Output = Poly;

    fn sub(self, rhs: Poly) -> Poly {
        self + -rhs
    }
}

impl Mul for Poly {
    type Output = Poly;

    fn mul(self, rhs: Poly) -> Poly {
        let mut out = Poly::zero();
        for (pa, ca) in &self.coeffs {
            for (pb, cb) in &rhs.coeffs {
                out = out + Poly::monomial(ca * cb, pa + pb);
            }
        }
        out
    }
}

impl Neg for Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        let coeffs = self.coeffs.into_iter().map(|(p, c)| (p, -c)).collect();
        Poly { coeffs }
    }
}
