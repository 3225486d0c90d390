use std::collections::{BTreeMap, HashMap};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::expr::{Expr, Rational, one, pow, zero};

pub const DISTRIBUTE_TERM_LIMIT: usize = 64;
pub const SIMPLIFY_ITERATION_LIMIT: usize = 16;
const MAX_INTEGER_POWER: u32 = 256;

#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
struct CanonKey(Vec<Expr>);

pub fn simplify(expr: Expr) -> Expr {
    let mut cache = HashMap::new();
    simplify_cached(expr, &mut cache)
}

fn simplify_cached(expr: Expr, cache: &mut HashMap<Expr, Expr>) -> Expr {
    if let Some(hit) = cache.get(&expr) {
        return hit.clone();
    }

    let key = expr.clone();
    let result = match expr {
        Expr::Add(a, b) => simplify_add(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Sub(a, b) => simplify_sub(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Mul(a, b) => simplify_mul(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Div(a, b) => simplify_div(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Pow(a, b) => simplify_pow(simplify_cached(*a, cache), simplify_cached(*b, cache)),
        Expr::Neg(a) => simplify_neg(simplify_cached(*a, cache)),

        Expr::Sin(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => zero(),
            x => match negated(&x) {
                Some(inner) => simplify_neg(Expr::Sin(inner.boxed())),
                None => Expr::Sin(x.boxed()),
            },
        },

        Expr::Cos(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => one(),
            x => Expr::Cos(negated(&x).unwrap_or(x).boxed()),
        },

        Expr::Tan(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => zero(),
            x => match negated(&x) {
                Some(inner) => simplify_neg(Expr::Tan(inner.boxed())),
                None => Expr::Tan(x.boxed()),
            },
        },

        Expr::Atan(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => zero(),
            x => match negated(&x) {
                Some(inner) => simplify_neg(Expr::Atan(inner.boxed())),
                None => Expr::Atan(x.boxed()),
            },
        },

        Expr::Sinh(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => zero(),
            x => match negated(&x) {
                Some(inner) => simplify_neg(Expr::Sinh(inner.boxed())),
                None => Expr::Sinh(x.boxed()),
            },
        },

        Expr::Cosh(a) => match simplify_cached(*a, cache) {
            x if is_zero(&x) => one(),
            x => Expr::Cosh(negated(&x).unwrap_or(x).boxed()),
        },

        Expr::Exp(a) => simplify_exp(simplify_cached(*a, cache)),

        Expr::Log(a) => match simplify_cached(*a, cache) {
            x if is_one(&x) => zero(),
            Expr::Exp(inner) => *inner,
            x => Expr::Log(x.boxed()),
        },

        Expr::Abs(a) => match simplify_cached(*a, cache) {
            Expr::Constant(c) => Expr::Constant(c.abs()),
            Expr::Exp(inner) => Expr::Exp(inner),
            x => Expr::Abs(negated(&x).unwrap_or(x).boxed()),
        },

        Expr::Apply(name, a) => Expr::Apply(name, simplify_cached(*a, cache).boxed()),
        Expr::Derivative(a, _, 0) => simplify_cached(*a, cache),
        Expr::Derivative(a, var, order) => {
            Expr::Derivative(simplify_cached(*a, cache).boxed(), var, order)
        }
        Expr::Integral(a, var) => Expr::Integral(simplify_cached(*a, cache).boxed(), var),

        e => e,
    };

    cache.insert(key, result.clone());
    result
}

/// Apply simplification passes until the expression stops changing or we hit the iteration cap.
pub fn simplify_fully(expr: Expr) -> Expr {
    simplify_with_limit(expr, SIMPLIFY_ITERATION_LIMIT)
}

/// Apply simplification passes up to `max_iters`, returning the last value if convergence is not reached.
pub fn simplify_with_limit(expr: Expr, max_iters: usize) -> Expr {
    let mut cache = HashMap::new();
    let mut current = expr;
    for _ in 0..max_iters {
        let next = simplify_cached(current.clone(), &mut cache);
        if next == current {
            return current;
        }
        current = next;
    }
    current
}

pub fn simplify_add(x: Expr, y: Expr) -> Expr {
    simplify_sum(vec![x, y])
}

pub fn simplify_sub(x: Expr, y: Expr) -> Expr {
    simplify_add(x, simplify_neg(y))
}

/// Collects like terms of already simplified summands.
pub fn simplify_sum(terms: Vec<Expr>) -> Expr {
    rebuild_sum(collect_sum(terms.iter().flat_map(flatten_sum)))
}

pub fn simplify_mul(x: Expr, y: Expr) -> Expr {
    simplify_product(vec![x, y])
}

pub fn simplify_div(x: Expr, y: Expr) -> Expr {
    if is_zero(&y) {
        return Expr::Div(x.boxed(), y.boxed());
    }
    simplify_product(vec![x, pow(y, Expr::integer(-1))])
}

pub fn simplify_pow(x: Expr, y: Expr) -> Expr {
    if is_zero(&y) || is_one(&x) {
        return one();
    }
    if is_one(&y) {
        return x;
    }
    if is_zero(&x) && y.as_constant().is_some_and(Signed::is_positive) {
        return zero();
    }
    if y.as_constant().is_some() {
        return simplify_product(vec![pow(x, y)]);
    }
    match x {
        Expr::Exp(arg) => simplify_exp(simplify_mul(*arg, y)),
        x => pow(x, y),
    }
}

pub fn simplify_neg(expr: Expr) -> Expr {
    match expr {
        Expr::Constant(x) => Expr::Constant(-x),
        Expr::Neg(x) => *x,
        sum @ (Expr::Add(..) | Expr::Sub(..)) => {
            rebuild_sum(collect_sum(flatten_sum(&sum).into_iter().map(simplify_neg)))
        }
        other => {
            let (c, base) = split_coeff(&other);
            term_from(&-c, base)
        }
    }
}

/// `exp(k*log(u) + r)` becomes `u^k * exp(r)`.
fn simplify_exp(arg: Expr) -> Expr {
    if is_zero(&arg) {
        return one();
    }
    let mut factors = Vec::new();
    let mut rest = Vec::new();
    for term in flatten_sum(&arg) {
        let (c, base) = split_coeff(&term);
        match base {
            Expr::Log(u) => factors.push(simplify_pow(*u, Expr::Constant(c))),
            _ => rest.push(term),
        }
    }
    if factors.is_empty() {
        return Expr::Exp(arg.boxed());
    }
    let remaining = simplify_sum(rest);
    if !is_zero(&remaining) {
        factors.push(Expr::Exp(remaining.boxed()));
    }
    simplify_product(factors)
}

/// Multiplies simplified factors: merges powers of equal bases and exponentials,
/// folds constants, and distributes over sums when the expansion stays small.
fn simplify_product(factors: Vec<Expr>) -> Expr {
    let mut coef = Rational::one();
    let mut powers: BTreeMap<Expr, Rational> = BTreeMap::new();
    let mut symbolic: Vec<Expr> = Vec::new();
    let mut exp_args: Vec<Expr> = Vec::new();
    let mut queue: Vec<(Expr, Rational)> =
        factors.into_iter().map(|f| (f, Rational::one())).collect();

    while let Some((factor, k)) = queue.pop() {
        match factor {
            Expr::Constant(c) => match constant_power(&c, &k) {
                Some(value) => coef *= value,
                None => add_power(&mut powers, Expr::Constant(c), k),
            },
            Expr::Neg(inner) if k.is_integer() => {
                if k.to_integer().is_odd() {
                    coef = -coef;
                }
                queue.push((*inner, k));
            }
            Expr::Mul(a, b) if k.is_integer() => {
                queue.push((*a, k.clone()));
                queue.push((*b, k));
            }
            Expr::Div(a, b) if k.is_integer() => {
                queue.push((*a, k.clone()));
                queue.push((*b, -k));
            }
            Expr::Exp(arg) => exp_args.push(scale(&k, *arg)),
            Expr::Pow(base, exp) => match *exp {
                Expr::Constant(e) if k.is_integer() || matches!(*base, Expr::Exp(_)) => {
                    queue.push((*base, e * k));
                }
                exp if k.is_one() => symbolic.push(pow(*base, exp)),
                exp => add_power(&mut powers, pow(*base, exp), k),
            },
            other => add_power(&mut powers, other, k),
        }
    }

    if coef.is_zero() {
        return zero();
    }

    if !exp_args.is_empty() {
        let merged = simplify_sum(exp_args);
        if !is_zero(&merged) {
            add_power(&mut powers, Expr::Exp(merged.boxed()), Rational::one());
        }
    }

    let mut numer: Vec<Expr> = Vec::new();
    for (base, k) in powers {
        if k.is_zero() {
            continue;
        }
        if let Expr::Constant(c) = &base {
            if let Some(value) = constant_power(c, &k) {
                coef *= value;
                continue;
            }
        }
        numer.push(if k.is_one() {
            base
        } else {
            pow(base, Expr::Constant(k))
        });
    }
    numer.extend(symbolic);

    if let Some(expanded) = distribute(&coef, &numer) {
        return expanded;
    }

    numer.sort();
    term_from(&coef, mk_mul_list(numer))
}

/// Expands a product containing sums into a sum of products.
fn distribute(coef: &Rational, factors: &[Expr]) -> Option<Expr> {
    let idx = factors.iter().position(|f| matches!(f, Expr::Add(..)))?;
    if factors.len() == 1 && coef.is_one() {
        return None;
    }
    let expansion: usize = factors
        .iter()
        .filter(|f| matches!(f, Expr::Add(..)))
        .map(|f| flatten_sum(f).len())
        .product();
    if expansion > DISTRIBUTE_TERM_LIMIT {
        return None;
    }
    let mut others = factors.to_vec();
    let sum = others.remove(idx);
    others.push(Expr::Constant(coef.clone()));
    let pieces = flatten_sum(&sum)
        .into_iter()
        .map(|term| {
            let mut fs = others.clone();
            fs.push(term);
            simplify_product(fs)
        })
        .collect();
    Some(simplify_sum(pieces))
}

fn add_power(powers: &mut BTreeMap<Expr, Rational>, base: Expr, k: Rational) {
    *powers.entry(base).or_insert_with(Rational::zero) += k;
}

fn scale(k: &Rational, expr: Expr) -> Expr {
    if k.is_one() {
        expr
    } else {
        simplify_product(vec![Expr::Constant(k.clone()), expr])
    }
}

/// `c^k` as an exact rational, when it is one.
fn constant_power(c: &Rational, k: &Rational) -> Option<Rational> {
    if k.is_integer() {
        return integer_power(c, &k.to_integer());
    }
    if k.denom() == &BigInt::from(2) && c.is_positive() {
        let root = exact_sqrt(c)?;
        return integer_power(&root, k.numer());
    }
    None
}

fn integer_power(c: &Rational, k: &BigInt) -> Option<Rational> {
    let power = k.abs().to_u32().filter(|p| *p <= MAX_INTEGER_POWER)?;
    if k.is_negative() {
        if c.is_zero() {
            return None;
        }
        Some(c.recip().pow(power as i32))
    } else {
        Some(c.pow(power as i32))
    }
}

pub(crate) fn exact_sqrt(c: &Rational) -> Option<Rational> {
    if c.is_negative() {
        return None;
    }
    let n = c.numer().sqrt();
    let d = c.denom().sqrt();
    if &(&n * &n) == c.numer() && &(&d * &d) == c.denom() {
        Some(Rational::new(n, d))
    } else {
        None
    }
}

/// The positive counterpart of a syntactically negative expression.
fn negated(expr: &Expr) -> Option<Expr> {
    if matches!(expr, Expr::Add(..) | Expr::Sub(..)) {
        return None;
    }
    let (c, base) = split_coeff(expr);
    c.is_negative().then(|| term_from(&-c, base))
}

fn flatten_sum(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::Add(a, b) => {
            let mut out = flatten_sum(a);
            out.extend(flatten_sum(b));
            out
        }
        Expr::Sub(a, b) => {
            let mut out = flatten_sum(a);
            out.extend(flatten_sum(b).into_iter().map(simplify_neg));
            out
        }
        Expr::Neg(a) => flatten_sum(a).into_iter().map(simplify_neg).collect(),
        other => vec![other.clone()],
    }
}

/// Splits a term into its rational coefficient and the product of the remaining factors.
pub(crate) fn split_coeff(expr: &Expr) -> (Rational, Expr) {
    let (c, mut factors) = flatten_product(expr);
    factors.sort();
    (c, mk_mul_list(factors))
}

fn flatten_product(expr: &Expr) -> (Rational, Vec<Expr>) {
    match expr {
        Expr::Constant(c) => (c.clone(), Vec::new()),
        Expr::Neg(e) => {
            let (c, fs) = flatten_product(e);
            (-c, fs)
        }
        Expr::Mul(a, b) => {
            let (ca, mut fa) = flatten_product(a);
            let (cb, fb) = flatten_product(b);
            fa.extend(fb);
            (ca * cb, fa)
        }
        other => (Rational::one(), vec![other.clone()]),
    }
}

fn collect_sum<I>(terms: I) -> BTreeMap<CanonKey, Rational>
where
    I: IntoIterator<Item = Expr>,
{
    let mut map = BTreeMap::new();
    for term in terms {
        let (c, mut factors) = flatten_product(&term);
        if c.is_zero() {
            continue;
        }
        factors.sort();
        map.entry(CanonKey(factors))
            .and_modify(|acc| *acc += &c)
            .or_insert(c);
    }
    merge_pythagorean(&mut map);
    map
}

/// `k*cos(u)^2*r + k*sin(u)^2*r` becomes `k*r`.
fn merge_pythagorean(map: &mut BTreeMap<CanonKey, Rational>) {
    loop {
        let found = map.iter().find_map(|(key, coef)| {
            key.0.iter().enumerate().find_map(|(idx, factor)| {
                let arg = squared_cos(factor)?;
                let mut partner = key.0.clone();
                partner[idx] = pow(Expr::Sin(arg.clone().boxed()), Expr::integer(2));
                partner.sort();
                let partner = CanonKey(partner);
                if coef.is_zero() || map.get(&partner) != Some(coef) {
                    return None;
                }
                let mut rest = key.0.clone();
                rest.remove(idx);
                Some((key.clone(), partner, CanonKey(rest), coef.clone()))
            })
        });
        let Some((cos_key, sin_key, rest_key, coef)) = found else {
            break;
        };
        map.remove(&cos_key);
        map.remove(&sin_key);
        *map.entry(rest_key).or_insert_with(Rational::zero) += coef;
    }
}

fn squared_cos(expr: &Expr) -> Option<&Expr> {
    match expr {
        Expr::Pow(base, exp) if exp.as_constant() == Some(&Rational::from_integer(2.into())) => {
            match &**base {
                Expr::Cos(arg) => Some(arg),
                _ => None,
            }
        }
        _ => None,
    }
}

fn rebuild_sum(map: BTreeMap<CanonKey, Rational>) -> Expr {
    let mut map = map;
    let const_term = map
        .remove(&CanonKey(Vec::new()))
        .unwrap_or_else(Rational::zero);

    let mut terms: Vec<Expr> = map
        .into_iter()
        .filter(|(_, coef)| !coef.is_zero())
        .map(|(CanonKey(factors), coef)| term_from(&coef, mk_mul_list(factors)))
        .collect();

    if !const_term.is_zero() {
        terms.push(Expr::Constant(const_term));
    }

    match terms.len() {
        0 => zero(),
        1 => terms.remove(0),
        _ => mk_add_list(terms),
    }
}

fn term_from(coef: &Rational, base: Expr) -> Expr {
    if coef.is_zero() {
        return zero();
    }
    if is_one(&base) {
        return Expr::Constant(coef.clone());
    }
    if coef.is_one() {
        return base;
    }
    if coef == &-Rational::one() {
        return Expr::Neg(base.boxed());
    }
    Expr::Mul(Expr::Constant(coef.clone()).boxed(), base.boxed())
}

fn is_zero(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if r.is_zero())
}

fn is_one(expr: &Expr) -> bool {
    matches!(expr, Expr::Constant(r) if r.is_one())
}

fn mk_add_list(items: Vec<Expr>) -> Expr {
    items
        .into_iter()
        .reduce(|acc, item| Expr::Add(acc.boxed(), item.boxed()))
        .unwrap_or_else(zero)
}

fn mk_mul_list(items: Vec<Expr>) -> Expr {
    items
        .into_iter()
        .filter(|e| !is_one(e))
        .reduce(|acc, item| Expr::Mul(acc.boxed(), item.boxed()))
        .unwrap_or_else(one)
}
