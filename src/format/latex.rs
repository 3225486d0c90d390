//! LaTeX rendering for step displays.

use num_traits::{One, Signed};

use crate::expr::{Expr, ExpressionPair, Rational};
use crate::format::{Fraction, split_sign};

/// LaTeX for a single expression, e.g. `\frac{e^{x}}{3} + C e^{-2x}`.
pub fn latex(expr: &Expr) -> String {
    tex(0, expr)
}

pub fn latex_equation(pair: &ExpressionPair) -> String {
    format!("{} = {}", latex(&pair.lhs), latex(&pair.rhs))
}

fn tex(ctx: u8, expr: &Expr) -> String {
    match expr {
        Expr::Variable(v) => symbol(v),
        Expr::Constant(r) => {
            let body = constant(r);
            if r.is_negative() { bracket(ctx, 2, body) } else { body }
        }

        Expr::Add(..) | Expr::Sub(..) => {
            let mut body = String::new();
            for (idx, term) in expr.terms().iter().enumerate() {
                let (negative, magnitude) = split_sign(term);
                let text = tex(2, &magnitude);
                match (idx, negative) {
                    (0, true) => body.push_str(&format!("-{text}")),
                    (0, false) => body.push_str(&text),
                    (_, true) => body.push_str(&format!(" - {text}")),
                    (_, false) => body.push_str(&format!(" + {text}")),
                }
            }
            bracket(ctx, 1, body)
        }

        Expr::Mul(..) | Expr::Div(..) | Expr::Neg(..) => product(ctx, expr),
        Expr::Pow(_, e) if e.as_constant().is_some_and(Signed::is_negative) => product(ctx, expr),

        Expr::Pow(a, b) if b.as_constant() == Some(&Rational::new(1.into(), 2.into())) => {
            format!("\\sqrt{{{}}}", tex(0, a))
        }
        Expr::Pow(a, b) => format!("{}^{{{}}}", tex(4, a), tex(0, b)),

        Expr::Exp(a) if a.is_one() => "e".to_string(),
        Expr::Exp(a) => format!("e^{{{}}}", tex(0, a)),
        Expr::Sin(a) => function("\\sin", a),
        Expr::Cos(a) => function("\\cos", a),
        Expr::Tan(a) => function("\\tan", a),
        Expr::Atan(a) => function("\\arctan", a),
        Expr::Sinh(a) => function("\\sinh", a),
        Expr::Cosh(a) => function("\\cosh", a),
        Expr::Log(a) => function("\\ln", a),
        Expr::Abs(a) => format!("\\left|{}\\right|", tex(0, a)),

        Expr::Apply(name, arg) if arg.as_variable().is_some() => name.clone(),
        Expr::Apply(name, arg) => format!("{name}\\left({}\\right)", tex(0, arg)),
        Expr::Derivative(inner, var, order) => match (&**inner, *order) {
            (Expr::Apply(name, _), 1..=3) => format!("{name}{}", "'".repeat(*order as usize)),
            (Expr::Apply(name, _), n) => format!("{name}^{{({n})}}"),
            (other, 1) => format!("\\frac{{d}}{{d{var}}}\\left({}\\right)", tex(0, other)),
            (other, n) => format!("\\frac{{d^{{{n}}}}}{{d{var}^{{{n}}}}}\\left({}\\right)", tex(0, other)),
        },
        Expr::Integral(inner, var) => format!("\\int {} \\, d{var}", tex(2, inner)),
    }
}

fn product(ctx: u8, expr: &Expr) -> String {
    let Fraction { coef, num, den } = Fraction::of(expr);
    let sign = if coef.is_negative() { "-" } else { "" };
    let coef = coef.abs();

    let mut top: Vec<Expr> = Vec::new();
    if !coef.numer().is_one() || num.is_empty() {
        top.push(Expr::Constant(Rational::from_integer(coef.numer().clone())));
    }
    top.extend(num);

    let mut bottom: Vec<Expr> = Vec::new();
    if !coef.denom().is_one() {
        bottom.push(Expr::Constant(Rational::from_integer(coef.denom().clone())));
    }
    bottom.extend(den);

    let body = if bottom.is_empty() {
        juxtapose(&top)
    } else {
        format!("\\frac{{{}}}{{{}}}", juxtapose(&top), juxtapose(&bottom))
    };
    bracket(ctx, 2, format!("{sign}{body}"))
}

/// Writes factors side by side: `2x`, `C e^{x}`, `2 \cdot 3`.
fn juxtapose(factors: &[Expr]) -> String {
    let mut out = String::new();
    let mut previous: Option<&Expr> = None;
    for factor in factors {
        let text = tex(2, factor);
        if let Some(prev) = previous {
            let glue = match (prev, factor) {
                (_, Expr::Constant(_)) => " \\cdot ",
                (Expr::Constant(_), f) if is_letter_like(f) => "",
                _ => " ",
            };
            out.push_str(glue);
        }
        out.push_str(&text);
        previous = Some(factor);
    }
    out
}

/// A single-letter symbol or a power of one.
fn is_letter_like(expr: &Expr) -> bool {
    match expr {
        Expr::Variable(v) => v.chars().count() == 1,
        Expr::Apply(_, arg) => arg.as_variable().is_some(),
        Expr::Pow(base, _) => is_letter_like(base),
        _ => false,
    }
}

fn function(name: &str, arg: &Expr) -> String {
    format!("{name}\\left({}\\right)", tex(0, arg))
}

/// `C1` becomes `C_{1}`.
fn symbol(name: &str) -> String {
    match name.find(|c: char| c.is_ascii_digit()) {
        Some(split) if split > 0 && name[split..].chars().all(|c| c.is_ascii_digit()) => {
            format!("{}_{{{}}}", &name[..split], &name[split..])
        }
        _ => name.to_string(),
    }
}

fn constant(r: &Rational) -> String {
    if r.is_integer() {
        r.numer().to_string()
    } else if r.is_negative() {
        format!("-\\frac{{{}}}{{{}}}", -r.numer(), r.denom())
    } else {
        format!("\\frac{{{}}}{{{}}}", r.numer(), r.denom())
    }
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("\\left({body}\\right)")
    } else {
        body
    }
}
