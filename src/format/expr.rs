use num_traits::{One, Signed};

use crate::expr::{Expr, Rational};
use crate::format::{Fraction, split_sign};

/// Plain-text rendering, e.g. `exp(x)/3 + C*exp(-2*x)`.
pub fn pretty(expr: &Expr) -> String {
    pp(0, expr)
}

fn pp(ctx: u8, expr: &Expr) -> String {
    match expr {
        Expr::Variable(v) => v.clone(),
        Expr::Constant(r) if r.is_negative() => bracket(ctx, 2, show_rational(r)),
        Expr::Constant(r) if !r.is_integer() => bracket(ctx, 3, show_rational(r)),
        Expr::Constant(r) => show_rational(r),

        Expr::Add(..) | Expr::Sub(..) => {
            let mut body = String::new();
            for (idx, term) in expr.terms().iter().enumerate() {
                let (negative, magnitude) = split_sign(term);
                let text = pp(2, &magnitude);
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
            format!("sqrt({})", pp(0, a))
        }
        Expr::Pow(a, b) => bracket(ctx, 3, format!("{}^{}", pp(4, a), pp(4, b))),

        Expr::Sin(a) => format!("sin({})", pp(0, a)),
        Expr::Cos(a) => format!("cos({})", pp(0, a)),
        Expr::Tan(a) => format!("tan({})", pp(0, a)),
        Expr::Atan(a) => format!("arctan({})", pp(0, a)),
        Expr::Sinh(a) => format!("sinh({})", pp(0, a)),
        Expr::Cosh(a) => format!("cosh({})", pp(0, a)),
        Expr::Exp(a) => format!("exp({})", pp(0, a)),
        Expr::Log(a) => format!("log({})", pp(0, a)),
        Expr::Abs(a) => format!("abs({})", pp(0, a)),

        Expr::Apply(name, arg) if arg.as_variable().is_some() => name.clone(),
        Expr::Apply(name, arg) => format!("{name}({})", pp(0, arg)),
        Expr::Derivative(inner, var, order) => match (&**inner, *order) {
            (Expr::Apply(name, _), 1..=3) => format!("{name}{}", "'".repeat(*order as usize)),
            (Expr::Apply(name, _), n) => format!("{name}^({n})"),
            (other, 1) => format!("d/d{var}({})", pp(0, other)),
            (other, n) => format!("d^{n}/d{var}^{n}({})", pp(0, other)),
        },
        Expr::Integral(inner, var) => format!("∫({}) d{var}", pp(0, inner)),
    }
}

fn product(ctx: u8, expr: &Expr) -> String {
    let Fraction { coef, num, den } = Fraction::of(expr);
    let sign = if coef.is_negative() { "-" } else { "" };
    let coef = coef.abs();

    let mut top: Vec<String> = Vec::new();
    if !coef.numer().is_one() || num.is_empty() {
        top.push(coef.numer().to_string());
    }
    top.extend(num.iter().map(|f| pp(2, f)));

    let mut bottom: Vec<String> = Vec::new();
    if !coef.denom().is_one() {
        bottom.push(coef.denom().to_string());
    }
    bottom.extend(den.iter().map(|f| pp(3, f)));

    let body = match bottom.len() {
        0 => top.join("*"),
        1 => format!("{}/{}", top.join("*"), bottom[0]),
        _ => format!("{}/({})", top.join("*"), bottom.join("*")),
    };
    bracket(ctx, 2, format!("{sign}{body}"))
}

fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("({body})")
    } else {
        body
    }
}

pub(crate) fn show_rational(r: &Rational) -> String {
    if r.is_integer() {
        r.numer().to_string()
    } else {
        format!("{}/{}", r.numer(), r.denom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{exp, mul, sub};

    #[test]
    fn subtraction_and_fractions() {
        let x = Expr::var("x");
        let expr = sub(mul(Expr::constant(1, 3), exp(x.clone())), mul(Expr::integer(2), x));
        assert_eq!(pretty(&expr), "exp(x)/3 - 2*x");
    }

    #[test]
    fn derivative_uses_prime_marks() {
        let y = Expr::apply("y", Expr::var("x"));
        assert_eq!(pretty(&Expr::derivative(y.clone(), "x", 2)), "y''");
        assert_eq!(pretty(&Expr::derivative(y, "x", 4)), "y^(4)");
    }
}
