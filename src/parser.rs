//! Expression parser over the canonical text produced by the notation normalizer.

use std::cell::Cell;

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric0, char, digit0, digit1, multispace0};
use nom::combinator::{all_consuming, map, map_res, opt, recognize};
use nom::error::{VerboseError, VerboseErrorKind, convert_error};
use nom::multi::{fold_many0, many1};
use nom::sequence::{delimited, pair, preceded};
use num_bigint::BigInt;
use num_traits::{One, Pow};

use crate::error::{Error, Result};
use crate::expr::{Expr, Rational, div, mul, neg, pow, product, sub};
use crate::symbols::SymbolTable;

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Deepest chain of brackets, signs and function applications one side may nest.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parses one side of an equation.
pub fn parse_expr(input: &str, symbols: &SymbolTable) -> Result<Expr> {
    if input.trim().is_empty() {
        return Err(Error::Parse("empty expression".to_string()));
    }
    let parser = ExprParser {
        symbols,
        depth: Cell::new(0),
    };
    match all_consuming(ws(|i| parser.sum(i)))(input) {
        Ok((_, expr)) => Ok(expr),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(Error::Parse(convert_error(input, e)))
        }
        Err(nom::Err::Incomplete(_)) => Err(Error::Parse("unexpected end of input".to_string())),
    }
}

struct ExprParser<'s> {
    symbols: &'s SymbolTable,
    depth: Cell<usize>,
}

enum DerivativeArg<'a> {
    Var(&'a str),
    Count(&'a str),
}

impl ExprParser<'_> {
    /// Runs `inner` one nesting level deeper, failing past `MAX_NESTING_DEPTH`.
    fn nested<'a, O>(
        &self,
        input: &'a str,
        inner: impl FnOnce(&'a str) -> PResult<'a, O>,
    ) -> PResult<'a, O> {
        let depth = self.depth.get();
        if depth >= MAX_NESTING_DEPTH {
            return failure(input, "expression is nested too deeply");
        }
        self.depth.set(depth + 1);
        let result = inner(input);
        self.depth.set(depth);
        result
    }

    fn sum<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (rest, init) = self.product(input)?;
        fold_many0(
            pair(ws(alt((char('+'), char('-')))), |i| self.product(i)),
            move || init.clone(),
            |acc, (op, rhs)| match op {
                '-' => sub(acc, rhs),
                _ => Expr::Add(acc.boxed(), rhs.boxed()),
            },
        )(rest)
    }

    /// Explicit `*` and `/`, plus juxtaposition of operands that do not start with a sign.
    fn product<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (rest, init) = self.unary(input)?;
        fold_many0(
            alt((
                pair(ws(alt((char('*'), char('/')))), |i| self.unary(i)),
                map(preceded(multispace0, |i| self.power(i)), |rhs| ('*', rhs)),
            )),
            move || init.clone(),
            |acc, (op, rhs)| match op {
                '/' => div(acc, rhs),
                _ => mul(acc, rhs),
            },
        )(rest)
    }

    fn unary<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        for sign in ['-', '+'] {
            let signed = preceded(ws(char(sign)), |i| self.nested(i, |j| self.unary(j)))(input);
            match signed {
                Ok((rest, inner)) if sign == '-' => return Ok((rest, neg(inner))),
                Ok(parsed) => return Ok(parsed),
                Err(nom::Err::Error(_)) => {}
                Err(e) => return Err(e),
            }
        }
        self.power(input)
    }

    /// Right-associative; the exponent may carry its own sign.
    fn power<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (rest, base) = self.primary(input)?;
        match preceded(ws(alt((tag("**"), tag("^")))), |i| self.unary(i))(rest) {
            Ok((next, exp)) => Ok((next, pow(base, exp))),
            Err(nom::Err::Error(_)) => Ok((rest, base)),
            Err(e) => Err(e),
        }
    }

    fn primary<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        self.nested(input, |input| {
            preceded(
                multispace0,
                alt((|i| self.parens(i), number, |i| self.identifier(i))),
            )(input)
        })
    }

    fn parens<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        delimited(ws(char('(')), |i| self.sum(i), ws(char(')')))(input)
    }

    fn identifier<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (rest, name) = recognize(pair(alpha1, alphanumeric0))(input)?;
        if name == "Derivative" {
            return self.derivative(rest);
        }
        if let Some(kind) = self.symbols.function(name) {
            let (rest, arg) = alt((|i| self.parens(i), |i| self.primary(i)))(rest)?;
            return Ok((rest, kind.apply(arg)));
        }
        if name == self.symbols.dependent() {
            if let Ok((after, arg)) = self.parens(rest) {
                return Ok((after, Expr::apply(name, arg)));
            }
        }
        if let Some(expr) = self.symbols.resolve(name) {
            return Ok((rest, expr));
        }
        if name.len() == 1 || name.chars().any(|c| c.is_ascii_digit()) {
            return Ok((rest, Expr::var(name)));
        }
        // Unknown words are read as products of single-letter symbols.
        let letters = name.chars().map(|c| {
            let letter = c.to_string();
            self.symbols
                .resolve(&letter)
                .unwrap_or_else(|| Expr::Variable(letter))
        });
        Ok((rest, product(letters)))
    }

    /// `Derivative(f, x, x, ...)` or `Derivative(f, x, n)`.
    fn derivative<'a>(&self, input: &'a str) -> PResult<'a, Expr> {
        let (rest, inner) = preceded(ws(char('(')), |i| self.sum(i))(input)?;
        let (rest, args) = many1(preceded(
            ws(char(',')),
            ws(alt((
                map(digit1, DerivativeArg::Count),
                map(recognize(pair(alpha1, alphanumeric0)), DerivativeArg::Var),
            ))),
        ))(rest)?;
        let (rest, _) = ws(char(')'))(rest)?;

        let mut var: Option<&str> = None;
        let mut order: u32 = 0;
        for arg in args {
            match arg {
                DerivativeArg::Var(v) => {
                    if var.is_some_and(|seen| seen != v) {
                        return failure(input, "mixed partial derivatives are not supported");
                    }
                    var = Some(v);
                    order += 1;
                }
                DerivativeArg::Count(n) => {
                    let Ok(count) = n.parse::<u32>() else {
                        return failure(input, "derivative order is too large");
                    };
                    if var.is_none() || count == 0 {
                        return failure(input, "derivative order must follow a variable");
                    }
                    order = order.saturating_add(count - 1);
                }
            }
        }
        match var {
            Some(v) => Ok((rest, Expr::derivative(inner, v, order))),
            None => failure(input, "derivative needs a variable"),
        }
    }
}

fn number(input: &str) -> PResult<'_, Expr> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        parse_decimal,
    )(input)
}

/// Reads a decimal literal as an exact rational.
fn parse_decimal(text: &str) -> std::result::Result<Expr, num_bigint::ParseBigIntError> {
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    let digits = format!("{whole}{frac}");
    let numer: BigInt = digits.parse()?;
    let denom = Pow::pow(BigInt::from(10u32), frac.len() as u32);
    if denom.is_one() {
        Ok(Expr::Constant(Rational::from_integer(numer)))
    } else {
        Ok(Expr::Constant(Rational::new(numer, denom)))
    }
}

fn failure<'a, O>(input: &'a str, msg: &'static str) -> PResult<'a, O> {
    Err(nom::Err::Failure(VerboseError {
        errors: vec![(input, VerboseErrorKind::Context(msg))],
    }))
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Expr {
        parse_expr(input, &SymbolTable::default()).expect("parse input")
    }

    #[test]
    fn decimals_are_exact() {
        assert_eq!(parse("2.5"), Expr::constant(5, 2));
        assert_eq!(parse("3."), Expr::integer(3));
    }

    #[test]
    fn unknown_words_split_into_letters() {
        assert_eq!(parse("ab"), mul(Expr::var("a"), Expr::var("b")));
        assert_eq!(parse("C1"), Expr::var("C1"));
    }

    #[test]
    fn derivative_order_by_count() {
        let expected = Expr::derivative(SymbolTable::default().unknown(), "x", 3);
        assert_eq!(parse("Derivative(y(x), x, 3)"), expected);
        assert_eq!(parse("Derivative(y(x), x, x, x)"), expected);
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let symbols = SymbolTable::default();
        let nest = |depth: usize| format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert!(parse_expr(&nest(20), &symbols).is_ok());
        let err = parse_expr(&nest(MAX_NESTING_DEPTH + 1), &symbols).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"), "{err}");
        assert!(parse_expr(&"-".repeat(500), &symbols).is_err());
        assert!(parse_expr(&"sin ".repeat(500), &symbols).is_err());
    }

    #[test]
    fn mixed_derivative_variables_fail() {
        assert!(parse_expr("Derivative(y(x), x, t)", &SymbolTable::default()).is_err());
    }
}
