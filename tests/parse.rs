use odesteps::expr::{add, exp, mul, zero};
use odesteps::{Error, Expr, SymbolTable, SymbolicCas, parse_equation};

fn parse(canonical: &str) -> odesteps::Result<odesteps::ExpressionPair> {
    parse_equation(canonical, &SymbolTable::default(), &SymbolicCas::default())
}

#[test]
fn linear_equation_sides() {
    let pair = parse("Derivative(y(x), x) + 2*y(x) = exp(x)").expect("parse equation");
    let symbols = SymbolTable::default();
    let expected_lhs = add(
        symbols.unknown_derivative(1),
        mul(Expr::integer(2), symbols.unknown()),
    );
    assert_eq!(pair.lhs, expected_lhs);
    assert_eq!(pair.rhs, exp(Expr::var("x")));
}

#[test]
fn implicit_juxtaposition() {
    let pair = parse("2y(x) = 3x").expect("parse equation");
    assert_eq!(pair.lhs, mul(Expr::integer(2), SymbolTable::default().unknown()));
    assert_eq!(pair.rhs, mul(Expr::integer(3), Expr::var("x")));
}

#[test]
fn missing_equals_means_zero() {
    let pair = parse("Derivative(y(x), x) - y(x)").expect("parse expression");
    assert_eq!(pair.rhs, zero());
    assert!(pair.lhs.contains_derivative());
}

#[test]
fn empty_sides_are_parse_errors() {
    for input in ["", "   ", "= 3", "x =", "="] {
        assert!(
            matches!(parse(input), Err(Error::Parse(_))),
            "expected a parse error for {input:?}"
        );
    }
}

#[test]
fn malformed_text_is_a_parse_error() {
    for input in ["x + (", "2 * * x", "y(x) = )", "Derivative(y(x))"] {
        assert!(
            matches!(parse(input), Err(Error::Parse(_))),
            "expected a parse error for {input:?}"
        );
    }
}

#[test]
fn only_top_level_equals_splits() {
    assert!(matches!(parse("x = 1 = 2"), Err(Error::Parse(_))));
}

#[test]
fn higher_derivative_order() {
    let pair = parse("Derivative(y(x), x, x) + y(x) = 0").expect("parse equation");
    let second = SymbolTable::default().unknown_derivative(2);
    assert!(pair.lhs.contains(&second));
}
