use odesteps::calculus::{differentiate, differentiate_n};
use odesteps::eval::{Environment, approx_eq, evaluate};
use odesteps::parser::parse_expr;
use odesteps::simplify::simplify_fully;
use odesteps::{Expr, SymbolTable};

const SAMPLES: [f64; 4] = [0.3, 0.7, 1.3, 2.1];

fn parse(input: &str) -> Expr {
    parse_expr(input, &SymbolTable::default()).expect("parse input")
}

fn assert_same_values(got: &Expr, expected: &Expr, context: &str) {
    for x in SAMPLES {
        let env = Environment::from([("x".to_string(), x)]);
        let a = evaluate(got, &env).expect("evaluate result");
        let b = evaluate(expected, &env).expect("evaluate expected");
        assert!(approx_eq(a, b, 1e-9), "{context} at x = {x}: {a} vs {b}");
    }
}

fn assert_diff_eq(input: &str, expected: &str) {
    let got = simplify_fully(differentiate("x", &parse(input)));
    assert_same_values(&got, &parse(expected), &format!("d/dx {input}"));
}

#[test]
fn constants_and_variables() {
    assert_eq!(simplify_fully(differentiate("x", &parse("x"))), Expr::integer(1));
    assert_eq!(simplify_fully(differentiate("x", &parse("5"))), Expr::integer(0));
    assert_eq!(simplify_fully(differentiate("x", &parse("t"))), Expr::integer(0));
}

#[test]
fn polynomials() {
    assert_eq!(
        simplify_fully(differentiate("x", &parse("x^3"))),
        simplify_fully(parse("3*x^2"))
    );
    assert_diff_eq("2*x^2 + 3*x - 7", "4*x + 3");
    assert_diff_eq("(2*x + 1)^3", "6*(2*x + 1)^2");
}

#[test]
fn products_and_quotients() {
    assert_diff_eq("x*sin(x)", "sin(x) + x*cos(x)");
    assert_diff_eq("exp(x)/x", "exp(x)/x - exp(x)/x^2");
    assert_diff_eq("1/(x^2 + 1)", "-2*x/(x^2 + 1)^2");
}

#[test]
fn elementary_functions() {
    assert_diff_eq("sin(2*x)", "2*cos(2*x)");
    assert_diff_eq("cos(x)", "-sin(x)");
    assert_diff_eq("tan(x)", "1/cos(x)^2");
    assert_diff_eq("atan(x)", "1/(1 + x^2)");
    assert_diff_eq("sinh(x)", "cosh(x)");
    assert_diff_eq("exp(x^2)", "2*x*exp(x^2)");
    assert_diff_eq("log(x)", "1/x");
    assert_diff_eq("sqrt(x)", "1/(2*sqrt(x))");
}

#[test]
fn general_power() {
    assert_diff_eq("x^x", "x^x*(log(x) + 1)");
    assert_diff_eq("2^x", "2^x*log(2)");
}

#[test]
fn higher_order() {
    let got = simplify_fully(differentiate_n("x", &parse("x^4"), 3));
    assert_same_values(&got, &parse("24*x"), "third derivative of x^4");
    let got = simplify_fully(differentiate_n("x", &parse("sin(x)"), 2));
    assert_same_values(&got, &parse("-sin(x)"), "second derivative of sin(x)");
}

#[test]
fn unknown_function_gains_order() {
    let symbols = SymbolTable::default();
    let y = symbols.unknown();
    assert_eq!(differentiate("x", &y), symbols.unknown_derivative(1));
    assert_eq!(
        differentiate("x", &symbols.unknown_derivative(1)),
        symbols.unknown_derivative(2)
    );
    let squared = simplify_fully(differentiate("x", &parse("y(x)^2")));
    assert!(squared.contains(&symbols.unknown_derivative(1)));
    assert!(squared.contains(&y));
}

#[test]
fn derivative_undoes_integral() {
    let integrand = parse("exp(x^2)");
    let integral = Expr::Integral(integrand.clone().boxed(), "x".to_string());
    assert_eq!(simplify_fully(differentiate("x", &integral)), simplify_fully(integrand));
}
