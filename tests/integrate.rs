use odesteps::calculus::differentiate;
use odesteps::eval::{Environment, approx_eq, evaluate};
use odesteps::parser::parse_expr;
use odesteps::simplify::simplify_fully;
use odesteps::{Budget, CasProvider, ComputationError, Expr, SymbolTable, SymbolicCas};

const SAMPLES: [f64; 4] = [0.3, 0.7, 1.1, 1.4];

fn parse(input: &str) -> Expr {
    parse_expr(input, &SymbolTable::default()).expect("parse input")
}

fn integrate(input: &str) -> Expr {
    SymbolicCas::default()
        .integrate(&parse(input), "x")
        .unwrap_or_else(|err| panic!("integrate {input}: {err}"))
}

/// Differentiates the antiderivative back and compares it with the integrand.
fn assert_antiderivative(input: &str) {
    let integrand = parse(input);
    let result = integrate(input);
    assert!(!result.contains_integral(), "∫ {input} left unevaluated: {result:?}");
    let back = simplify_fully(differentiate("x", &result));
    for x in SAMPLES {
        let env = Environment::from([("x".to_string(), x)]);
        let a = evaluate(&back, &env).expect("evaluate derivative");
        let b = evaluate(&integrand, &env).expect("evaluate integrand");
        assert!(approx_eq(a, b, 1e-9), "∫ {input} at x = {x}: {a} vs {b}");
    }
}

#[test]
fn polynomials_and_powers() {
    assert_antiderivative("x^3");
    assert_antiderivative("3*x^2 + 2*x + 1");
    assert_antiderivative("(2*x + 1)^3");
    assert_antiderivative("sqrt(x)");
    assert_antiderivative("7");
}

#[test]
fn reciprocals() {
    assert_antiderivative("1/x");
    assert_antiderivative("1/(2*x + 1)");
    assert_antiderivative("1/(x^2 + 1)");
    assert_antiderivative("3/(4*x^2 + 9)");
}

#[test]
fn elementary_functions_of_affine_arguments() {
    assert_antiderivative("sin(2*x + 3)");
    assert_antiderivative("cos(x)");
    assert_antiderivative("tan(x)");
    assert_antiderivative("exp(3*x)");
    assert_antiderivative("exp(-2*x + 1)");
    assert_antiderivative("cosh(2*x)");
    assert_antiderivative("log(x)");
    assert_antiderivative("2^x");
}

#[test]
fn exponential_trig_products() {
    assert_antiderivative("exp(x)*sin(x)");
    assert_antiderivative("exp(2*x)*cos(3*x)");
}

#[test]
fn substitution() {
    assert_antiderivative("x*exp(x^2)");
    assert_antiderivative("2*x*cos(x^2)");
}

#[test]
fn by_parts() {
    assert_antiderivative("x*exp(x)");
    assert_antiderivative("x*sin(x)");
    assert_antiderivative("x^2*exp(x)");
    assert_antiderivative("x*log(x)");
}

#[test]
fn integrating_factor_shapes() {
    assert_antiderivative("exp(2*x)*exp(x)");
    assert_antiderivative("x*exp(2*x)");
}

#[test]
fn unclosed_part_stays_an_integral() {
    let result = integrate("x + exp(x^2)");
    assert!(result.contains_integral(), "expected an unevaluated integral: {result:?}");
    let back = simplify_fully(differentiate("x", &result));
    let integrand = parse("x + exp(x^2)");
    for x in SAMPLES {
        let env = Environment::from([("x".to_string(), x)]);
        let a = evaluate(&back, &env).expect("evaluate derivative");
        let b = evaluate(&integrand, &env).expect("evaluate integrand");
        assert!(approx_eq(a, b, 1e-9), "at x = {x}: {a} vs {b}");
    }
}

#[test]
fn step_budget_is_enforced() {
    let cas = SymbolicCas::new(Budget {
        max_steps: 1,
        ..Budget::default()
    });
    assert!(matches!(
        cas.integrate(&parse("x*exp(x)"), "x"),
        Err(ComputationError::BudgetExceeded { .. })
    ));
}
