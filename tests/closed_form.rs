use odesteps::eval::{Environment, approx_eq, evaluate};
use odesteps::parser::parse_expr;
use odesteps::{
    Budget, CasProvider, ComputationError, Expr, ExpressionPair, StepEngine, SymbolTable,
    SymbolicCas,
};

const SAMPLES: [f64; 4] = [0.3, 0.7, 1.1, 1.6];

fn equation(raw: &str) -> ExpressionPair {
    let (pair, _) = StepEngine::new()
        .classify_input(raw)
        .unwrap_or_else(|err| panic!("parse {raw:?}: {err}"));
    pair
}

fn solve_with(cas: &SymbolicCas, raw: &str) -> Result<ExpressionPair, ComputationError> {
    let pair = equation(raw);
    cas.solve_closed_form(&pair.lhs, &pair.rhs, &SymbolTable::default().unknown())
}

fn solve(raw: &str) -> ExpressionPair {
    solve_with(&SymbolicCas::default(), raw).unwrap_or_else(|err| panic!("solve {raw:?}: {err}"))
}

fn env_at(x: f64) -> Environment {
    Environment::from([
        ("x".to_string(), x),
        ("C".to_string(), 0.8),
        ("C1".to_string(), 0.8),
        ("C2".to_string(), -1.3),
        ("C3".to_string(), 0.6),
    ])
}

/// Checks the explicit solution of `raw` against `expected`, constants included.
fn assert_solution(raw: &str, expected: &str) {
    let solution = solve(raw);
    assert_eq!(solution.lhs, SymbolTable::default().unknown(), "{raw:?} is not explicit");
    let expected = parse_expr(expected, &SymbolTable::default()).expect("parse expected");
    for x in SAMPLES {
        let env = env_at(x);
        let got = evaluate(&solution.rhs, &env).expect("evaluate solution");
        let want = evaluate(&expected, &env).expect("evaluate expected");
        assert!(approx_eq(got, want, 1e-9), "{raw:?} at x = {x}: {got} vs {want}");
    }
}

#[test]
fn first_order_linear_by_integrating_factor() {
    assert_solution("y' + 2*y = e^x", "exp(x)/3 + C*exp(-2*x)");
    assert_solution("y' + y = 0", "C*exp(-x)");
    assert_solution("x*y' + y = x^2", "x^2/3 + C/x");
}

#[test]
fn separable_growth_is_a_gaussian_family() {
    let solution = solve("dy/dx = x*y");
    assert_eq!(solution.lhs, SymbolTable::default().unknown());
    // y / exp(x^2/2) must not depend on x.
    let ratios: Vec<f64> = SAMPLES
        .iter()
        .map(|x| {
            let env = env_at(*x);
            evaluate(&solution.rhs, &env).expect("evaluate solution") / (x * x / 2.0).exp()
        })
        .collect();
    for ratio in &ratios[1..] {
        assert!(approx_eq(*ratio, ratios[0], 1e-9), "ratios {ratios:?}");
    }
}

#[test]
fn separable_nonlinear() {
    assert_solution("y' = y^2", "-1/(x + C)");
}

#[test]
fn separable_without_explicit_form_stays_implicit() {
    let solution = solve("dy/dx = x/(y + exp(y))");
    let unknown = SymbolTable::default().unknown();
    assert!(solution.lhs.contains(&unknown), "implicit lhs: {solution:?}");
    assert!(!solution.rhs.contains(&unknown), "implicit rhs: {solution:?}");
    assert!(solution.rhs.contains_var("C"));
}

#[test]
fn constant_coefficients_distinct_real_roots() {
    assert_solution("y'' - 3y' + 2y = 0", "C1*exp(x) + C2*exp(2*x)");
    assert_solution("y''' - y' = 0", "C1 + C2*exp(x) + C3*exp(-x)");
}

#[test]
fn constant_coefficients_repeated_root() {
    assert_solution("y'' - 2y' + y = 0", "C1*exp(x) + C2*x*exp(x)");
}

#[test]
fn constant_coefficients_complex_roots() {
    assert_solution("y'' + y = 0", "C1*cos(x) + C2*sin(x)");
    assert_solution(
        "y'' + 2y' + 5y = 0",
        "C1*exp(-x)*cos(2*x) + C2*exp(-x)*sin(2*x)",
    );
}

#[test]
fn constant_coefficients_irrational_roots() {
    assert_solution("y'' - 2y = 0", "C1*exp(sqrt(2)*x) + C2*exp(-sqrt(2)*x)");
}

#[test]
fn forced_second_order_by_variation_of_parameters() {
    assert_solution("y'' - y = x", "C1*exp(x) + C2*exp(-x) - x");
}

#[test]
fn algebraic_equation_is_isolated() {
    assert_solution("2*y = x + 4", "x/2 + 2");
}

#[test]
fn nonlinear_second_order_has_no_closed_form() {
    assert!(matches!(
        solve_with(&SymbolicCas::default(), "y'' = y^2"),
        Err(ComputationError::NotClosed(_))
    ));
}

#[test]
fn oversized_equation_exceeds_budget() {
    let cas = SymbolicCas::new(Budget {
        max_expr_size: 1,
        ..Budget::default()
    });
    assert!(matches!(
        solve_with(&cas, "y' + 2*y = e^x"),
        Err(ComputationError::BudgetExceeded { .. })
    ));
}

#[test]
fn unknown_must_be_an_application() {
    let pair = equation("y' = y");
    let result = SymbolicCas::default().solve_closed_form(&pair.lhs, &pair.rhs, &Expr::var("y"));
    assert!(matches!(result, Err(ComputationError::Failed(_))));
}
