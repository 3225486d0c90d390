use odesteps::notation::Rule;
use odesteps::{Normalizer, normalize};

fn expect_normalized(input: &str, expected: &str) {
    let actual = normalize(input);
    assert_eq!(actual, expected, "normalization mismatch for {input:?}");
}

#[test]
fn prime_markers() {
    expect_normalized("y' + 2*y = e^x", "Derivative(y(x), x) + 2*y(x) = exp(x)");
    expect_normalized("y'' + y = 0", "Derivative(y(x), x, x) + y(x) = 0");
    expect_normalized("y''' = y", "Derivative(y(x), x, x, x) = y(x)");
    expect_normalized(
        "y'' - 3y' + 2y = 0",
        "Derivative(y(x), x, x) - 3Derivative(y(x), x) + 2y(x) = 0",
    );
}

#[test]
fn leibniz_markers() {
    expect_normalized("dy/dx = x*y", "Derivative(y(x), x) = x*y(x)");
    expect_normalized("d²y/dx² = -y", "Derivative(y(x), x, x) = -y(x)");
    expect_normalized("d^2y/dx^2 + y = 0", "Derivative(y(x), x, x) + y(x) = 0");
}

#[test]
fn exponentials() {
    expect_normalized("e^x", "exp(x)");
    expect_normalized("2e^x", "2exp(x)");
    expect_normalized("e^(2*x) + e^(-x)", "exp(2*x) + exp(-x)");
    expect_normalized("e^(sin(x))", "exp(sin(x))");
    expect_normalized("exp(x)", "exp(x)");
}

#[test]
fn bare_dependent_is_applied() {
    expect_normalized("y", "y(x)");
    expect_normalized("y(x) + y", "y(x) + y(x)");
    expect_normalized("sin(y)", "sin(y(x))");
}

#[test]
fn no_markers_remain() {
    for raw in ["y' = y", "dy/dx + y = x", "y'' + y' = 0", "d²y/dx² = 1"] {
        let canonical = normalize(raw);
        assert!(!canonical.contains('\''), "prime left in {canonical:?}");
        assert!(!canonical.contains("dy/dx"), "leibniz left in {canonical:?}");
    }
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    expect_normalized("   y' = y  ", "Derivative(y(x), x) = y(x)");
    expect_normalized(" \t\n", "");
}

#[test]
fn deterministic() {
    for raw in ["y' + 2*y = e^x", "dy/dx = x*y", "e^(e^x)", "garbage ' text"] {
        assert_eq!(normalize(raw), normalize(raw));
    }
}

#[test]
fn custom_names() {
    let normalizer = Normalizer::new("u", "t");
    assert_eq!(normalizer.normalize("u' = t*u"), "Derivative(u(t), t) = t*u(t)");
    assert_eq!(normalizer.normalize("du/dt = u"), "Derivative(u(t), t) = u(t)");
}

#[test]
fn rule_order_is_fixed() {
    let normalizer = Normalizer::default();
    let rules = normalizer.rules();
    assert_eq!(rules.len(), 9);
    assert!(matches!(&rules[0], Rule::Literal { from, .. } if from == "y'''"));
    assert!(matches!(&rules[5], Rule::Literal { from, .. } if from == "dy/dx"));
    assert_eq!(rules[6], Rule::ExpGroup);
    assert_eq!(rules[7], Rule::ExpToken);
}
