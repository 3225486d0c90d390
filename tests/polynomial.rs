use odesteps::expr::rational;
use odesteps::parser::parse_expr;
use odesteps::polynomial::Poly;
use odesteps::{Rational, SymbolTable};

fn poly(coeffs: &[i64]) -> Poly {
    Poly::from_coeffs(coeffs.iter().map(|c| Rational::from_integer((*c).into())))
}

fn int(n: i64) -> Rational {
    Rational::from_integer(n.into())
}

#[test]
fn reads_polynomial_expressions() {
    let expr = parse_expr("(x + 1)^2 - 3*x", &SymbolTable::default()).expect("parse input");
    let p = Poly::from_expr(&expr, "x").expect("polynomial");
    assert_eq!(p, poly(&[1, -1, 1]));
    assert_eq!(p.degree(), Some(2));

    let halved = parse_expr("x^2/2", &SymbolTable::default()).expect("parse input");
    assert_eq!(
        Poly::from_expr(&halved, "x"),
        Some(Poly::monomial(rational(1, 2), 2))
    );
}

#[test]
fn rejects_non_polynomials() {
    for input in ["sin(x)", "1/x", "x^(1/2)", "exp(x) + 1", "x/(x + 1)"] {
        let expr = parse_expr(input, &SymbolTable::default()).expect("parse input");
        assert!(Poly::from_expr(&expr, "x").is_none(), "{input} is not a polynomial");
    }
}

#[test]
fn arithmetic() {
    let a = poly(&[1, 1]);
    let b = poly(&[-1, 1]);
    assert_eq!(a.clone() * b.clone(), poly(&[-1, 0, 1]));
    assert_eq!(a.clone() + b.clone(), poly(&[0, 2]));
    assert_eq!(a.clone() - a.clone(), Poly::zero());
    assert_eq!(a.pow(3), poly(&[1, 3, 3, 1]));
    assert_eq!(poly(&[5, 3, 0, 2]).derivative(), poly(&[3, 0, 6]));
    assert_eq!(poly(&[1, -3, 2]).evaluate(&int(2)), int(3));
}

#[test]
fn division() {
    let (q, r) = poly(&[-1, 0, 0, 1]).div_rem(&poly(&[-1, 1]));
    assert_eq!(q, poly(&[1, 1, 1]));
    assert!(r.is_zero());

    let (q, r) = poly(&[1, 0, 1]).div_rem(&poly(&[0, 2]));
    assert_eq!(q, Poly::monomial(rational(1, 2), 1));
    assert_eq!(r, poly(&[1]));
    assert!(poly(&[1, 0, 1]).div_exact(&poly(&[1, 1])).is_none());
}

#[test]
fn distinct_rational_roots() {
    let roots = poly(&[2, -3, 1]).rational_roots();
    assert_eq!(roots.roots, vec![(int(1), 1), (int(2), 1)]);
    assert_eq!(roots.residual, poly(&[1]));
}

#[test]
fn fractional_and_negative_roots() {
    // (2x - 1)(x + 3)
    let roots = poly(&[-3, 5, 2]).rational_roots();
    assert_eq!(roots.roots, vec![(int(-3), 1), (rational(1, 2), 1)]);
    assert_eq!(roots.residual, poly(&[2]));
}

#[test]
fn repeated_roots_carry_multiplicity() {
    // x^2 (x - 1)
    let roots = poly(&[0, 0, -1, 1]).rational_roots();
    assert_eq!(roots.roots, vec![(int(0), 2), (int(1), 1)]);

    // (x + 2)^3
    let roots = poly(&[8, 12, 6, 1]).rational_roots();
    assert_eq!(roots.roots, vec![(int(-2), 3)]);
    assert_eq!(roots.residual.degree(), Some(0));
}

#[test]
fn irreducible_quadratic_is_left_as_residual() {
    let p = poly(&[1, 0, 1]);
    let roots = p.rational_roots();
    assert!(roots.roots.is_empty());
    assert_eq!(roots.residual, p);

    // (x - 1)(x^2 - 2)
    let roots = poly(&[2, -2, -1, 1]).rational_roots();
    assert_eq!(roots.roots, vec![(int(1), 1)]);
    assert_eq!(roots.residual, poly(&[-2, 0, 1]));
}
