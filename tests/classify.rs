use odesteps::{StepEngine, TypeTag, identify_type};

fn expect_class(raw: &str, order: u32, tag: TypeTag) {
    let (_, classification) = StepEngine::new()
        .classify_input(raw)
        .unwrap_or_else(|err| panic!("classify {raw:?}: {err}"));
    assert_eq!(classification.order, order, "order of {raw:?}");
    assert_eq!(classification.tag, tag, "type of {raw:?}");
}

#[test]
fn first_order_linear() {
    expect_class("y' + 2*y = e^x", 1, TypeTag::FirstOrderLinear);
    expect_class("y' + y = 0", 1, TypeTag::FirstOrderLinear);
    expect_class("x*y' - y = x^2", 1, TypeTag::FirstOrderLinear);
    expect_class("y' + sin(x)*y = cos(x)", 1, TypeTag::FirstOrderLinear);
}

#[test]
fn separable() {
    expect_class("dy/dx = x*y", 1, TypeTag::Separable);
    expect_class("y' = y^2", 1, TypeTag::Separable);
    expect_class("dy/dx = exp(x)/y", 1, TypeTag::Separable);
}

#[test]
fn nonlinear_first_order_is_unrecognized() {
    expect_class("y' + y^2 = x", 1, TypeTag::Unrecognized);
    expect_class("y' + sin(y) = 0", 1, TypeTag::Unrecognized);
}

#[test]
fn by_order() {
    expect_class("x + 1 = 2", 0, TypeTag::Unrecognized);
    expect_class("y'' + y = 0", 2, TypeTag::SecondOrder);
    expect_class("y''' = y", 3, TypeTag::HigherOrder);
}

#[test]
fn labels() {
    assert_eq!(identify_type("y' + 2*y = e^x"), "First Order Linear");
    assert_eq!(identify_type("dy/dx = x*y"), "Separable");
    assert_eq!(identify_type("y'' + y = 0"), "Second Order");
    assert_eq!(identify_type("y''' = y"), "Order 3");
    assert_eq!(identify_type("x + 1 = 2"), "Not a differential equation");
    assert_eq!(identify_type("y' + y^2 = x"), "First Order (type undetermined)");
}

#[test]
fn unparsable_input_is_unidentified() {
    for raw in ["", "   ", "y' + (", "= y"] {
        let label = identify_type(raw);
        assert!(label.starts_with("Unidentified: "), "{raw:?} gave {label:?}");
    }
}
