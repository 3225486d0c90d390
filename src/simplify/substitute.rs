use crate::expr::Expr;

/// Replaces every occurrence of the `target` sub-tree with `replacement`.
/// Matching is structural and outermost first, so a derivative of `y(x)`
/// is replaced before the `y(x)` inside it is visited.
pub fn substitute(expr: &Expr, target: &Expr, replacement: &Expr) -> Expr {
    if expr == target {
        return replacement.clone();
    }
    expr.map_children(|child| substitute(child, target, replacement))
}

/// Substitute variable `var` with `replacement` throughout `expr`.
pub fn substitute_var(expr: &Expr, var: &str, replacement: &Expr) -> Expr {
    substitute(expr, &Expr::var(var), replacement)
}
