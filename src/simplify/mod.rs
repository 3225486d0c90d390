//! Symbolic simplification and substitution utilities.

mod rules;
mod substitute;

pub(crate) use rules::split_coeff;
pub use rules::{
    DISTRIBUTE_TERM_LIMIT, SIMPLIFY_ITERATION_LIMIT, simplify, simplify_add, simplify_div,
    simplify_fully, simplify_mul, simplify_neg, simplify_pow, simplify_sub, simplify_sum,
    simplify_with_limit,
};
pub use substitute::{substitute, substitute_var};
