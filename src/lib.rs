//! Step-by-step narrated solutions for ordinary differential equations typed in
//! shorthand such as `y' + 2y = e^x`.
//!
//! Text flows through four stages: [`normalize`] rewrites shorthand into
//! canonical text, [`parse_equation`] builds an [`ExpressionPair`], [`classify`]
//! tags it, and [`StepEngine`] narrates the solution as a list of [`Step`]s.
//! All algebra goes through the [`CasProvider`] trait; [`SymbolicCas`] is the
//! bundled implementation.
//!
//! ```
//! let steps = odesteps::solve_steps("y' + 2*y = e^x");
//! assert_eq!(steps[0].display, "y' + 2*y = e^x");
//! assert_eq!(odesteps::identify_type("dy/dx = x*y"), "Separable");
//! ```

pub mod calculus;
pub mod cas;
pub mod classify;
pub mod config;
pub mod engine;
pub mod equation;
pub mod error;
pub mod eval;
pub mod expr;
pub mod format;
pub mod notation;
pub mod parser;
pub mod polynomial;
pub mod simplify;
pub mod solver;
pub mod steps;
pub mod symbols;

use std::sync::OnceLock;

pub use cas::{CasProvider, SymbolicCas};
pub use classify::{Classification, TypeTag, classify};
pub use config::{Budget, EngineConfig};
pub use engine::StepEngine;
pub use equation::parse_equation;
pub use error::{CasResult, ComputationError, Error, Result};
pub use expr::{Expr, ExpressionPair, Rational};
pub use notation::{Normalizer, normalize};
pub use steps::{CoefficientPair, Derivation, Step, StepKind};
pub use symbols::SymbolTable;

fn default_engine() -> &'static StepEngine {
    static ENGINE: OnceLock<StepEngine> = OnceLock::new();
    ENGINE.get_or_init(StepEngine::new)
}

/// Classifies `raw` and returns its type label, e.g. `First Order Linear`.
/// Inputs that do not parse give `Unidentified: <reason>`.
pub fn identify_type(raw: &str) -> String {
    default_engine().identify_type(raw)
}

/// Narrated solution steps for `raw` under the default configuration.
pub fn solve_steps(raw: &str) -> Vec<Step> {
    default_engine().solve_steps(raw)
}
