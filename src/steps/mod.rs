//! Pedagogical step records and the per-type narrations that produce them.

pub(crate) mod fallback;
pub(crate) mod linear;
pub(crate) mod separable;

use std::fmt;

use crate::cas::CasProvider;
use crate::classify::Classification;
use crate::error::Error;
use crate::expr::{Expr, ExpressionPair};
use crate::symbols::SymbolTable;

pub use linear::CoefficientPair;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
    Input,
    Identification,
    Theory,
    Calculation,
    Insight,
    Solution,
    Warning,
    Error,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Input => "input",
            StepKind::Identification => "identification",
            StepKind::Theory => "theory",
            StepKind::Calculation => "calculation",
            StepKind::Insight => "insight",
            StepKind::Solution => "solution",
            StepKind::Warning => "warning",
            StepKind::Error => "error",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a solution walk-through. `display` is LaTeX, `explanation` plain text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub ordinal: usize,
    pub display: String,
    pub explanation: String,
    pub hint: Option<String>,
    pub kind: StepKind,
}

/// Append-only list of steps; ordinals start at 1.
#[derive(Clone, Debug, Default)]
pub struct StepLog {
    steps: Vec<Step>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: StepKind,
        display: impl Into<String>,
        explanation: impl Into<String>,
    ) -> &mut Self {
        self.push_step(kind, display.into(), explanation.into(), None)
    }

    pub fn push_with_hint(
        &mut self,
        kind: StepKind,
        display: impl Into<String>,
        explanation: impl Into<String>,
        hint: impl Into<String>,
    ) -> &mut Self {
        self.push_step(kind, display.into(), explanation.into(), Some(hint.into()))
    }

    fn push_step(
        &mut self,
        kind: StepKind,
        display: String,
        explanation: String,
        hint: Option<String>,
    ) -> &mut Self {
        self.steps.push(Step {
            ordinal: self.steps.len() + 1,
            display,
            explanation,
            hint,
            kind,
        });
        self
    }

    /// Appends an error step describing `err`. Parse failures carry a syntax hint.
    pub fn push_error(&mut self, err: &Error) -> &mut Self {
        let explanation = format!("The equation could not be processed further: {err}");
        match err {
            Error::Parse(_) => {
                self.push_with_hint(StepKind::Error, "\\text{Error}", explanation, SYNTAX_HINT)
            }
            _ => self.push(StepKind::Error, "\\text{Error}", explanation),
        }
    }

    pub fn push_error_with_hint(&mut self, err: &Error, hint: impl Into<String>) -> &mut Self {
        self.push_with_hint(
            StepKind::Error,
            "\\text{Error}",
            format!("The equation could not be processed further: {err}"),
            hint,
        )
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

/// Rendered steps plus the symbolic solution they arrive at, when there is one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derivation {
    pub steps: Vec<Step>,
    pub solution: Option<ExpressionPair>,
}

/// What a narration needs about the request.
pub(crate) struct Narration<'a, C> {
    pub cas: &'a C,
    pub symbols: &'a SymbolTable,
    pub pair: &'a ExpressionPair,
    pub classification: Classification,
}

impl<C: CasProvider> Narration<'_, C> {
    pub fn render_pair(&self, pair: &ExpressionPair) -> String {
        format!("{} = {}", self.cas.render(&pair.lhs), self.cas.render(&pair.rhs))
    }

    pub fn unknown(&self) -> Expr {
        self.symbols.unknown()
    }
}

pub(crate) const CONSTANT_HINT: &str =
    "C is an arbitrary constant; only an initial condition fixes its value.";

pub(crate) const IDENTIFICATION_HINT: &str =
    "Look at the structure of the equation: the highest derivative and how y appears.";

pub(crate) const SYNTAX_HINT: &str =
    "Check the syntax of the equation. Valid examples: y' + 2y = e^x, dy/dx = xy";
