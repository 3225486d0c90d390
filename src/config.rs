//! Engine configuration and per-call computation budgets.

use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::error::{CasResult, ComputationError};
use crate::expr::Expr;

pub const DEFAULT_MAX_EXPR_SIZE: usize = 2_000;
pub const DEFAULT_MAX_STEPS: usize = 4_000;
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(2);

/// Limits applied to every computer-algebra call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    /// Largest expression, in nodes, accepted as input or produced along the way.
    pub max_expr_size: usize,
    /// Strategy attempts allowed in one call.
    pub max_steps: usize,
    pub time_limit: Option<Duration>,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_expr_size: DEFAULT_MAX_EXPR_SIZE,
            max_steps: DEFAULT_MAX_STEPS,
            time_limit: Some(DEFAULT_TIME_LIMIT),
        }
    }
}

impl Budget {
    pub fn unlimited() -> Self {
        Self {
            max_expr_size: usize::MAX,
            max_steps: usize::MAX,
            time_limit: None,
        }
    }

    /// Starts metering a single call.
    pub fn start(&self) -> Meter<'_> {
        Meter {
            budget: self,
            started: Instant::now(),
            steps: Cell::new(0),
        }
    }
}

/// Tracks one call against its [`Budget`].
#[derive(Debug)]
pub struct Meter<'b> {
    budget: &'b Budget,
    started: Instant,
    steps: Cell<usize>,
}

impl Meter<'_> {
    /// Counts one unit of work and fails once the step or time limit is spent.
    pub fn tick(&self) -> CasResult<()> {
        let steps = self.steps.get() + 1;
        self.steps.set(steps);
        if steps > self.budget.max_steps {
            return Err(ComputationError::BudgetExceeded {
                what: "strategy steps",
                limit: self.budget.max_steps,
            });
        }
        if let Some(limit) = self.budget.time_limit {
            if self.started.elapsed() > limit {
                return Err(ComputationError::TimedOut(limit));
            }
        }
        Ok(())
    }

    pub fn check_size(&self, expr: &Expr) -> CasResult<()> {
        if expr.size() > self.budget.max_expr_size {
            Err(ComputationError::BudgetExceeded {
                what: "expression size",
                limit: self.budget.max_expr_size,
            })
        } else {
            Ok(())
        }
    }

    pub fn steps_used(&self) -> usize {
        self.steps.get()
    }
}

/// Names and limits used by a step engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub independent: String,
    pub dependent: String,
    pub budget: Budget,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            independent: "x".to_string(),
            dependent: "y".to_string(),
            budget: Budget::default(),
        }
    }
}
