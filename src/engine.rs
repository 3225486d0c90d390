//! The normalize → parse → classify → narrate pipeline.

use tracing::debug;

use crate::cas::{CasProvider, SymbolicCas};
use crate::classify::{Classification, TypeTag, classify};
use crate::config::EngineConfig;
use crate::equation::parse_equation;
use crate::error::Result;
use crate::expr::ExpressionPair;
use crate::notation::Normalizer;
use crate::steps::{self, Derivation, Narration, Step, StepKind, StepLog};
use crate::symbols::SymbolTable;

/// Turns raw equation text into classified solution steps. Holds only
/// configuration, so one engine can serve any number of threads.
#[derive(Clone, Debug)]
pub struct StepEngine<C = SymbolicCas> {
    config: EngineConfig,
    normalizer: Normalizer,
    cas: C,
}

impl StepEngine<SymbolicCas> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let cas = SymbolicCas::new(config.budget.clone());
        Self::with_provider(config, cas)
    }
}

impl Default for StepEngine<SymbolicCas> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CasProvider> StepEngine<C> {
    pub fn with_provider(config: EngineConfig, cas: C) -> Self {
        let normalizer = Normalizer::new(&config.dependent, &config.independent);
        Self {
            config,
            normalizer,
            cas,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn symbols(&self) -> SymbolTable {
        SymbolTable::standard(&self.config.independent, &self.config.dependent)
    }

    /// Normalizes, parses and classifies `raw`.
    pub fn classify_input(&self, raw: &str) -> Result<(ExpressionPair, Classification)> {
        let canonical = self.normalizer.normalize(raw);
        debug!(raw, canonical = %canonical, "normalized");
        let symbols = self.symbols();
        let pair = parse_equation(&canonical, &symbols, &self.cas)?;
        let classification = classify(&pair, &symbols);
        debug!(order = classification.order, tag = ?classification.tag, "classified");
        Ok((pair, classification))
    }

    /// The type label, or `Unidentified: <reason>` when the input does not parse.
    pub fn identify_type(&self, raw: &str) -> String {
        match self.classify_input(raw) {
            Ok((_, classification)) => classification.label(),
            Err(err) => format!("Unidentified: {err}"),
        }
    }

    /// Never empty; a parse failure gives an input step followed by an error step.
    pub fn solve_steps(&self, raw: &str) -> Vec<Step> {
        self.derive(raw).steps
    }

    pub fn derive(&self, raw: &str) -> Derivation {
        match self.classify_input(raw) {
            Ok((pair, classification)) => self.synthesize_derivation(raw, &pair, classification),
            Err(err) => {
                debug!(%err, "input rejected");
                let mut log = StepLog::new();
                echo_input(&mut log, raw);
                log.push_error(&err);
                Derivation {
                    steps: log.into_steps(),
                    solution: None,
                }
            }
        }
    }

    /// Steps for an already parsed and classified equation. Failures become
    /// warning or error steps after the valid prefix.
    pub fn synthesize(
        &self,
        raw: &str,
        pair: &ExpressionPair,
        classification: Classification,
    ) -> Vec<Step> {
        self.synthesize_derivation(raw, pair, classification).steps
    }

    fn synthesize_derivation(
        &self,
        raw: &str,
        pair: &ExpressionPair,
        classification: Classification,
    ) -> Derivation {
        let symbols = self.symbols();
        let ctx = Narration {
            cas: &self.cas,
            symbols: &symbols,
            pair,
            classification,
        };
        let mut log = StepLog::new();
        echo_input(&mut log, raw);
        let label = classification.label();
        log.push_with_hint(
            StepKind::Identification,
            ctx.render_pair(pair),
            format!("Type identified: {label}."),
            steps::IDENTIFICATION_HINT,
        );

        debug!(branch = ?classification.tag, "synthesizing steps");
        let solution = match classification.tag {
            TypeTag::FirstOrderLinear => steps::linear::narrate(&ctx, &mut log),
            TypeTag::Separable => steps::separable::narrate(&ctx, &mut log),
            TypeTag::Unrecognized | TypeTag::SecondOrder | TypeTag::HigherOrder => {
                steps::fallback::narrate(&ctx, &mut log)
            }
        };
        Derivation {
            steps: log.into_steps(),
            solution,
        }
    }
}

fn echo_input(log: &mut StepLog, raw: &str) {
    log.push(StepKind::Input, raw, "The equation as entered.");
}
