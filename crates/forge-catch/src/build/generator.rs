//! Generator orchestration
//!
//! A run moves through `Idle -> Resolving -> Synthesizing -> Emitting ->
//! Done`. Every unit is synthesized before the first one is written, so a
//! malformed declaration aborts the run with nothing emitted. Write failures
//! are reported per unit and do not stop the remaining units.

use crate::build::{EmissionLedger, EmitError, GeneratorConfig, UnitSink};
use crate::codegen::{KotlinRenderer, Synthesizer};
use crate::error::{GenerateError, GenerateResult};
use crate::ir::{GeneratedUnit, OperationName, SymbolCatalog};
use crate::select::{Resolution, Selector};
use indexmap::IndexMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Resolving,
    Synthesizing,
    Emitting,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunState::Idle => "idle",
            RunState::Resolving => "resolving",
            RunState::Synthesizing => "synthesizing",
            RunState::Emitting => "emitting",
            RunState::Done => "done",
        };
        f.write_str(s)
    }
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No wrapper kind was requested
    NoOp,
    /// Selection was resolved and every unit was handled
    Completed,
}

/// A unit the sink refused
#[derive(Debug)]
pub struct EmitFailure {
    pub key: String,
    pub error: EmitError,
}

/// Summary of one round
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Keys written in this round, in order
    pub emitted: Vec<String>,
    /// Keys already written by an earlier round
    pub skipped: Vec<String>,
    pub failed: Vec<EmitFailure>,
    /// Selected names that resolved to nothing
    pub misses: Vec<OperationName>,
    /// Selected names dropped by an exclude pattern
    pub excluded: Vec<OperationName>,
}

impl RunReport {
    fn new(outcome: RunOutcome) -> Self {
        Self {
            outcome,
            emitted: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            misses: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Check if every unit was written or skipped
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Wrapper generator for one configuration
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    selector: Selector,
    synthesizer: Synthesizer,
}

impl Generator {
    /// Create a generator
    pub fn new(config: GeneratorConfig) -> Self {
        let selector = Selector::new(config.include.iter().cloned(), config.exclude.iter().cloned());
        let synthesizer = Synthesizer::new(config.naming.clone());
        Self {
            config,
            selector,
            synthesizer,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Start a multi-round run sharing one emission ledger
    pub fn start(&self) -> Run<'_> {
        Run {
            generator: self,
            ledger: EmissionLedger::new(),
            state: RunState::Idle,
        }
    }

    /// Generate every selected wrapper into `sink` in a single round
    pub fn run<C, S>(&self, catalog: &C, sink: &mut S) -> GenerateResult<RunReport>
    where
        C: SymbolCatalog + ?Sized,
        S: UnitSink + ?Sized,
    {
        self.start().process_round(catalog, sink)
    }

    /// Group resolved operations into validated units, in first-seen order
    pub fn synthesize_units(&self, resolution: &Resolution<'_>) -> GenerateResult<Vec<GeneratedUnit>> {
        let kinds = self.config.kinds();
        let mut units: IndexMap<String, GeneratedUnit> = IndexMap::new();

        for resolved in &resolution.resolved {
            let op = resolved.operation;
            let wrappers = self
                .synthesizer
                .synthesize_all(&kinds, resolved.enclosing, op)?;

            let unit = self.synthesizer.unit_for(resolved.enclosing, op);
            units
                .entry(unit.key())
                .or_insert(unit)
                .extend(op.qualified_name.clone(), wrappers);
        }

        let units: Vec<GeneratedUnit> = units.into_values().collect();
        for unit in &units {
            unit.validate().map_err(GenerateError::InvalidUnit)?;
        }
        Ok(units)
    }
}

/// A run over one or more rounds
///
/// Units already written by an earlier round are skipped, so a selection
/// re-processed in a later round is never emitted twice.
#[derive(Debug)]
pub struct Run<'g> {
    generator: &'g Generator,
    ledger: EmissionLedger,
    state: RunState,
}

impl<'g> Run<'g> {
    /// Current phase
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Units written so far
    pub fn ledger(&self) -> &EmissionLedger {
        &self.ledger
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = %self.state, to = %next, "catch.run state");
        self.state = next;
    }

    /// Resolve, synthesize, and emit one round
    pub fn process_round<C, S>(&mut self, catalog: &C, sink: &mut S) -> GenerateResult<RunReport>
    where
        C: SymbolCatalog + ?Sized,
        S: UnitSink + ?Sized,
    {
        self.state = RunState::Idle;
        let generator = self.generator;
        let kinds = generator.config.kinds();

        if kinds.is_empty() {
            warn!("catch.run no wrapper kind requested (raise, either, effect). No code will be generated.");
            self.transition(RunState::Done);
            return Ok(RunReport::new(RunOutcome::NoOp));
        }

        self.transition(RunState::Resolving);
        let resolution = generator.selector.select(catalog);
        for name in &resolution.misses {
            debug!(name = %name, "catch.run unresolved name");
        }

        self.transition(RunState::Synthesizing);
        let units = match generator.synthesize_units(&resolution) {
            Ok(units) => units,
            Err(e) => {
                warn!(error = %e, "catch.run aborted");
                self.transition(RunState::Done);
                return Err(e);
            }
        };

        self.transition(RunState::Emitting);
        let mut report = RunReport::new(RunOutcome::Completed);
        report.misses = resolution.misses;
        report.excluded = resolution.excluded;

        for unit in &units {
            let key = unit.key();
            if !self.ledger.should_emit(&key) {
                debug!(key = %key, "catch.emit skip");
                report.skipped.push(key);
                continue;
            }

            let source = KotlinRenderer::new(unit).render();
            match sink.write_unit(&key, &source) {
                Ok(()) => {
                    info!(key = %key, wrappers = unit.wrappers.len(), "catch.emit");
                    self.ledger.record_emitted(&key);
                    report.emitted.push(key);
                }
                Err(error) => {
                    warn!(key = %key, error = %error, "catch.emit failed");
                    report.failed.push(EmitFailure { key, error });
                }
            }
        }

        self.transition(RunState::Done);
        info!(
            emitted = report.emitted.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            misses = report.misses.len(),
            "catch.run done"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::MemorySink;
    use crate::ir::{Catalog, OperationDecl, ParameterDecl, TypeRef};

    fn catalog() -> Catalog {
        Catalog::new(
            vec![],
            vec![
                OperationDecl::function("pkg.f")
                    .param(ParameterDecl::new("x", TypeRef::int()))
                    .returns(TypeRef::int()),
                OperationDecl::function("pkg.f")
                    .param(ParameterDecl::new("s", TypeRef::string()))
                    .returns(TypeRef::int()),
                OperationDecl::function("pkg.broken"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_no_kinds_is_noop() {
        let mut sink = MemorySink::new();
        let report = Generator::new(GeneratorConfig::new().include("pkg.f"))
            .run(&catalog(), &mut sink)
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::NoOp);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_overloads_share_a_unit() {
        let mut sink = MemorySink::new();
        let report = Generator::new(GeneratorConfig::new().include("pkg.f").either())
            .run(&catalog(), &mut sink)
            .unwrap();

        assert_eq!(report.emitted, vec!["pkg/arrow/FExtensions.kt"]);
        let source = sink.get("pkg/arrow/FExtensions.kt").unwrap();
        assert!(source.contains("public fun fEither(x: Int): Either<Throwable, Int> {"));
        assert!(source.contains("public fun fEither(s: String): Either<Throwable, Int> {"));
    }

    #[test]
    fn test_vararg_overload_shares_unit() {
        let catalog = Catalog::new(
            vec![],
            vec![
                OperationDecl::function("pkg.f")
                    .param(ParameterDecl::new("x", TypeRef::int()))
                    .returns(TypeRef::int()),
                OperationDecl::function("pkg.f")
                    .param(ParameterDecl::new("x", TypeRef::int()).vararg())
                    .returns(TypeRef::int()),
            ],
        )
        .unwrap();

        let mut sink = MemorySink::new();
        let report = Generator::new(GeneratorConfig::new().include("pkg.f").either())
            .run(&catalog, &mut sink)
            .unwrap();

        assert_eq!(report.emitted, vec!["pkg/arrow/FExtensions.kt"]);
        let source = sink.get("pkg/arrow/FExtensions.kt").unwrap();
        assert!(source.contains("public fun fEither(x: Int): Either<Throwable, Int> {"));
        assert!(source.contains("public fun fEither(vararg x: Int): Either<Throwable, Int> {"));
        assert!(source.contains("block = { f(*x) },"));
    }

    #[test]
    fn test_missing_return_type_aborts_before_emission() {
        let mut sink = MemorySink::new();
        let generator = Generator::new(GeneratorConfig::new().include("pkg.f").include("pkg.broken").raise());
        let mut run = generator.start();

        let err = run.process_round(&catalog(), &mut sink).unwrap_err();
        assert!(matches!(err, GenerateError::MissingReturnType(name) if name.as_str() == "pkg.broken"));
        assert!(sink.is_empty());
        assert_eq!(run.state(), RunState::Done);
    }

    #[test]
    fn test_rounds_share_ledger() {
        let catalog = catalog();
        let generator = Generator::new(GeneratorConfig::new().include("pkg.f").effect());
        let mut run = generator.start();
        let mut sink = MemorySink::new();

        let first = run.process_round(&catalog, &mut sink).unwrap();
        let second = run.process_round(&catalog, &mut sink).unwrap();

        assert_eq!(first.emitted.len(), 1);
        assert!(second.emitted.is_empty());
        assert_eq!(second.skipped, vec!["pkg/arrow/FExtensions.kt"]);
        assert!(second.is_success());
        assert_eq!(run.ledger().len(), 1);
    }
}
