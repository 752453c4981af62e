//! Generation pipeline for Forge-Catch
//!
//! This module provides:
//! - Generator configuration (TOML file or build-tool options)
//! - The per-run emission ledger
//! - Output sinks (in-memory and directory)
//! - The generator and its multi-round runs

pub mod config;
pub mod ledger;
pub mod sink;
pub mod generator;

pub use config::{ConfigError, GeneratorConfig, OPTION_PREFIX};
pub use ledger::EmissionLedger;
pub use sink::{DirSink, EmitError, MemorySink, UnitSink};
pub use generator::{EmitFailure, Generator, Run, RunOutcome, RunReport, RunState};
