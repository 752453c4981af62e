//! Forge-Catch: Arrow wrapper generation for throwing Kotlin operations
//!
//! Given a symbol catalog extracted from a Kotlin program, this crate
//! generates extension functions that adapt exception-based operations to
//! Arrow's typed error channels:
//!
//! - `fooOrRaise(...)`: `Raise<Throwable>.() -> R`
//! - `fooEither(...)`: `Either<Throwable, R>`
//! - `fooEffect(...)`: `Effect<Throwable, R>`
//!
//! # Architecture
//!
//! - `ir`: Types, declarations, the indexed catalog and generated units
//! - `select`: Name patterns and symbol resolution
//! - `codegen`: Type-parameter projection, wrapper synthesis, Kotlin rendering
//! - `build`: Configuration, emission ledger, sinks and the generator itself
//!
//! # Usage
//!
//! ```rust,ignore
//! use forge_catch::{Catalog, DirSink, Generator, GeneratorConfig};
//!
//! let catalog = Catalog::from_path("build/catalog.json")?;
//! let config = GeneratorConfig::new()
//!     .include("io.example.Client.fetch")
//!     .raise()
//!     .either();
//!
//! let mut sink = DirSink::new("build/generated/kotlin");
//! let report = Generator::new(config).run(&catalog, &mut sink)?;
//! println!("wrote {} units", report.emitted.len());
//! ```

pub mod error;
pub mod ir;
pub mod select;
pub mod codegen;
pub mod build;

// Re-export commonly used types
pub use ir::{
    Catalog, CatalogError, GeneratedUnit, OperationDecl, OperationName, ParameterDecl,
    SymbolCatalog, TypeDecl, TypeParameter, TypeRef, WrapperBody, WrapperDecl, WrapperKind,
};
pub use select::{matches, Pattern, Resolved, Resolution, Selector};
pub use codegen::{project, KotlinRenderer, NamingConfig, Projection, Synthesizer};
pub use build::{
    ConfigError, DirSink, EmissionLedger, EmitError, EmitFailure, Generator, GeneratorConfig,
    MemorySink, Run, RunOutcome, RunReport, RunState, UnitSink,
};
pub use error::{GenerateError, GenerateResult};
