//! Code generation for Forge-Catch
//!
//! This module provides:
//! - Type-parameter projection for member receivers
//! - Wrapper synthesis (Deferred, Result, Suspended)
//! - Kotlin source rendering for generated units

pub mod projection;
pub mod wrapper;
pub mod kotlin;

pub use projection::{project, project_in, Projection};
pub use wrapper::{NamingConfig, Synthesizer};
pub use kotlin::KotlinRenderer;
