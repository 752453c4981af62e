//! Intermediate Representation (IR) for Forge-Catch
//!
//! This module provides the declaration model extracted from the host
//! program, the indexed catalog over it, and the generated wrapper units.

pub mod types;
pub mod symbol;
pub mod catalog;
pub mod unit;

pub use types::*;
pub use symbol::*;
pub use catalog::*;
pub use unit::*;
