//! Operation selection
//!
//! Turns include/exclude pattern lists into concrete declarations from
//! the catalog.

pub mod pattern;
pub mod resolver;

pub use pattern::{matches, Pattern, PatternSet};
pub use resolver::{resolve, Expansion, Resolution, Resolved, Selector};
