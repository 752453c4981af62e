//! Error types for generation runs

use crate::ir::{CatalogError, OperationName, UnitValidationError};
use thiserror::Error;

/// Result type for generation
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Errors that abort a generation run
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A selected operation has no return type
    #[error("{0} does not have a return type")]
    MissingReturnType(OperationName),

    /// The catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A synthesized unit is inconsistent
    #[error("invalid unit: {0}")]
    InvalidUnit(#[from] UnitValidationError),
}

impl GenerateError {
    /// Qualified name of the declaration that caused the error, if any
    pub fn operation(&self) -> Option<&OperationName> {
        match self {
            GenerateError::MissingReturnType(name) => Some(name),
            _ => None,
        }
    }
}
