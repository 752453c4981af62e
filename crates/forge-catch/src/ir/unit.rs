//! Generated wrapper declarations and output units
//!
//! A [`GeneratedUnit`] is one logical output file: every wrapper generated
//! for one operation name, addressed by a stable relative path.

use crate::ir::{OperationName, ParameterDecl, TypeParameter, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three error-channel shapes a wrapper can adapt to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperKind {
    /// `Raise<Throwable>.() -> R`, evaluated inside a raise context
    Deferred,
    /// `Either<Throwable, R>`, evaluated eagerly
    Result,
    /// `Effect<Throwable, R>`, evaluated lazily and re-runnable
    Suspended,
}

impl WrapperKind {
    /// All kinds in synthesis order
    pub const ALL: [WrapperKind; 3] = [
        WrapperKind::Deferred,
        WrapperKind::Result,
        WrapperKind::Suspended,
    ];

    /// Option key used by build tools
    pub fn option_name(&self) -> &'static str {
        match self {
            WrapperKind::Deferred => "raise",
            WrapperKind::Result => "either",
            WrapperKind::Suspended => "effect",
        }
    }
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// How the wrapper body encloses the guarded call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    /// Return a lambda literal that runs in the caller's raise context
    Lambda,
    /// Return the result of a builder function (e.g., `arrow.core.raise.either`)
    Builder(String),
}

/// A single argument forwarded to the original operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argument {
    /// Parameter name being forwarded
    pub name: String,
    /// Spread a vararg array (`*xs`)
    pub spread: bool,
}

/// Call of the original operation inside the wrapper
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Invocation {
    /// Qualified name of the original operation
    pub callee: OperationName,
    /// Called through the wrapper's receiver
    pub member: bool,
    /// Arguments in declaration order
    pub args: Vec<Argument>,
}

/// Body of a wrapper: guarded call routed into an error channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WrapperBody {
    /// Enclosing combinator
    pub combinator: Combinator,
    /// Guarding function (e.g., `arrow.core.raise.catch`)
    pub catch_fn: String,
    /// Failure type that is intercepted and raised
    pub cause: TypeRef,
    /// The guarded call
    pub invocation: Invocation,
}

/// A synthesized wrapper function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WrapperDecl {
    /// Which error channel this wrapper targets
    pub kind: WrapperKind,
    /// Wrapper function name
    pub name: String,
    /// Extension receiver for member operations
    pub receiver: Option<TypeRef>,
    /// Projected enclosing parameters followed by the operation's own
    pub type_params: Vec<TypeParameter>,
    /// Value parameters, copied from the original
    pub params: Vec<ParameterDecl>,
    /// Kind-specific return shape
    pub return_type: TypeRef,
    /// Body
    pub body: WrapperBody,
}

impl WrapperDecl {
    /// Parameter types and vararg markers, used to tell overloads apart
    pub fn signature(&self) -> (Option<&TypeRef>, &str, Vec<(&TypeRef, bool)>) {
        (
            self.receiver.as_ref(),
            self.name.as_str(),
            self.params.iter().map(|p| (&p.ty, p.vararg)).collect(),
        )
    }
}

/// Errors found when validating a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitValidationError {
    /// Unit file name is empty
    EmptyFileName,
    /// Unit holds no wrappers
    Empty(String),
    /// Two wrappers with the same receiver, name and parameter types
    DuplicateWrapper(String),
}

impl fmt::Display for UnitValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitValidationError::EmptyFileName => write!(f, "unit file name cannot be empty"),
            UnitValidationError::Empty(key) => write!(f, "unit {} has no wrappers", key),
            UnitValidationError::DuplicateWrapper(name) => write!(f, "duplicate wrapper: {}", name),
        }
    }
}

impl std::error::Error for UnitValidationError {}

/// One output file holding every wrapper for one operation name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedUnit {
    /// Target package (original package + sub-namespace)
    pub namespace: String,
    /// File name without extension (e.g., "ClientFetchExtensions")
    pub file_name: String,
    /// Operations this unit wraps
    pub sources: Vec<OperationName>,
    /// Wrappers in emission order
    pub wrappers: Vec<WrapperDecl>,
}

impl GeneratedUnit {
    /// Create an empty unit
    pub fn new(namespace: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            file_name: file_name.into(),
            sources: Vec::new(),
            wrappers: Vec::new(),
        }
    }

    /// Stable identity: relative path of the output file
    pub fn key(&self) -> String {
        if self.namespace.is_empty() {
            format!("{}.kt", self.file_name)
        } else {
            format!("{}/{}.kt", self.namespace.replace('.', "/"), self.file_name)
        }
    }

    /// Add the wrappers generated for one source operation
    pub fn extend(&mut self, source: OperationName, wrappers: Vec<WrapperDecl>) {
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
        self.wrappers.extend(wrappers);
    }

    /// Wrapper names in emission order
    pub fn wrapper_names(&self) -> Vec<&str> {
        self.wrappers.iter().map(|w| w.name.as_str()).collect()
    }

    /// Validate the unit before emission
    pub fn validate(&self) -> Result<(), UnitValidationError> {
        if self.file_name.is_empty() {
            return Err(UnitValidationError::EmptyFileName);
        }

        if self.wrappers.is_empty() {
            return Err(UnitValidationError::Empty(self.key()));
        }

        let mut seen = std::collections::HashSet::new();
        for w in &self.wrappers {
            if !seen.insert(w.signature()) {
                return Err(UnitValidationError::DuplicateWrapper(w.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper(name: &str, params: Vec<ParameterDecl>) -> WrapperDecl {
        WrapperDecl {
            kind: WrapperKind::Result,
            name: name.to_string(),
            receiver: None,
            type_params: Vec::new(),
            params,
            return_type: TypeRef::int(),
            body: WrapperBody {
                combinator: Combinator::Builder("arrow.core.raise.either".to_string()),
                catch_fn: "arrow.core.raise.catch".to_string(),
                cause: TypeRef::throwable(),
                invocation: Invocation {
                    callee: OperationName::new("pkg.f"),
                    member: false,
                    args: Vec::new(),
                },
            },
        }
    }

    #[test]
    fn test_unit_key() {
        let unit = GeneratedUnit::new("io.example.arrow", "ClientFetchExtensions");
        assert_eq!(unit.key(), "io/example/arrow/ClientFetchExtensions.kt");

        let root = GeneratedUnit::new("", "FExtensions");
        assert_eq!(root.key(), "FExtensions.kt");
    }

    #[test]
    fn test_kind_order() {
        let mut kinds = vec![WrapperKind::Suspended, WrapperKind::Deferred, WrapperKind::Result];
        kinds.sort();
        assert_eq!(kinds, WrapperKind::ALL.to_vec());
        assert_eq!(WrapperKind::Result.to_string(), "either");
    }

    #[test]
    fn test_validate_overloads() {
        let mut unit = GeneratedUnit::new("pkg.arrow", "FExtensions");
        assert!(matches!(unit.validate(), Err(UnitValidationError::Empty(_))));

        unit.extend(OperationName::new("pkg.f"), vec![wrapper("fEither", vec![])]);
        unit.extend(
            OperationName::new("pkg.f"),
            vec![wrapper("fEither", vec![ParameterDecl::new("x", TypeRef::int())])],
        );
        assert!(unit.validate().is_ok());
        assert_eq!(unit.sources.len(), 1);

        unit.extend(OperationName::new("pkg.f"), vec![wrapper("fEither", vec![])]);
        assert_eq!(
            unit.validate(),
            Err(UnitValidationError::DuplicateWrapper("fEither".to_string()))
        );
    }

    #[test]
    fn test_vararg_overload_is_distinct() {
        let mut unit = GeneratedUnit::new("pkg.arrow", "FExtensions");
        unit.extend(
            OperationName::new("pkg.f"),
            vec![
                wrapper("fEither", vec![ParameterDecl::new("x", TypeRef::int())]),
                wrapper("fEither", vec![ParameterDecl::new("x", TypeRef::int()).vararg()]),
            ],
        );
        assert!(unit.validate().is_ok());
    }
}
