//! Declaration metadata for operations and their enclosing types
//!
//! These structures are the read-only view of the host program that an
//! external front-end extracts. Builders mirror the catalog documents
//! so tests can assemble declarations inline.

use crate::ir::{TypeParameter, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dotted operation path (`a.b.C.method` or `a.b.function`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationName(String);

impl OperationName {
    /// Create a new operation name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The full dotted path
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split on the last `.` into (parent path, final segment)
    pub fn split_last(&self) -> Option<(&str, &str)> {
        self.0.rsplit_once('.')
    }

    /// Final segment of the path
    pub fn simple_name(&self) -> &str {
        self.split_last().map_or(self.0.as_str(), |(_, last)| last)
    }

    /// Everything before the final segment (empty for a single segment)
    pub fn parent(&self) -> &str {
        self.split_last().map_or("", |(parent, _)| parent)
    }

    /// Append a segment
    pub fn child(&self, segment: &str) -> Self {
        if self.0.is_empty() {
            Self::new(segment)
        } else {
            Self(format!("{}.{}", self.0, segment))
        }
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for OperationName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for OperationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A value parameter of an operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterDecl {
    /// Parameter name
    pub name: String,
    /// Declared type (element type for varargs)
    pub ty: TypeRef,
    /// Declared with the `vararg` modifier
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub vararg: bool,
}

impl ParameterDecl {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            vararg: false,
        }
    }

    /// Mark as vararg
    pub fn vararg(mut self) -> Self {
        self.vararg = true;
        self
    }
}

/// A function or method declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDecl {
    /// Fully qualified name; for members this is `<type>.<member>`
    pub qualified_name: OperationName,
    /// Package the declaration lives in
    pub package: String,
    /// Operation's own type parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParameter>,
    /// Value parameters in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParameterDecl>,
    /// Return type; a missing return type is rejected during synthesis
    #[serde(default)]
    pub return_type: Option<TypeRef>,
}

impl OperationDecl {
    /// Create a new operation with no parameters and no return type
    pub fn new(qualified_name: impl Into<OperationName>, package: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            package: package.into(),
            type_params: Vec::new(),
            params: Vec::new(),
            return_type: None,
        }
    }

    /// Create a top-level function, deriving the package from the name
    pub fn function(qualified_name: impl Into<OperationName>) -> Self {
        let qualified_name = qualified_name.into();
        let package = qualified_name.parent().to_string();
        Self::new(qualified_name, package)
    }

    /// Add a type parameter
    pub fn type_param(mut self, param: TypeParameter) -> Self {
        self.type_params.push(param);
        self
    }

    /// Add a value parameter
    pub fn param(mut self, param: ParameterDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Set the return type
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.return_type = Some(ty);
        self
    }

    /// Simple (unqualified) name
    pub fn simple_name(&self) -> &str {
        self.qualified_name.simple_name()
    }
}

/// A type declaration that owns member operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Fully qualified name (e.g., "io.example.Client")
    pub qualified_name: String,
    /// Package the type lives in
    pub package: String,
    /// Type parameters in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParameter>,
    /// Member operations in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<OperationDecl>,
}

impl TypeDecl {
    /// Create a new type declaration
    pub fn new(qualified_name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            package: package.into(),
            type_params: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Add a type parameter
    pub fn type_param(mut self, param: TypeParameter) -> Self {
        self.type_params.push(param);
        self
    }

    /// Add a member operation
    pub fn operation(mut self, op: OperationDecl) -> Self {
        self.operations.push(op);
        self
    }

    /// Start a member operation named `<type>.<name>` in this type's package
    pub fn member(&self, name: &str) -> OperationDecl {
        OperationDecl::new(
            format!("{}.{}", self.qualified_name, name),
            self.package.clone(),
        )
    }

    /// Simple name of the type, relative to its package
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .strip_prefix(&self.package)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.qualified_name)
    }

    /// First member whose simple name matches
    pub fn find_operation(&self, simple_name: &str) -> Option<&OperationDecl> {
        self.operations
            .iter()
            .find(|op| op.simple_name() == simple_name)
    }

    /// The type with every type argument star-projected (`C<*, *>`)
    pub fn star_projected(&self) -> TypeRef {
        TypeRef::generic(
            &self.qualified_name,
            self.type_params.iter().map(|_| TypeRef::Star).collect(),
        )
    }
}

// Helper functions

/// Upper-case the first character if it is lower case
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) if first.is_lowercase() => first.to_uppercase().chain(chars).collect(),
        Some(first) => std::iter::once(first).chain(chars).collect(),
    }
}
