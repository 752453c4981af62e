//! Type references for Forge-Catch
//!
//! Type references are trees: a named class with ordered type arguments,
//! a type variable, a star projection, a nullable marker or a function type.
//! Equality is structural, which is what the type-parameter projection and
//! the tests rely on.
//!
//! # Serialized form
//!
//! Catalog documents use serde's external tagging:
//!
//! ```json
//! { "named": { "name": "kotlin.collections.List", "args": [{ "variable": "T" }] } }
//! { "nullable": { "variable": "T" } }
//! "star"
//! ```
//!
//! Type variables are stored by name only. Which declaration a variable
//! refers to is decided by [`TypeScope`], where an operation's own type
//! parameters shadow those of the enclosing type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference to a type as it appears in a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// Class reference by qualified name: `kotlin.Int`, `pkg.Box<T>`
    Named {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
    },

    /// Reference to a type parameter
    Variable(String),

    /// Star projection `*`
    Star,

    /// Nullable type `T?`
    Nullable(Box<TypeRef>),

    /// Function type `R.(A, B) -> C`
    Function {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver: Option<Box<TypeRef>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        params: Vec<TypeRef>,
        ret: Box<TypeRef>,
    },
}

impl TypeRef {
    /// Create a simple (unparameterized) class reference
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a parameterized class reference
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    /// Create a type variable reference
    pub fn var(name: impl Into<String>) -> Self {
        TypeRef::Variable(name.into())
    }

    /// Wrap in a nullable marker (idempotent)
    pub fn nullable(self) -> Self {
        match self {
            TypeRef::Nullable(_) => self,
            other => TypeRef::Nullable(Box::new(other)),
        }
    }

    /// Create a function type
    pub fn function(receiver: Option<TypeRef>, params: Vec<TypeRef>, ret: TypeRef) -> Self {
        TypeRef::Function {
            receiver: receiver.map(Box::new),
            params,
            ret: Box::new(ret),
        }
    }

    /// `kotlin.Int`
    pub fn int() -> Self {
        TypeRef::named("kotlin.Int")
    }

    /// `kotlin.String`
    pub fn string() -> Self {
        TypeRef::named("kotlin.String")
    }

    /// `kotlin.Unit`
    pub fn unit() -> Self {
        TypeRef::named("kotlin.Unit")
    }

    /// `kotlin.Throwable`
    pub fn throwable() -> Self {
        TypeRef::named("kotlin.Throwable")
    }

    /// Check whether this reference mentions the type variable `name`
    /// anywhere in its tree.
    pub fn contains_variable(&self, name: &str) -> bool {
        match self {
            TypeRef::Variable(v) => v == name,
            TypeRef::Named { args, .. } => args.iter().any(|a| a.contains_variable(name)),
            TypeRef::Star => false,
            TypeRef::Nullable(inner) => inner.contains_variable(name),
            TypeRef::Function {
                receiver,
                params,
                ret,
            } => {
                receiver
                    .as_deref()
                    .is_some_and(|r| r.contains_variable(name))
                    || params.iter().any(|p| p.contains_variable(name))
                    || ret.contains_variable(name)
            }
        }
    }

    /// Collect every type variable name in the tree, in first-seen order
    pub fn variables(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeRef::Variable(v) => {
                if !out.contains(&v.as_str()) {
                    out.push(v);
                }
            }
            TypeRef::Named { args, .. } => args.iter().for_each(|a| a.collect_variables(out)),
            TypeRef::Star => {}
            TypeRef::Nullable(inner) => inner.collect_variables(out),
            TypeRef::Function {
                receiver,
                params,
                ret,
            } => {
                if let Some(r) = receiver {
                    r.collect_variables(out);
                }
                params.iter().for_each(|p| p.collect_variables(out));
                ret.collect_variables(out);
            }
        }
    }

    /// Collect every qualified class name in the tree
    pub fn class_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_class_names(&mut out);
        out
    }

    fn collect_class_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeRef::Named { name, args } => {
                out.push(name);
                args.iter().for_each(|a| a.collect_class_names(out));
            }
            TypeRef::Variable(_) | TypeRef::Star => {}
            TypeRef::Nullable(inner) => inner.collect_class_names(out),
            TypeRef::Function {
                receiver,
                params,
                ret,
            } => {
                if let Some(r) = receiver {
                    r.collect_class_names(out);
                }
                params.iter().for_each(|p| p.collect_class_names(out));
                ret.collect_class_names(out);
            }
        }
    }

    /// Check if this is a function type (needs parentheses when nullable)
    pub fn is_function(&self) -> bool {
        matches!(self, TypeRef::Function { .. })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Variable(name) => write!(f, "{}", name),
            TypeRef::Star => write!(f, "*"),
            TypeRef::Nullable(inner) if inner.is_function() => write!(f, "({})?", inner),
            TypeRef::Nullable(inner) => write!(f, "{}?", inner),
            TypeRef::Function {
                receiver,
                params,
                ret,
            } => {
                if let Some(r) = receiver {
                    write!(f, "{}.", r)?;
                }
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
        }
    }
}

/// A declared type parameter with its upper bounds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeParameter {
    /// Parameter name (e.g., "T")
    pub name: String,
    /// Upper bounds in declaration order; empty means the implicit `Any?`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<TypeRef>,
}

impl TypeParameter {
    /// Create an unbounded type parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
        }
    }

    /// Add an upper bound
    pub fn bound(mut self, bound: TypeRef) -> Self {
        self.bounds.push(bound);
        self
    }

    /// Reference to this parameter as a type variable
    pub fn as_variable(&self) -> TypeRef {
        TypeRef::var(&self.name)
    }
}

/// Which declaration a type variable name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOwner {
    /// Declared by the operation itself
    Operation,
    /// Declared by the enclosing type
    Enclosing,
}

/// Nested type-parameter scopes: operation parameters shadow enclosing ones
#[derive(Debug, Clone, Copy)]
pub struct TypeScope<'a> {
    enclosing: &'a [TypeParameter],
    operation: &'a [TypeParameter],
}

impl<'a> TypeScope<'a> {
    /// Create a scope for an operation, optionally nested in a type
    pub fn new(enclosing: &'a [TypeParameter], operation: &'a [TypeParameter]) -> Self {
        Self {
            enclosing,
            operation,
        }
    }

    /// Resolve a type variable name to its declaration
    pub fn resolve(&self, name: &str) -> Option<(ScopeOwner, &'a TypeParameter)> {
        if let Some(p) = self.operation.iter().find(|p| p.name == name) {
            return Some((ScopeOwner::Operation, p));
        }
        self.enclosing
            .iter()
            .find(|p| p.name == name)
            .map(|p| (ScopeOwner::Enclosing, p))
    }

    /// Check whether `name` resolves to the enclosing type's parameter
    pub fn is_enclosing(&self, name: &str) -> bool {
        matches!(self.resolve(name), Some((ScopeOwner::Enclosing, _)))
    }

    /// The enclosing type's parameters, shadowed or not
    pub fn enclosing(&self) -> &'a [TypeParameter] {
        self.enclosing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let list = TypeRef::generic("kotlin.collections.List", vec![TypeRef::var("T").nullable()]);
        assert_eq!(list.to_string(), "kotlin.collections.List<T?>");

        let lambda = TypeRef::function(
            Some(TypeRef::generic("arrow.core.raise.Raise", vec![TypeRef::throwable()])),
            vec![],
            TypeRef::int(),
        );
        assert_eq!(
            lambda.to_string(),
            "arrow.core.raise.Raise<kotlin.Throwable>.() -> kotlin.Int"
        );

        let nullable_fn = TypeRef::function(None, vec![TypeRef::string()], TypeRef::unit()).nullable();
        assert_eq!(nullable_fn.to_string(), "((kotlin.String) -> kotlin.Unit)?");
    }

    #[test]
    fn test_contains_variable_nested() {
        let nested = TypeRef::generic(
            "kotlin.collections.Map",
            vec![
                TypeRef::string(),
                TypeRef::generic("kotlin.collections.List", vec![TypeRef::var("T")]),
            ],
        );
        assert!(nested.contains_variable("T"));
        assert!(!nested.contains_variable("U"));

        let callback = TypeRef::function(None, vec![TypeRef::var("U")], TypeRef::unit());
        assert!(callback.contains_variable("U"));
        assert!(!TypeRef::Star.contains_variable("T"));
    }

    #[test]
    fn test_nullable_idempotent() {
        let t = TypeRef::var("T").nullable().nullable();
        assert_eq!(t, TypeRef::Nullable(Box::new(TypeRef::var("T"))));
    }

    #[test]
    fn test_variables_first_seen_order() {
        let t = TypeRef::generic(
            "pkg.Pair",
            vec![TypeRef::var("B"), TypeRef::var("A"), TypeRef::var("B")],
        );
        assert_eq!(t.variables(), vec!["B", "A"]);
    }

    #[test]
    fn test_scope_shadowing() {
        let enclosing = vec![TypeParameter::new("T"), TypeParameter::new("U")];
        let own = vec![TypeParameter::new("T").bound(TypeRef::named("kotlin.Number"))];
        let scope = TypeScope::new(&enclosing, &own);

        assert!(!scope.is_enclosing("T"));
        assert!(scope.is_enclosing("U"));
        assert!(scope.resolve("V").is_none());
        let (owner, param) = scope.resolve("T").unwrap();
        assert_eq!(owner, ScopeOwner::Operation);
        assert_eq!(param.bounds.len(), 1);
    }

    #[test]
    fn test_serde_external_tagging() {
        let json = r#"{"named":{"name":"pkg.Box","args":[{"variable":"T"},"star"]}}"#;
        let parsed: TypeRef = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed,
            TypeRef::generic("pkg.Box", vec![TypeRef::var("T"), TypeRef::Star])
        );

        let simple: TypeRef = serde_json::from_str(r#"{"named":{"name":"kotlin.Int"}}"#).unwrap();
        assert_eq!(simple, TypeRef::int());
    }
}
