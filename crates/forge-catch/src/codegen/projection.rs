//! Type-parameter projection for member receivers
//!
//! A wrapper for a member operation is an extension on the enclosing type.
//! Only the enclosing type parameters that the operation's value parameters
//! actually mention become type parameters of the wrapper; every other
//! position of the receiver is star-projected.
//!
//! ```text
//! class Cache<K, V> { fun evict(key: K): Boolean }
//!
//! fun <K> Cache<K, *>.evictOrRaise(key: K): Raise<Throwable>.() -> Boolean
//! ```

use crate::ir::{OperationDecl, ParameterDecl, TypeDecl, TypeParameter, TypeRef, TypeScope};

/// Enclosing parameters referenced by `params`, in declaration order
pub fn project<'a>(enclosing: &'a [TypeParameter], params: &[ParameterDecl]) -> Vec<&'a TypeParameter> {
    project_in(TypeScope::new(enclosing, &[]), params)
}

/// Like [`project`], but a variable only counts when it resolves to the
/// enclosing declaration in `scope`
pub fn project_in<'a>(scope: TypeScope<'a>, params: &[ParameterDecl]) -> Vec<&'a TypeParameter> {
    scope
        .enclosing()
        .iter()
        .filter(|tp| scope.is_enclosing(&tp.name))
        .filter(|tp| params.iter().any(|p| p.ty.contains_variable(&tp.name)))
        .collect()
}

/// Receiver shape for one member operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// Receiver type for the wrapper
    pub receiver: TypeRef,
    /// Projected enclosing parameters, bounds included
    pub type_params: Vec<TypeParameter>,
    /// Enclosing parameters the signature still mentions outside the
    /// value parameters (return type, operation bounds, projected bounds)
    pub unbound: Vec<String>,
}

impl Projection {
    /// Project the enclosing type's parameters for a member operation
    pub fn for_member(enclosing: &TypeDecl, op: &OperationDecl) -> Self {
        let scope = TypeScope::new(&enclosing.type_params, &op.type_params);
        let projected = project_in(scope, &op.params);

        let receiver = if projected.is_empty() {
            enclosing.star_projected()
        } else {
            TypeRef::generic(
                &enclosing.qualified_name,
                enclosing
                    .type_params
                    .iter()
                    .map(|tp| {
                        if projected.iter().any(|p| p.name == tp.name) {
                            tp.as_variable()
                        } else {
                            TypeRef::Star
                        }
                    })
                    .collect(),
            )
        };

        let mentioned = op
            .return_type
            .iter()
            .chain(op.type_params.iter().flat_map(|tp| tp.bounds.iter()))
            .chain(projected.iter().flat_map(|tp| tp.bounds.iter()));
        let mut unbound: Vec<String> = Vec::new();
        for ty in mentioned {
            for var in ty.variables() {
                let is_projected = projected.iter().any(|p| p.name == var);
                if scope.is_enclosing(var) && !is_projected && !unbound.iter().any(|u| u == var) {
                    unbound.push(var.to_string());
                }
            }
        }

        Self {
            receiver,
            type_params: projected.into_iter().cloned().collect(),
            unbound,
        }
    }

    /// Names of the projected parameters
    pub fn names(&self) -> Vec<&str> {
        self.type_params.iter().map(|tp| tp.name.as_str()).collect()
    }
}
