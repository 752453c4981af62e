//! Wrapper synthesis
//!
//! Every wrapper has the same body: call the original operation inside
//! `catch`, raising any `Throwable` into the target channel. The kinds
//! differ only in the return shape and the combinator around that body:
//!
//! | Kind | Return type | Combinator |
//! |------|-------------|------------|
//! | Deferred | `Raise<Throwable>.() -> R` | lambda literal |
//! | Result | `Either<Throwable, R>` | `either { }` |
//! | Suspended | `Effect<Throwable, R>` | `effect { }` |

use crate::codegen::Projection;
use crate::error::{GenerateError, GenerateResult};
use crate::ir::{
    capitalize_first, Argument, Combinator, GeneratedUnit, Invocation, OperationDecl, TypeDecl,
    TypeRef, WrapperBody, WrapperDecl, WrapperKind,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Arrow's raise context
pub const RAISE: &str = "arrow.core.raise.Raise";
/// Arrow's eager outcome type
pub const EITHER: &str = "arrow.core.Either";
/// Arrow's lazy outcome type
pub const EFFECT: &str = "arrow.core.raise.Effect";
/// Arrow's exception guard
pub const CATCH: &str = "arrow.core.raise.catch";
/// Builder for [`EITHER`]
pub const EITHER_BUILDER: &str = "arrow.core.raise.either";
/// Builder for [`EFFECT`]
pub const EFFECT_BUILDER: &str = "arrow.core.raise.effect";

/// Naming of generated wrappers and units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Suffix for Deferred wrappers
    pub raise_suffix: String,
    /// Suffix for Result wrappers
    pub either_suffix: String,
    /// Suffix for Suspended wrappers
    pub effect_suffix: String,
    /// Sub-namespace appended to the original package
    pub namespace: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            raise_suffix: "OrRaise".to_string(),
            either_suffix: "Either".to_string(),
            effect_suffix: "Effect".to_string(),
            namespace: "arrow".to_string(),
        }
    }
}

impl NamingConfig {
    /// Suffix for a wrapper kind
    pub fn suffix(&self, kind: WrapperKind) -> &str {
        match kind {
            WrapperKind::Deferred => &self.raise_suffix,
            WrapperKind::Result => &self.either_suffix,
            WrapperKind::Suspended => &self.effect_suffix,
        }
    }

    /// Target package for wrappers of an operation in `package`
    pub fn target_namespace(&self, package: &str) -> String {
        match (package.is_empty(), self.namespace.is_empty()) {
            (true, _) => self.namespace.clone(),
            (false, true) => package.to_string(),
            (false, false) => format!("{}.{}", package, self.namespace),
        }
    }

    /// File name for the unit wrapping `op`
    pub fn file_name(&self, enclosing: Option<&TypeDecl>, op: &OperationDecl) -> String {
        let owner = enclosing
            .map(|ty| ty.simple_name().replace('.', ""))
            .unwrap_or_default();
        format!("{}{}Extensions", owner, capitalize_first(op.simple_name()))
    }
}

/// Per-kind return shape and combinator
struct KindShape {
    channel: fn(cause: TypeRef, value: TypeRef) -> TypeRef,
    combinator: fn() -> Combinator,
}

impl KindShape {
    fn of(kind: WrapperKind) -> Self {
        match kind {
            WrapperKind::Deferred => KindShape {
                channel: |cause, value| {
                    TypeRef::function(Some(TypeRef::generic(RAISE, vec![cause])), vec![], value)
                },
                combinator: || Combinator::Lambda,
            },
            WrapperKind::Result => KindShape {
                channel: |cause, value| TypeRef::generic(EITHER, vec![cause, value]),
                combinator: || Combinator::Builder(EITHER_BUILDER.to_string()),
            },
            WrapperKind::Suspended => KindShape {
                channel: |cause, value| TypeRef::generic(EFFECT, vec![cause, value]),
                combinator: || Combinator::Builder(EFFECT_BUILDER.to_string()),
            },
        }
    }
}

/// Builds wrapper declarations and units
#[derive(Debug, Clone)]
pub struct Synthesizer {
    naming: NamingConfig,
    cause: TypeRef,
}

impl Synthesizer {
    /// Create a synthesizer with the given naming
    pub fn new(naming: NamingConfig) -> Self {
        Self {
            naming,
            cause: TypeRef::throwable(),
        }
    }

    /// Naming in use
    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Synthesize one wrapper for one operation
    pub fn synthesize(
        &self,
        kind: WrapperKind,
        enclosing: Option<&TypeDecl>,
        op: &OperationDecl,
    ) -> GenerateResult<WrapperDecl> {
        let return_type = op
            .return_type
            .clone()
            .ok_or_else(|| GenerateError::MissingReturnType(op.qualified_name.clone()))?;

        let projection = enclosing.map(|ty| Projection::for_member(ty, op));
        if let Some(p) = projection.as_ref().filter(|p| !p.unbound.is_empty()) {
            warn!(
                operation = %op.qualified_name,
                unbound = ?p.unbound,
                "catch.synthesize type parameters not reachable from the value parameters"
            );
        }

        let mut type_params = projection
            .as_ref()
            .map(|p| p.type_params.clone())
            .unwrap_or_default();
        type_params.extend(op.type_params.iter().cloned());

        let shape = KindShape::of(kind);
        let name = format!("{}{}", op.simple_name(), self.naming.suffix(kind));
        debug!(operation = %op.qualified_name, wrapper = %name, kind = %kind, "catch.synthesize");

        Ok(WrapperDecl {
            kind,
            name,
            receiver: projection.map(|p| p.receiver),
            type_params,
            params: op.params.clone(),
            return_type: (shape.channel)(self.cause.clone(), return_type),
            body: WrapperBody {
                combinator: (shape.combinator)(),
                catch_fn: CATCH.to_string(),
                cause: self.cause.clone(),
                invocation: Invocation {
                    callee: op.qualified_name.clone(),
                    member: enclosing.is_some(),
                    args: op
                        .params
                        .iter()
                        .map(|p| Argument {
                            name: p.name.clone(),
                            spread: p.vararg,
                        })
                        .collect(),
                },
            },
        })
    }

    /// Synthesize every requested kind for one operation, in kind order
    pub fn synthesize_all(
        &self,
        kinds: &[WrapperKind],
        enclosing: Option<&TypeDecl>,
        op: &OperationDecl,
    ) -> GenerateResult<Vec<WrapperDecl>> {
        let mut ordered = kinds.to_vec();
        ordered.sort();
        ordered.dedup();
        ordered
            .into_iter()
            .map(|kind| self.synthesize(kind, enclosing, op))
            .collect()
    }

    /// Empty unit that will hold the wrappers of `op`
    pub fn unit_for(&self, enclosing: Option<&TypeDecl>, op: &OperationDecl) -> GeneratedUnit {
        GeneratedUnit::new(
            self.naming.target_namespace(&op.package),
            self.naming.file_name(enclosing, op),
        )
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(NamingConfig::default())
    }
}
