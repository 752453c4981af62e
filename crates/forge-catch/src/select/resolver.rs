//! Symbol resolution for include/exclude selections
//!
//! A dotted name either names a member (`pkg.Type.member`) or a top-level
//! function (`pkg.function`). Member resolution is tried first; names that
//! resolve as members are kept out of the top-level pass so an operation is
//! never generated twice. Names that resolve to nothing are reported as
//! misses, never as errors.

use crate::ir::{OperationDecl, OperationName, SymbolCatalog, TypeDecl};
use crate::select::{Pattern, PatternSet};
use indexmap::IndexSet;
use std::collections::HashSet;
use tracing::debug;

/// An operation found in the catalog, with its owner if it is a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'c> {
    /// Enclosing type for member operations
    pub enclosing: Option<&'c TypeDecl>,
    /// The operation declaration
    pub operation: &'c OperationDecl,
}

impl<'c> Resolved<'c> {
    /// Check if this is a member operation
    pub fn is_member(&self) -> bool {
        self.enclosing.is_some()
    }
}

/// Outcome of resolving a name list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution<'c> {
    /// Resolved operations: members first, then top-level, each in input order
    pub resolved: Vec<Resolved<'c>>,
    /// Input names that resolved to nothing
    pub misses: Vec<OperationName>,
    /// Names dropped because an exclude pattern matched
    pub excluded: Vec<OperationName>,
}

/// Resolve names against a catalog
pub fn resolve<'c, C>(names: &IndexSet<OperationName>, catalog: &'c C) -> Resolution<'c>
where
    C: SymbolCatalog + ?Sized,
{
    let mut resolution = Resolution::default();
    let mut as_member: HashSet<&OperationName> = HashSet::new();

    for name in names {
        let Some((type_path, member)) = name.split_last() else {
            continue;
        };
        let Some(ty) = catalog.type_by_name(type_path) else {
            continue;
        };
        if let Some(op) = ty.find_operation(member) {
            debug!(name = %name, owner = %ty.qualified_name, "catch.resolve member");
            resolution.resolved.push(Resolved {
                enclosing: Some(ty),
                operation: op,
            });
            as_member.insert(name);
        }
    }

    for name in names.iter().filter(|n| !as_member.contains(n)) {
        let functions = catalog.functions_by_name(name.as_str());
        if functions.is_empty() {
            debug!(name = %name, "catch.resolve miss");
            resolution.misses.push(name.clone());
            continue;
        }

        debug!(name = %name, overloads = functions.len(), "catch.resolve function");
        resolution
            .resolved
            .extend(functions.into_iter().map(|operation| Resolved {
                enclosing: None,
                operation,
            }));
    }

    resolution
}

/// Include entries expanded against a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Names to resolve, in include order
    pub names: IndexSet<OperationName>,
    /// Names dropped by an exclude pattern
    pub excluded: Vec<OperationName>,
    /// Wildcard entries that matched no catalog name
    pub unmatched: Vec<OperationName>,
}

/// Include/exclude selection over a catalog
#[derive(Debug, Clone, Default)]
pub struct Selector {
    include: Vec<Pattern>,
    exclude: PatternSet,
}

impl Selector {
    /// Create a selector from include and exclude pattern lists
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            include: include.into_iter().map(Pattern::new).collect(),
            exclude: PatternSet::new(exclude),
        }
    }

    /// Check if a name is excluded
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude.any_match(name)
    }

    /// Expand include entries against the catalog.
    ///
    /// Literal entries pass through unchanged; wildcard entries expand to
    /// matching catalog operation names in catalog order. Excluded names
    /// are split out, and wildcard entries matching nothing are kept as
    /// unmatched.
    pub fn expand<C>(&self, catalog: &C) -> Expansion
    where
        C: SymbolCatalog + ?Sized,
    {
        let mut known: Option<Vec<OperationName>> = None;
        let mut expansion = Expansion::default();

        for pattern in &self.include {
            let candidates: Vec<OperationName> = if pattern.has_wildcard() {
                known
                    .get_or_insert_with(|| catalog.operation_names())
                    .iter()
                    .filter(|n| pattern.matches(n.as_str()))
                    .cloned()
                    .collect()
            } else {
                vec![OperationName::new(pattern.as_str())]
            };

            if candidates.is_empty() {
                debug!(pattern = %pattern.as_str(), "catch.resolve miss");
                let name = OperationName::new(pattern.as_str());
                if !expansion.unmatched.contains(&name) {
                    expansion.unmatched.push(name);
                }
                continue;
            }

            for name in candidates {
                if self.is_excluded(name.as_str()) {
                    if !expansion.excluded.contains(&name) {
                        expansion.excluded.push(name);
                    }
                } else {
                    expansion.names.insert(name);
                }
            }
        }

        expansion
    }

    /// Expand, resolve, and apply exclusion to the resolved declarations.
    /// Unmatched wildcard entries are reported as misses.
    pub fn select<'c, C>(&self, catalog: &'c C) -> Resolution<'c>
    where
        C: SymbolCatalog + ?Sized,
    {
        let Expansion {
            names,
            mut excluded,
            unmatched,
        } = self.expand(catalog);
        let mut resolution = resolve(&names, catalog);

        resolution.resolved.retain(|r| {
            let name = &r.operation.qualified_name;
            if self.is_excluded(name.as_str()) {
                if !excluded.contains(name) {
                    excluded.push(name.clone());
                }
                false
            } else {
                true
            }
        });
        resolution.excluded = excluded;
        resolution.misses.extend(unmatched);
        resolution
    }
}
