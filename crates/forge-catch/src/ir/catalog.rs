//! Symbol catalog for Forge-Catch
//!
//! The catalog is the snapshot of declarations an external front-end
//! extracted from the host program. [`Catalog`] builds its lookup indices
//! once, so every query the resolver makes is a map lookup instead of a
//! scan.

use crate::ir::{OperationDecl, OperationName, TypeDecl};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed catalog document
    #[error("invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),

    /// Two type declarations share a qualified name
    #[error("duplicate type declaration: {0}")]
    DuplicateType(String),
}

/// Lookup surface the resolver needs from a symbol front-end
pub trait SymbolCatalog {
    /// Type declaration by fully qualified name
    fn type_by_name(&self, qualified_name: &str) -> Option<&TypeDecl>;

    /// Top-level operations by fully qualified name (overloads included)
    fn functions_by_name(&self, qualified_name: &str) -> Vec<&OperationDecl>;

    /// Every operation name in the catalog, in declaration order
    fn operation_names(&self) -> Vec<OperationName>;
}

/// Serialized catalog document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Type declarations with their member operations
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    /// Top-level operations
    #[serde(default)]
    pub functions: Vec<OperationDecl>,
}

/// Indexed, read-only catalog snapshot
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: Vec<TypeDecl>,
    functions: Vec<OperationDecl>,
    types_by_name: HashMap<String, usize>,
    functions_by_name: HashMap<String, Vec<usize>>,
}

impl Catalog {
    /// Build an indexed catalog from declarations
    pub fn new(types: Vec<TypeDecl>, functions: Vec<OperationDecl>) -> Result<Self, CatalogError> {
        let mut types_by_name = HashMap::with_capacity(types.len());
        for (idx, ty) in types.iter().enumerate() {
            if types_by_name.insert(ty.qualified_name.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateType(ty.qualified_name.clone()));
            }
        }

        let mut functions_by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, f) in functions.iter().enumerate() {
            functions_by_name
                .entry(f.qualified_name.as_str().to_string())
                .or_default()
                .push(idx);
        }

        Ok(Self {
            types,
            functions,
            types_by_name,
            functions_by_name,
        })
    }

    /// Build from a deserialized document
    pub fn from_document(doc: CatalogDocument) -> Result<Self, CatalogError> {
        Self::new(doc.types, doc.functions)
    }

    /// Parse a JSON catalog document
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Self::from_document(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON catalog file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// All type declarations
    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    /// All top-level operations
    pub fn functions(&self) -> &[OperationDecl] {
        &self.functions
    }

    /// Back to the serializable form
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            types: self.types.clone(),
            functions: self.functions.clone(),
        }
    }
}

impl SymbolCatalog for Catalog {
    fn type_by_name(&self, qualified_name: &str) -> Option<&TypeDecl> {
        self.types_by_name
            .get(qualified_name)
            .map(|&idx| &self.types[idx])
    }

    fn functions_by_name(&self, qualified_name: &str) -> Vec<&OperationDecl> {
        self.functions_by_name
            .get(qualified_name)
            .map(|idxs| idxs.iter().map(|&idx| &self.functions[idx]).collect())
            .unwrap_or_default()
    }

    fn operation_names(&self) -> Vec<OperationName> {
        let members = self
            .types
            .iter()
            .flat_map(|ty| ty.operations.iter().map(|op| &op.qualified_name));
        let functions = self.functions.iter().map(|f| &f.qualified_name);

        let names: IndexSet<&OperationName> = members.chain(functions).collect();
        names.into_iter().cloned().collect()
    }
}
