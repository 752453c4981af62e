//! Output sinks for rendered units

use indexmap::IndexMap;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while writing a unit
#[derive(Debug, Error)]
pub enum EmitError {
    /// IO error
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sink already holds this key
    #[error("unit {0} was already written")]
    AlreadyWritten(String),
}

/// Destination for rendered units
pub trait UnitSink {
    /// Write one unit. `key` is the unit's relative path.
    fn write_unit(&mut self, key: &str, source: &str) -> Result<(), EmitError>;
}

impl<S: UnitSink + ?Sized> UnitSink for &mut S {
    fn write_unit(&mut self, key: &str, source: &str) -> Result<(), EmitError> {
        (**self).write_unit(key, source)
    }
}

/// Keeps rendered units in memory, in write order
#[derive(Debug, Default)]
pub struct MemorySink {
    units: IndexMap<String, String>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Source of a written unit
    pub fn get(&self, key: &str) -> Option<&str> {
        self.units.get(key).map(String::as_str)
    }

    /// Keys in write order
    pub fn keys(&self) -> Vec<&str> {
        self.units.keys().map(String::as_str).collect()
    }

    /// Number of written units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if nothing was written
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Take the written units
    pub fn into_units(self) -> IndexMap<String, String> {
        self.units
    }
}

impl UnitSink for MemorySink {
    fn write_unit(&mut self, key: &str, source: &str) -> Result<(), EmitError> {
        if self.units.contains_key(key) {
            return Err(EmitError::AlreadyWritten(key.to_string()));
        }
        self.units.insert(key.to_string(), source.to_string());
        Ok(())
    }
}

/// Writes units as files below a root directory
#[derive(Debug)]
pub struct DirSink {
    root: PathBuf,
    written: HashSet<String>,
}

impl DirSink {
    /// Create a sink rooted at `root`. Directories are created on write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: HashSet::new(),
        }
    }

    /// Root output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a key is written to
    pub fn path_for(&self, key: &str) -> PathBuf {
        key.split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl UnitSink for DirSink {
    fn write_unit(&mut self, key: &str, source: &str) -> Result<(), EmitError> {
        if self.written.contains(key) {
            return Err(EmitError::AlreadyWritten(key.to_string()));
        }

        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| EmitError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, source).map_err(|source| EmitError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "catch.emit file");
        self.written.insert(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_writes_once() {
        let mut sink = MemorySink::new();
        sink.write_unit("pkg/arrow/FExtensions.kt", "a").unwrap();

        let err = sink.write_unit("pkg/arrow/FExtensions.kt", "b").unwrap_err();
        assert!(matches!(err, EmitError::AlreadyWritten(k) if k == "pkg/arrow/FExtensions.kt"));
        assert_eq!(sink.get("pkg/arrow/FExtensions.kt"), Some("a"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_dir_sink_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirSink::new(dir.path());

        sink.write_unit("io/example/arrow/FExtensions.kt", "package io.example.arrow\n")
            .unwrap();

        let path = dir.path().join("io").join("example").join("arrow").join("FExtensions.kt");
        assert_eq!(fs::read_to_string(path).unwrap(), "package io.example.arrow\n");
        assert!(sink.write_unit("io/example/arrow/FExtensions.kt", "").is_err());
    }
}
