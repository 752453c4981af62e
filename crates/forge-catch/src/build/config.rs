//! Generator configuration
//!
//! Configuration arrives either as a TOML file or as the flat option map a
//! build tool passes to an annotation processor:
//!
//! ```text
//! arrowGen.include = io.example.Client.fetch,io.example.parse
//! arrowGen.exclude = io.example.internal.**
//! arrowGen.raise   = true
//! arrowGen.either  = true
//! arrowGen.effect  = false
//! ```

use crate::codegen::NamingConfig;
use crate::ir::WrapperKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of build-tool option keys
pub const OPTION_PREFIX: &str = "arrowGen";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Option value could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidOption { key: String, value: String },

    /// Two kinds would produce the same wrapper name
    #[error("wrapper suffix {0:?} is used by more than one kind")]
    DuplicateSuffix(String),

    /// A kind has no suffix, so its wrapper would shadow the original
    #[error("wrapper suffix for {0} cannot be empty")]
    EmptySuffix(WrapperKind),
}

/// Selection and naming for one generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Operation names or patterns to wrap
    pub include: Vec<String>,
    /// Operation names or patterns to skip; wins over `include`
    pub exclude: Vec<String>,
    /// Generate Deferred (`Raise`) wrappers
    pub raise: bool,
    /// Generate Result (`Either`) wrappers
    pub either: bool,
    /// Generate Suspended (`Effect`) wrappers
    pub effect: bool,
    /// Wrapper and unit naming
    pub naming: NamingConfig,
}

impl GeneratorConfig {
    /// Create an empty configuration (no kinds requested)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    /// Add an exclude pattern
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Request Deferred wrappers
    pub fn raise(mut self) -> Self {
        self.raise = true;
        self
    }

    /// Request Result wrappers
    pub fn either(mut self) -> Self {
        self.either = true;
        self
    }

    /// Request Suspended wrappers
    pub fn effect(mut self) -> Self {
        self.effect = true;
        self
    }

    /// Request a kind
    pub fn kind(self, kind: WrapperKind) -> Self {
        match kind {
            WrapperKind::Deferred => self.raise(),
            WrapperKind::Result => self.either(),
            WrapperKind::Suspended => self.effect(),
        }
    }

    /// Set naming
    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    /// Requested kinds in synthesis order
    pub fn kinds(&self) -> Vec<WrapperKind> {
        WrapperKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                WrapperKind::Deferred => self.raise,
                WrapperKind::Result => self.either,
                WrapperKind::Suspended => self.effect,
            })
            .collect()
    }

    /// Read the build-tool option map (`arrowGen.*` keys)
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| options.get(&format!("{}.{}", OPTION_PREFIX, name));
        let list = |name: &str| -> Vec<String> {
            get(name)
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };
        let flag = |name: &str| -> Result<bool, ConfigError> {
            match get(name) {
                None => Ok(false),
                Some(value) => parse_bool(value).ok_or_else(|| ConfigError::InvalidOption {
                    key: format!("{}.{}", OPTION_PREFIX, name),
                    value: value.clone(),
                }),
            }
        };

        let mut naming = NamingConfig::default();
        if let Some(v) = get("raiseSuffix") {
            naming.raise_suffix = v.clone();
        }
        if let Some(v) = get("eitherSuffix") {
            naming.either_suffix = v.clone();
        }
        if let Some(v) = get("effectSuffix") {
            naming.effect_suffix = v.clone();
        }
        if let Some(v) = get("namespace") {
            naming.namespace = v.clone();
        }

        let config = Self {
            include: list("include"),
            exclude: list("exclude"),
            raise: flag("raise")?,
            either: flag("either")?,
            effect: flag("effect")?,
            naming,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    /// Check that every kind yields a distinct, non-empty wrapper name
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: Vec<&str> = Vec::new();
        for kind in WrapperKind::ALL {
            let suffix = self.naming.suffix(kind);
            if suffix.is_empty() {
                return Err(ConfigError::EmptySuffix(kind));
            }
            if seen.contains(&suffix) {
                return Err(ConfigError::DuplicateSuffix(suffix.to_string()));
            }
            seen.push(suffix);
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" | "" => Some(false),
        _ => None,
    }
}
