//! Configuration schema (gradlegraph.toml)

use serde::{Deserialize, Serialize};
use crate::mapping::{MappingEntry, TypeMapping};
use crate::model::ResolutionKind;

/// Environment variable enabling `(c)` lines
pub const ENV_INCLUDE_CONSTRAINED: &str = "GRADLEGRAPH_INCLUDE_CONSTRAINED";

/// Environment variable enabling `(*)` lines
pub const ENV_INCLUDE_OMITTED: &str = "GRADLEGRAPH_INCLUDE_OMITTED";

/// Environment variable enabling `(n)` lines
pub const ENV_INCLUDE_NOT_RESOLVED: &str = "GRADLEGRAPH_INCLUDE_NOT_RESOLVED";

/// Enablement table for marked resolution kinds
///
/// A line carrying a disabled marker is dropped entirely. Unmarked lines
/// are always processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolutionSettings {
    /// Keep `(c)` dependency-constraint lines
    #[serde(default)]
    pub constrained: bool,

    /// Keep `(*)` omitted-subtree lines
    #[serde(default)]
    pub omitted: bool,

    /// Keep `(n)` not-resolved lines
    #[serde(default)]
    pub not_resolved: bool,
}

impl ResolutionSettings {
    /// Every marked kind enabled
    pub fn all_enabled() -> Self {
        Self {
            constrained: true,
            omitted: true,
            not_resolved: true,
        }
    }

    /// Whether lines of this kind are kept
    pub fn is_enabled(&self, kind: ResolutionKind) -> bool {
        match kind {
            ResolutionKind::Normal => true,
            ResolutionKind::Constrained => self.constrained,
            ResolutionKind::Omitted => self.omitted,
            ResolutionKind::NotResolved => self.not_resolved,
        }
    }

    /// Enable or disable a marked kind
    pub fn set_enabled(&mut self, kind: ResolutionKind, enabled: bool) {
        match kind {
            ResolutionKind::Normal => {}
            ResolutionKind::Constrained => self.constrained = enabled,
            ResolutionKind::Omitted => self.omitted = enabled,
            ResolutionKind::NotResolved => self.not_resolved = enabled,
        }
    }
}

fn default_purge() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Purge the store once before loading a batch
    #[serde(default = "default_purge")]
    pub purge_before_load: bool,

    /// Resolution-kind enablement
    #[serde(default)]
    pub resolution: ResolutionSettings,

    /// Inline type-mapping table, in match order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapping: Vec<MappingEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            purge_before_load: true,
            resolution: ResolutionSettings::default(),
            mapping: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Apply `GRADLEGRAPH_INCLUDE_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (used by tests)
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = [
            (ENV_INCLUDE_CONSTRAINED, ResolutionKind::Constrained),
            (ENV_INCLUDE_OMITTED, ResolutionKind::Omitted),
            (ENV_INCLUDE_NOT_RESOLVED, ResolutionKind::NotResolved),
        ];

        for (key, kind) in vars {
            if let Some(value) = lookup(key) {
                let enabled = parse_bool(&value).ok_or_else(|| ConfigError::InvalidEnv {
                    key: key.to_string(),
                    value: value.clone(),
                })?;
                self.resolution.set_enabled(kind, enabled);
            }
        }

        Ok(self)
    }

    /// Inline mapping table, if one is configured
    pub fn type_mapping(&self) -> Option<TypeMapping> {
        if self.mapping.is_empty() {
            None
        } else {
            Some(TypeMapping::new(self.mapping.clone()))
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid value {value:?} for {key} (expected true or false)")]
    InvalidEnv { key: String, value: String },
}
