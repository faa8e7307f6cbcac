//! Engine configuration

use crate::error::ConfigError;
use crate::logging::DEFAULT_AUDIT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration. Every field has a default, so an empty TOML
/// document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum retained audit entries
    pub audit_capacity: usize,
    /// Optional cap on the undo stack; `None` keeps every snapshot
    pub history_limit: Option<usize>,
    /// Reject update/remove operations whose target does not exist
    pub strict_targets: bool,
    /// Stamped into the `user` field of every audit entry
    pub actor: Option<String>,
}

impl EngineConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_strict_targets(mut self, strict: bool) -> Self {
        self.strict_targets = strict;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audit_capacity == 0 {
            return Err(ConfigError::ZeroAuditCapacity);
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::ZeroHistoryLimit);
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            history_limit: None,
            strict_targets: false,
            actor: None,
        }
    }
}
