//! # Registry Configuration
//!
//! Everything a registry needs is supplied once at construction and never
//! changes afterwards. Deployment tooling usually hands it over as a small
//! YAML manifest:
//!
//! ```yaml
//! initial_administrator: "0x4cc13433651c7fc5C0f9aECf803479455646634c"
//! registration_policy: administrator_only
//! fingerprint_match_threshold: 25
//! max_material_bytes: 1024
//! max_signets_per_owner: 1
//! ```
//!
//! `registration_policy` has no default: whether registration is open or
//! gated is a deliberate deployment decision. `max_signets_per_owner` is
//! unlimited when absent.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use signet_core::Identifier;

/// Default maximum Hamming distance at which two fingerprints match.
pub const DEFAULT_FINGERPRINT_MATCH_THRESHOLD: u32 = 25;

/// Default cap on opaque material size, in bytes.
pub const DEFAULT_MAX_MATERIAL_BYTES: usize = 1024;

/// Widest supported fingerprint, in bits. Thresholds beyond it are meaningless.
pub const MAX_FINGERPRINT_BITS: u32 = 256;

/// Who may register new signets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
    /// Any caller may register.
    Open,
    /// Only administrators may register.
    AdministratorOnly,
}

impl std::fmt::Display for RegistrationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::AdministratorOnly => "administrator_only",
        })
    }
}

/// Construction-time configuration of a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// The first administrator.
    pub initial_administrator: Identifier,
    /// Registration policy.
    pub registration_policy: RegistrationPolicy,
    /// Maximum Hamming distance accepted by fingerprint matching.
    #[serde(default = "default_threshold")]
    pub fingerprint_match_threshold: u32,
    /// Cap on opaque material size.
    #[serde(default = "default_max_material_bytes")]
    pub max_material_bytes: usize,
    /// Cap on active signets held by one owner. `None` is unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_signets_per_owner: Option<usize>,
}

fn default_threshold() -> u32 {
    DEFAULT_FINGERPRINT_MATCH_THRESHOLD
}

fn default_max_material_bytes() -> usize {
    DEFAULT_MAX_MATERIAL_BYTES
}

impl RegistryConfig {
    /// Configuration with defaults for everything but the two required fields.
    pub fn new(initial_administrator: Identifier, registration_policy: RegistrationPolicy) -> Self {
        Self {
            initial_administrator,
            registration_policy,
            fingerprint_match_threshold: DEFAULT_FINGERPRINT_MATCH_THRESHOLD,
            max_material_bytes: DEFAULT_MAX_MATERIAL_BYTES,
            max_signets_per_owner: None,
        }
    }

    /// Override the fingerprint match threshold.
    pub fn with_fingerprint_match_threshold(mut self, threshold: u32) -> Self {
        self.fingerprint_match_threshold = threshold;
        self
    }

    /// Override the opaque material size cap.
    pub fn with_max_material_bytes(mut self, max: usize) -> Self {
        self.max_material_bytes = max;
        self
    }

    /// Limit how many active signets one owner may hold.
    pub fn with_max_signets_per_owner(mut self, limit: usize) -> Self {
        self.max_signets_per_owner = Some(limit);
        self
    }

    /// Parse and validate a YAML manifest.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON manifest.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a manifest from disk. `.json` files are parsed as JSON,
    /// anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Check the invariants construction relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_administrator.is_null() {
            return Err(ConfigError::NullAdministrator);
        }
        if self.fingerprint_match_threshold > MAX_FINGERPRINT_BITS {
            return Err(ConfigError::ThresholdOutOfRange {
                threshold: self.fingerprint_match_threshold,
                max: MAX_FINGERPRINT_BITS,
            });
        }
        if self.max_material_bytes == 0 {
            return Err(ConfigError::ZeroMaterialCap);
        }
        if self.max_signets_per_owner == Some(0) {
            return Err(ConfigError::ZeroOwnerLimit);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The initial administrator is the null identifier.
    #[error("initial administrator must not be the null identifier")]
    NullAdministrator,

    /// Threshold wider than any fingerprint.
    #[error("fingerprint match threshold {threshold} exceeds {max} bits")]
    ThresholdOutOfRange {
        /// Configured threshold.
        threshold: u32,
        /// Widest fingerprint.
        max: u32,
    },

    /// Material cap of zero would reject all opaque material.
    #[error("max_material_bytes must be greater than zero")]
    ZeroMaterialCap,

    /// An owner limit of zero would reject every registration.
    #[error("max_signets_per_owner must be greater than zero")]
    ZeroOwnerLimit,

    /// Manifest could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Manifest path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// YAML manifest did not parse.
    #[error("invalid YAML manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON manifest did not parse.
    #[error("invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),
}
