//! # Deployment
//!
//! Constructs a registry and publishes its address. The address commits to
//! the canonical construction parameters and a random deployment nonce, so
//! two deployments of the same manifest get distinct addresses while the
//! address of any one deployment can be recomputed from its manifest and
//! nonce.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use signet_core::{sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest};

use crate::config::{ConfigError, RegistryConfig};
use crate::registry::SignetRegistry;

/// Module name committed into every address.
pub const MODULE_NAME: &str = "SignetRegistryModule";

/// Contract name committed into every address.
pub const CONTRACT_NAME: &str = "SignetRegistry";

/// Published address of a deployed registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryAddress(ContentDigest);

impl RegistryAddress {
    /// Compute the address for `config` deployed with `nonce`.
    pub fn derive(config: &RegistryConfig, nonce: Uuid) -> Result<Self, CanonicalizationError> {
        let payload = AddressPayload {
            module: MODULE_NAME,
            contract: CONTRACT_NAME,
            config,
            nonce,
        };
        let canonical = CanonicalBytes::new(&payload)?;
        Ok(Self(sha256_digest(&canonical)))
    }

    /// Underlying digest.
    pub fn digest(&self) -> &ContentDigest {
        &self.0
    }
}

impl std::fmt::Display for RegistryAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "signet:{}", self.0.to_hex())
    }
}

#[derive(Serialize)]
struct AddressPayload<'a> {
    module: &'a str,
    contract: &'a str,
    config: &'a RegistryConfig,
    nonce: Uuid,
}

/// A constructed registry and where it lives.
#[derive(Debug, Clone)]
pub struct Deployment {
    /// Published address.
    pub address: RegistryAddress,
    /// Nonce committed into the address.
    pub nonce: Uuid,
    /// Shared handle to the registry.
    pub registry: Arc<SignetRegistry>,
}

/// Deployment failures.
#[derive(Error, Debug)]
pub enum DeployError {
    /// The manifest is invalid.
    #[error("invalid deployment configuration: {0}")]
    Config(#[from] ConfigError),

    /// The address payload could not be canonicalized.
    #[error("cannot derive registry address: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Deploy a registry with a fresh random nonce.
pub fn deploy(config: RegistryConfig) -> Result<Deployment, DeployError> {
    deploy_with_nonce(config, Uuid::new_v4())
}

/// Deploy a registry with a caller-chosen nonce.
pub fn deploy_with_nonce(config: RegistryConfig, nonce: Uuid) -> Result<Deployment, DeployError> {
    config.validate()?;
    let address = RegistryAddress::derive(&config, nonce)?;
    let registry = Arc::new(SignetRegistry::with_config(config)?);
    tracing::info!(%address, %nonce, "signet registry deployed");
    Ok(Deployment {
        address,
        nonce,
        registry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistrationPolicy;
    use signet_core::Identifier;

    fn config() -> RegistryConfig {
        RegistryConfig::new(Identifier::new("admin"), RegistrationPolicy::Open)
    }

    #[test]
    fn address_is_reproducible_from_manifest_and_nonce() {
        let nonce = Uuid::from_u128(7);
        let a = deploy_with_nonce(config(), nonce).unwrap();
        let b = RegistryAddress::derive(&config(), nonce).unwrap();
        assert_eq!(a.address, b);
        assert!(a.address.to_string().starts_with("signet:"));
        assert_eq!(a.address.to_string().len(), "signet:".len() + 64);
    }

    #[test]
    fn address_commits_to_nonce_and_config() {
        let base = RegistryAddress::derive(&config(), Uuid::from_u128(1)).unwrap();
        let other_nonce = RegistryAddress::derive(&config(), Uuid::from_u128(2)).unwrap();
        let other_policy = RegistryAddress::derive(
            &RegistryConfig::new(Identifier::new("admin"), RegistrationPolicy::AdministratorOnly),
            Uuid::from_u128(1),
        )
        .unwrap();
        assert_ne!(base, other_nonce);
        assert_ne!(base, other_policy);
    }

    #[test]
    fn random_deployments_differ() {
        let a = deploy(config()).unwrap();
        let b = deploy(config()).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn invalid_manifest_is_rejected() {
        let err = deploy(RegistryConfig::new(Identifier::null(), RegistrationPolicy::Open)).unwrap_err();
        assert!(matches!(err, DeployError::Config(ConfigError::NullAdministrator)));
    }

    #[test]
    fn deployed_registry_is_usable() {
        let d = deploy(config()).unwrap();
        assert!(d.registry.is_administrator(&Identifier::new("admin")));
        assert!(d.registry.is_empty());
    }
}
