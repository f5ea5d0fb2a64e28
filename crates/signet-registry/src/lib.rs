//! # signet-registry: The Signet Registry
//!
//! A signet is a subject-identified, owner-controlled binding of public
//! material (an Ed25519 key, a perceptual fingerprint, a commitment) that
//! anyone can look up and that only its owner may rotate or transfer.
//! [`SignetRegistry`] is the authoritative mapping from subject to signet.
//!
//! ## Shape
//!
//! - [`registry`]: shared state behind one `parking_lot::RwLock`; every
//!   mutation validates and applies under a single write guard.
//! - [`auth`]: the capability check and the administrator set.
//! - [`event`]: the append-only notification journal.
//! - [`verify`]: signature and fingerprint queries for verifiers.
//! - [`deploy`]: construction from a manifest and address derivation.
//! - [`config`]: the YAML/JSON deployment manifest.
//!
//! ## Example
//!
//! ```
//! use signet_core::{Identifier, SubjectId};
//! use signet_crypto::PublicMaterial;
//! use signet_registry::{RegistrationPolicy, SignetRegistry};
//!
//! let registry = SignetRegistry::new(Identifier::new("admin"), RegistrationPolicy::Open)?;
//! let subject = SubjectId::new("alice")?;
//! let owner = Identifier::new("alice-wallet");
//! let receipt = registry.register(
//!     subject.clone(),
//!     owner.clone(),
//!     PublicMaterial::opaque(b"K1".to_vec()),
//!     &owner,
//! )?;
//! assert_eq!(receipt.value.version, 0);
//! assert_eq!(registry.lookup(&subject)?.owner, owner);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod auth;
pub mod config;
pub mod deploy;
pub mod error;
pub mod event;
pub mod registry;
pub mod verify;

pub use auth::{authorize, AccessContext, AdministratorSet, Operation};
pub use config::{ConfigError, RegistrationPolicy, RegistryConfig};
pub use deploy::{deploy, deploy_with_nonce, DeployError, Deployment, RegistryAddress};
pub use error::RegistryError;
pub use event::{EventEnvelope, EventJournal, RegistryEvent};
pub use registry::{record_digest, Receipt, SignetRegistry};
pub use verify::FingerprintMatch;
