//! # signet-crypto: Cryptographic Material
//!
//! Everything a signet can be bound to, and the checks the registry runs
//! against it:
//!
//! - **Ed25519** public keys, signatures and key pairs. Signing and
//!   verification take `CanonicalBytes` only.
//! - **Perceptual fingerprints** (hex pHash values) with Hamming distance,
//!   used to find the registered content closest to a candidate.
//! - **`PublicMaterial`**, the tagged enum stored on each record, with the
//!   validation applied on registration and rotation.
//!
//! ## Crate Policy
//!
//! - Depends only on `signet-core` internally.
//! - Tests use real Ed25519, never mocks.
//! - Private keys never implement `Serialize` or leak through `Debug`.

pub mod ed25519;
pub mod fingerprint;
mod hex;
pub mod material;

pub use ed25519::{verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use fingerprint::PerceptualHash;
pub use material::{MaterialError, MaterialKind, OpaqueMaterial, PublicMaterial};
