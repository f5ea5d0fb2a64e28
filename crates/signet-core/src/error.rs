//! # Error Types
//!
//! Leaf-level error enums shared across the workspace. Higher layers wrap
//! these with `#[from]` so a single `?` carries full context upward.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest or fingerprint parsing failed.
    #[error("digest error: {0}")]
    DigestError(String),
}

/// Error constructing an identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Subject identifiers must contain at least one non-whitespace character.
    #[error("subject identifier must not be empty")]
    EmptySubject,

    /// Subject identifier exceeds the maximum encoded length.
    #[error("subject identifier is {len} bytes, maximum is {max}")]
    SubjectTooLong {
        /// Observed length in bytes.
        len: usize,
        /// Maximum permitted length in bytes.
        max: usize,
    },
}

/// The logical clock cannot advance any further.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("logical sequence exhausted at {at}")]
pub struct SequenceError {
    /// The last sequence value handed out.
    pub at: u64,
}
