//! # Public Material
//!
//! The cryptographic material a signet binds to its subject. It is replaced
//! wholesale on rotation and validated every time it enters the registry.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use signet_core::ContentDigest;
use thiserror::Error;

use crate::ed25519::Ed25519PublicKey;
use crate::fingerprint::PerceptualHash;
use crate::hex;

/// Material rejected by [`PublicMaterial::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterialError {
    /// Opaque material carried no bytes.
    #[error("opaque material must not be empty")]
    Empty,

    /// Opaque material exceeded the configured size cap.
    #[error("material is {len} bytes, maximum is {max}")]
    TooLarge {
        /// Observed length in bytes.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Ed25519 bytes do not decode to a curve point.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidKey(String),
}

/// Arbitrary material bytes, hex-encoded on the wire.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OpaqueMaterial(Vec<u8>);

impl OpaqueMaterial {
    /// Wrap raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for OpaqueMaterial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for OpaqueMaterial {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(Self).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for OpaqueMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpaqueMaterial({} bytes, {}...)", self.0.len(), hex::prefix(&self.0))
    }
}

/// Discriminant of [`PublicMaterial`], for logs and mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    /// Ed25519 public key.
    Ed25519,
    /// Perceptual content fingerprint.
    Fingerprint,
    /// SHA-256 commitment.
    Commitment,
    /// Uninterpreted bytes.
    Opaque,
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ed25519 => "ed25519",
            Self::Fingerprint => "fingerprint",
            Self::Commitment => "commitment",
            Self::Opaque => "opaque",
        };
        f.write_str(s)
    }
}

/// Cryptographic material bound to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PublicMaterial {
    /// An Ed25519 verification key.
    Ed25519(Ed25519PublicKey),
    /// A perceptual hash of registered content.
    Fingerprint(PerceptualHash),
    /// A commitment to material held elsewhere.
    Commitment(ContentDigest),
    /// Anything else.
    Opaque(OpaqueMaterial),
}

impl PublicMaterial {
    /// Shorthand for opaque material.
    pub fn opaque(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Opaque(OpaqueMaterial::new(bytes))
    }

    /// Which variant this is.
    pub fn kind(&self) -> MaterialKind {
        match self {
            Self::Ed25519(_) => MaterialKind::Ed25519,
            Self::Fingerprint(_) => MaterialKind::Fingerprint,
            Self::Commitment(_) => MaterialKind::Commitment,
            Self::Opaque(_) => MaterialKind::Opaque,
        }
    }

    /// Size of the raw material in bytes.
    pub fn len(&self) -> usize {
        match self {
            Self::Ed25519(k) => k.as_bytes().len(),
            Self::Fingerprint(h) => h.as_bytes().len(),
            Self::Commitment(d) => d.bytes.len(),
            Self::Opaque(o) => o.as_bytes().len(),
        }
    }

    /// Whether the material is empty. Only opaque material can be.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the material is acceptable for binding.
    ///
    /// Ed25519 keys must decode to a curve point. Opaque material must be
    /// non-empty and at most `max_bytes`. Fingerprints and commitments are
    /// validated at construction.
    pub fn validate(&self, max_bytes: usize) -> Result<(), MaterialError> {
        match self {
            Self::Ed25519(key) => key
                .to_verifying_key()
                .map(|_| ())
                .map_err(|e| MaterialError::InvalidKey(e.to_string())),
            Self::Opaque(o) if o.as_bytes().is_empty() => Err(MaterialError::Empty),
            Self::Opaque(o) if o.as_bytes().len() > max_bytes => Err(MaterialError::TooLarge {
                len: o.as_bytes().len(),
                max: max_bytes,
            }),
            _ => Ok(()),
        }
    }

    /// The Ed25519 key, if that is what is bound.
    pub fn as_ed25519(&self) -> Option<&Ed25519PublicKey> {
        match self {
            Self::Ed25519(k) => Some(k),
            _ => None,
        }
    }

    /// The fingerprint, if that is what is bound.
    pub fn as_fingerprint(&self) -> Option<&PerceptualHash> {
        match self {
            Self::Fingerprint(h) => Some(h),
            _ => None,
        }
    }
}
