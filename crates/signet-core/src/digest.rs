//! # Content Digest
//!
//! `ContentDigest` pins a value by the SHA-256 of its canonical bytes. The
//! registry uses it for record digests handed to verifiers, for
//! `Commitment` material, and for deployment addresses.
//!
//! ## Security Invariant
//!
//! `sha256_digest()` accepts only `&CanonicalBytes`, so every digest in the
//! system is reproducible by any party that canonicalizes the same value.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CryptoError;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content-addressed digest with its algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    #[serde(with = "hex32")]
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new content digest from raw bytes and algorithm.
    ///
    /// Prefer [`sha256_digest()`] when the preimage is available.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a SHA-256 digest from a 64-character hex string.
    ///
    /// Accepts an optional `sha256:` prefix, matching the `Display` form.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.trim();
        let hex = s.strip_prefix("sha256:").unwrap_or(s);
        let bytes = hex32::decode(hex).map_err(CryptoError::DigestError)?;
        Ok(Self::new(DigestAlgorithm::Sha256, bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Compute a SHA-256 content digest from canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest::new(DigestAlgorithm::Sha256, bytes)
}

/// Compute a SHA-256 hex string from canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    sha256_digest(data).to_hex()
}

/// Hex (de)serialization for fixed 32-byte arrays.
mod hex32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        serializer.serialize_str(&hex)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let hex = String::deserialize(deserializer)?;
        decode(&hex).map_err(serde::de::Error::custom)
    }

    pub fn decode(hex: &str) -> Result<[u8; 32], String> {
        if hex.len() != 64 {
            return Err(format!("digest hex must be 64 chars, got {}", hex.len()));
        }
        let mut out = [0u8; 32];
        for (i, (slot, pair)) in out.iter_mut().zip(hex.as_bytes().chunks_exact(2)).enumerate() {
            *slot = nibble(pair[0], i * 2)? << 4 | nibble(pair[1], i * 2 + 1)?;
        }
        Ok(out)
    }

    fn nibble(digit: u8, position: usize) -> Result<u8, String> {
        if !digit.is_ascii_hexdigit() {
            return Err(format!("invalid hex digit at position {position}"));
        }
        char::from(digit)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| format!("invalid hex digit at position {position}"))
    }
}
