//! # Perceptual Fingerprints
//!
//! A perceptual hash (pHash) summarizes an image or a representative video
//! frame so that visually similar content yields hashes that differ in only
//! a few bits. Content publishers register these as signet material, and
//! verifiers look for the registered fingerprint with the smallest Hamming
//! distance to a candidate.
//!
//! Fingerprints are carried as hex strings. Two widths are in use:
//! 64-bit (`hash_size = 8`, 16 hex chars) and 256-bit (`hash_size = 16`,
//! 64 hex chars). Distances are only defined between equal widths.
//!
//! Hashing pixels is out of scope here; callers bring the hex value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use signet_core::CryptoError;

use crate::hex;

/// Accepted fingerprint widths, in bytes.
pub const FINGERPRINT_WIDTHS: [usize; 2] = [8, 32];

/// A perceptual hash of fixed width.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PerceptualHash(Vec<u8>);

impl PerceptualHash {
    /// Parse a fingerprint from hex.
    ///
    /// # Errors
    ///
    /// `CryptoError::DigestError` if the string is not hex or its decoded
    /// width is not one of [`FINGERPRINT_WIDTHS`].
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(s.trim()).map_err(CryptoError::DigestError)?;
        if !FINGERPRINT_WIDTHS.contains(&bytes.len()) {
            return Err(CryptoError::DigestError(format!(
                "fingerprint must be 64 or 256 bits, got {} bits",
                bytes.len() * 8
            )));
        }
        Ok(Self(bytes))
    }

    /// Width of the fingerprint in bits.
    pub fn bits(&self) -> u32 {
        (self.0.len() * 8) as u32
    }

    /// Raw fingerprint bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Number of differing bits between two fingerprints of equal width.
    ///
    /// # Errors
    ///
    /// `CryptoError::DigestError` if the widths differ.
    pub fn hamming_distance(&self, other: &Self) -> Result<u32, CryptoError> {
        if self.0.len() != other.0.len() {
            return Err(CryptoError::DigestError(format!(
                "cannot compare {}-bit and {}-bit fingerprints",
                self.bits(),
                other.bits()
            )));
        }
        Ok(self
            .0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Whether two fingerprints can be compared.
    pub fn same_width(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
    }
}

impl Serialize for PerceptualHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PerceptualHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for PerceptualHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PerceptualHash({})", self.to_hex())
    }
}

impl std::fmt::Display for PerceptualHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_widths() {
        assert_eq!(PerceptualHash::from_hex("ffd8c0c0e0f0f8fc").unwrap().bits(), 64);
        assert_eq!(PerceptualHash::from_hex(&"a5".repeat(32)).unwrap().bits(), 256);
    }

    #[test]
    fn rejects_other_widths_and_garbage() {
        assert!(PerceptualHash::from_hex("abcd").is_err());
        assert!(PerceptualHash::from_hex(&"00".repeat(16)).is_err());
        assert!(PerceptualHash::from_hex("not a hash!!!!!!").is_err());
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = PerceptualHash::from_hex("0000000000000000").unwrap();
        let b = PerceptualHash::from_hex("000000000000000f").unwrap();
        let c = PerceptualHash::from_hex("ffffffffffffffff").unwrap();
        assert_eq!(a.hamming_distance(&a).unwrap(), 0);
        assert_eq!(a.hamming_distance(&b).unwrap(), 4);
        assert_eq!(a.hamming_distance(&c).unwrap(), 64);
    }

    #[test]
    fn distance_across_widths_is_an_error() {
        let short = PerceptualHash::from_hex("0000000000000000").unwrap();
        let long = PerceptualHash::from_hex(&"00".repeat(32)).unwrap();
        assert!(!short.same_width(&long));
        assert!(short.hamming_distance(&long).is_err());
    }

    #[test]
    fn uppercase_input_normalizes() {
        let h = PerceptualHash::from_hex("FFD8C0C0E0F0F8FC").unwrap();
        assert_eq!(h.to_hex(), "ffd8c0c0e0f0f8fc");
    }
}
