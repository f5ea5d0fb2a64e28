//! # Verifier Queries
//!
//! Read-only questions a verifier asks about registered material:
//! does this signature come from the subject's current key, and which
//! registered fingerprint is closest to this candidate.

use serde::{Deserialize, Serialize};

use signet_core::{CanonicalBytes, Identifier, SubjectId};
use signet_crypto::{verify_with_public_key, Ed25519Signature, MaterialKind, PerceptualHash};
use signet_state::RecordMetadata;

use crate::error::RegistryError;
use crate::registry::SignetRegistry;

/// Closest registered fingerprint to a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintMatch {
    /// Subject bound to the closest fingerprint.
    pub subject: SubjectId,
    /// Its current owner.
    pub owner: Identifier,
    /// Hamming distance to the candidate.
    pub distance: u32,
    /// Whether `distance` is within the configured threshold.
    pub matched: bool,
    /// Descriptive metadata registered with the subject.
    pub metadata: Option<RecordMetadata>,
}

impl SignetRegistry {
    /// Verify an Ed25519 signature over the canonical encoding of `message`
    /// against the key currently bound to `subject`.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Revoked`, `MaterialMismatch` when the subject is not
    /// bound to an Ed25519 key, `SignatureInvalid` on a bad signature, and
    /// `Canonicalization` when `message` cannot be canonicalized.
    pub fn verify_signature<T: Serialize>(
        &self,
        subject: &SubjectId,
        message: &T,
        signature: &Ed25519Signature,
    ) -> Result<(), RegistryError> {
        let record = self.lookup(subject)?;
        record.ensure_mutable()?;
        let key = record
            .public_material
            .as_ed25519()
            .ok_or_else(|| RegistryError::MaterialMismatch {
                subject: subject.clone(),
                expected: MaterialKind::Ed25519,
                actual: record.public_material.kind(),
            })?;
        let canonical = CanonicalBytes::new(message)?;
        verify_with_public_key(&canonical, signature, key).map_err(|e| {
            RegistryError::SignatureInvalid {
                subject: subject.clone(),
                reason: e.to_string(),
            }
        })?;
        tracing::debug!(subject = %subject, version = record.version, "signature verified");
        Ok(())
    }

    /// Find the active fingerprint closest to `candidate`.
    ///
    /// Only fingerprints of the candidate's width are compared. Ties go to
    /// the lexicographically smallest subject. `None` when nothing is
    /// comparable.
    pub fn find_nearest(&self, candidate: &PerceptualHash) -> Option<FingerprintMatch> {
        let threshold = self.config().fingerprint_match_threshold;
        let best = self.with_records(|records| {
            records
                .values()
                .filter(|r| r.is_active())
                .filter_map(|r| {
                    let fp = r.public_material.as_fingerprint()?;
                    let distance = fp.hamming_distance(candidate).ok()?;
                    Some((distance, r))
                })
                .min_by(|(da, ra), (db, rb)| da.cmp(db).then_with(|| ra.subject.cmp(&rb.subject)))
                .map(|(distance, r)| FingerprintMatch {
                    subject: r.subject.clone(),
                    owner: r.owner.clone(),
                    distance,
                    matched: distance <= threshold,
                    metadata: r.metadata.clone(),
                })
        });
        tracing::debug!(
            candidate = %candidate,
            nearest = ?best.as_ref().map(|m| (m.subject.as_str(), m.distance)),
            "fingerprint lookup"
        );
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistrationPolicy;
    use signet_crypto::{Ed25519KeyPair, PublicMaterial};

    fn id(s: &str) -> Identifier {
        Identifier::new(s)
    }

    fn subject(s: &str) -> SubjectId {
        SubjectId::new(s).unwrap()
    }

    fn registry() -> SignetRegistry {
        SignetRegistry::new(id("admin"), RegistrationPolicy::Open).unwrap()
    }

    fn fp(hex: &str) -> PerceptualHash {
        PerceptualHash::from_hex(hex).unwrap()
    }

    // ── verify_signature ─────────────────────────────────────────────

    #[test]
    fn verifies_against_current_key_only() {
        let reg = registry();
        let old = Ed25519KeyPair::from_seed(&[1u8; 32]);
        let new = Ed25519KeyPair::from_seed(&[2u8; 32]);
        let s = subject("alice");
        reg.register(s.clone(), id("O1"), PublicMaterial::Ed25519(old.public_key()), &id("O1"))
            .unwrap();

        let msg = serde_json::json!({"claim": "authored", "n": 1});
        let sig = old.sign(&CanonicalBytes::new(&msg).unwrap());
        reg.verify_signature(&s, &msg, &sig).unwrap();

        reg.rotate(&s, PublicMaterial::Ed25519(new.public_key()), &id("O1"))
            .unwrap();
        assert!(matches!(
            reg.verify_signature(&s, &msg, &sig),
            Err(RegistryError::SignatureInvalid { .. })
        ));
    }

    #[test]
    fn verify_rejects_wrong_material_and_revoked() {
        let reg = registry();
        let s = subject("photo");
        reg.register(s.clone(), id("O1"), PublicMaterial::Fingerprint(fp("ffff000000000000")), &id("O1"))
            .unwrap();
        let sig = Ed25519KeyPair::from_seed(&[3u8; 32])
            .sign(&CanonicalBytes::new(&"x").unwrap());
        assert!(matches!(
            reg.verify_signature(&s, &"x", &sig),
            Err(RegistryError::MaterialMismatch {
                expected: MaterialKind::Ed25519,
                actual: MaterialKind::Fingerprint,
                ..
            })
        ));
        reg.revoke(&s, &id("O1")).unwrap();
        assert!(matches!(
            reg.verify_signature(&s, &"x", &sig),
            Err(RegistryError::Revoked { .. })
        ));
        assert!(matches!(
            reg.verify_signature(&subject("ghost"), &"x", &sig),
            Err(RegistryError::NotFound { .. })
        ));
    }

    // ── find_nearest ─────────────────────────────────────────────────

    #[test]
    fn nearest_fingerprint_and_threshold() {
        let reg = registry();
        reg.register(subject("a"), id("O1"), PublicMaterial::Fingerprint(fp("ff00000000000000")), &id("O1"))
            .unwrap();
        reg.register(subject("b"), id("O2"), PublicMaterial::Fingerprint(fp("0000000000000000")), &id("O2"))
            .unwrap();

        let hit = reg.find_nearest(&fp("0000000000000001")).unwrap();
        assert_eq!(hit.subject, subject("b"));
        assert_eq!(hit.distance, 1);
        assert!(hit.matched);

        // 56 bits from b, 64 from a: nearest but beyond 25.
        let miss = reg.find_nearest(&fp("00ffffffffffffff")).unwrap();
        assert_eq!(miss.subject, subject("b"));
        assert_eq!(miss.distance, 56);
        assert!(!miss.matched);
    }

    #[test]
    fn ties_go_to_smallest_subject() {
        let reg = registry();
        for s in ["zeta", "alpha"] {
            reg.register(subject(s), id("O1"), PublicMaterial::Fingerprint(fp("0000000000000000")), &id("O1"))
                .unwrap();
        }
        assert_eq!(reg.find_nearest(&fp("0000000000000000")).unwrap().subject, subject("alpha"));
    }

    #[test]
    fn revoked_and_other_widths_are_ignored() {
        let reg = registry();
        let s = subject("a");
        reg.register(s.clone(), id("O1"), PublicMaterial::Fingerprint(fp("0000000000000000")), &id("O1"))
            .unwrap();
        assert!(reg.find_nearest(&fp(&"00".repeat(32))).is_none());
        reg.revoke(&s, &id("O1")).unwrap();
        assert!(reg.find_nearest(&fp("0000000000000000")).is_none());
    }
}
