//! # Signet Record State Machine
//!
//! A [`SignetRecord`] binds a subject to an owner and to public material.
//! Every successful transition bumps `version`, stamps `updated_at` with the
//! logical sequence of the commit, and appends a [`TransitionRecord`].
//!
//! Only the most recent [`MAX_RETAINED_TRANSITIONS`] entries stay on the
//! record, so snapshots stay small for long-lived subjects. The registry's
//! event journal keeps the complete history.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use signet_core::{Identifier, Sequence, SubjectId};
use signet_crypto::PublicMaterial;

/// Number of trailing transitions kept on a record.
pub const MAX_RETAINED_TRANSITIONS: usize = 32;

// ─── Status ──────────────────────────────────────────────────────────

/// Lifecycle status of a signet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignetStatus {
    /// Bound and mutable by its owner.
    Active,
    /// Permanently revoked (terminal).
    Revoked,
}

impl SignetStatus {
    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }
}

impl std::fmt::Display for SignetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Active => "ACTIVE",
            Self::Revoked => "REVOKED",
        })
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Transition rejected by the record itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Mutation attempted on a revoked record.
    #[error("signet {subject} is revoked")]
    Revoked {
        /// The revoked subject.
        subject: SubjectId,
    },

    /// Revocation attempted on a record that is already revoked.
    #[error("signet {subject} is already revoked")]
    AlreadyRevoked {
        /// The revoked subject.
        subject: SubjectId,
    },

    /// The version counter cannot be incremented further.
    #[error("signet {subject} version counter exhausted")]
    VersionExhausted {
        /// The affected subject.
        subject: SubjectId,
    },
}

// ─── Transition log ──────────────────────────────────────────────────

/// What kind of transition produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// ∅ → Active.
    Registered,
    /// Active → Active, material replaced.
    Rotated,
    /// Active → Active, owner replaced.
    OwnershipTransferred,
    /// Active → Revoked.
    Revoked,
}

/// One committed transition of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Which transition this was.
    pub kind: TransitionKind,
    /// Status before the transition; `None` for registration.
    pub from_status: Option<SignetStatus>,
    /// Status after the transition.
    pub to_status: SignetStatus,
    /// Record version after the transition.
    pub version: u64,
    /// Registry sequence at which the transition committed.
    pub sequence: Sequence,
    /// The authorized caller that performed it.
    pub actor: Identifier,
}

// ─── Metadata ────────────────────────────────────────────────────────

/// Descriptive metadata supplied at registration. Immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Human-readable title of the registered content or key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RecordMetadata {
    /// Metadata with a title and description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }
}

// ─── Record ──────────────────────────────────────────────────────────

/// A registered signet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignetRecord {
    /// Unique key; immutable.
    pub subject: SubjectId,
    /// Principal allowed to rotate or transfer.
    pub owner: Identifier,
    /// Currently bound material.
    pub public_material: PublicMaterial,
    /// Lifecycle status.
    pub status: SignetStatus,
    /// Mutation counter, 0 at registration.
    pub version: u64,
    /// Registry sequence of registration.
    pub created_at: Sequence,
    /// Registry sequence of the latest transition.
    pub updated_at: Sequence,
    /// Optional descriptive metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
    /// The most recent committed transitions, oldest first.
    pub transitions: Vec<TransitionRecord>,
}

impl SignetRecord {
    /// Create a freshly registered, active record at version 0.
    pub fn register(
        subject: SubjectId,
        owner: Identifier,
        public_material: PublicMaterial,
        metadata: Option<RecordMetadata>,
        actor: Identifier,
        at: Sequence,
    ) -> Self {
        Self {
            subject,
            owner,
            public_material,
            status: SignetStatus::Active,
            version: 0,
            created_at: at,
            updated_at: at,
            metadata,
            transitions: vec![TransitionRecord {
                kind: TransitionKind::Registered,
                from_status: None,
                to_status: SignetStatus::Active,
                version: 0,
                sequence: at,
                actor,
            }],
        }
    }

    /// Whether the record is active.
    pub fn is_active(&self) -> bool {
        self.status == SignetStatus::Active
    }

    /// Whether the record is revoked.
    pub fn is_revoked(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fail with `Revoked` unless the record still accepts mutations.
    pub fn ensure_mutable(&self) -> Result<(), RecordError> {
        if self.is_revoked() {
            return Err(RecordError::Revoked {
                subject: self.subject.clone(),
            });
        }
        Ok(())
    }

    /// Fail with `AlreadyRevoked` unless the record can be revoked.
    pub fn ensure_revocable(&self) -> Result<(), RecordError> {
        if self.is_revoked() {
            return Err(RecordError::AlreadyRevoked {
                subject: self.subject.clone(),
            });
        }
        Ok(())
    }

    /// Replace the bound material (Active → Active).
    pub fn rotate(
        &mut self,
        material: PublicMaterial,
        actor: Identifier,
        at: Sequence,
    ) -> Result<u64, RecordError> {
        self.ensure_mutable()?;
        let version = self.next_version()?;
        self.public_material = material;
        self.commit(TransitionKind::Rotated, SignetStatus::Active, version, actor, at);
        Ok(version)
    }

    /// Hand the record to a new owner (Active → Active).
    ///
    /// Returns the previous owner.
    pub fn transfer_ownership(
        &mut self,
        new_owner: Identifier,
        actor: Identifier,
        at: Sequence,
    ) -> Result<Identifier, RecordError> {
        self.ensure_mutable()?;
        let version = self.next_version()?;
        let previous = std::mem::replace(&mut self.owner, new_owner);
        self.commit(
            TransitionKind::OwnershipTransferred,
            SignetStatus::Active,
            version,
            actor,
            at,
        );
        Ok(previous)
    }

    /// Revoke permanently (Active → Revoked).
    pub fn revoke(&mut self, actor: Identifier, at: Sequence) -> Result<u64, RecordError> {
        self.ensure_revocable()?;
        let version = self.next_version()?;
        self.commit(TransitionKind::Revoked, SignetStatus::Revoked, version, actor, at);
        Ok(version)
    }

    fn next_version(&self) -> Result<u64, RecordError> {
        self.version
            .checked_add(1)
            .ok_or_else(|| RecordError::VersionExhausted {
                subject: self.subject.clone(),
            })
    }

    fn commit(
        &mut self,
        kind: TransitionKind,
        to: SignetStatus,
        version: u64,
        actor: Identifier,
        at: Sequence,
    ) {
        if self.transitions.len() >= MAX_RETAINED_TRANSITIONS {
            let excess = self.transitions.len() + 1 - MAX_RETAINED_TRANSITIONS;
            self.transitions.drain(..excess);
        }
        self.transitions.push(TransitionRecord {
            kind,
            from_status: Some(self.status),
            to_status: to,
            version,
            sequence: at,
            actor,
        });
        self.status = to;
        self.version = version;
        self.updated_at = at;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(s: &str) -> SubjectId {
        SubjectId::new(s).unwrap()
    }

    fn owner() -> Identifier {
        Identifier::new("O1")
    }

    fn make_record() -> SignetRecord {
        SignetRecord::register(
            subject("S1"),
            owner(),
            PublicMaterial::opaque(b"K1".to_vec()),
            None,
            owner(),
            Sequence::new(1),
        )
    }

    // ── Happy-path lifecycle ─────────────────────────────────────────

    #[test]
    fn register_starts_active_at_version_zero() {
        let rec = make_record();
        assert!(rec.is_active());
        assert_eq!(rec.version, 0);
        assert_eq!(rec.created_at, Sequence::new(1));
        assert_eq!(rec.updated_at, Sequence::new(1));
        assert_eq!(rec.transitions.len(), 1);
        assert_eq!(rec.transitions[0].kind, TransitionKind::Registered);
        assert_eq!(rec.transitions[0].from_status, None);
    }

    #[test]
    fn rotate_replaces_material_and_bumps_version() {
        let mut rec = make_record();
        let v = rec
            .rotate(PublicMaterial::opaque(b"K2".to_vec()), owner(), Sequence::new(2))
            .unwrap();
        assert_eq!(v, 1);
        assert_eq!(rec.version, 1);
        assert_eq!(rec.public_material, PublicMaterial::opaque(b"K2".to_vec()));
        assert_eq!(rec.updated_at, Sequence::new(2));
        assert_eq!(rec.created_at, Sequence::new(1));
    }

    #[test]
    fn transfer_returns_previous_owner() {
        let mut rec = make_record();
        let prev = rec
            .transfer_ownership(Identifier::new("O2"), owner(), Sequence::new(2))
            .unwrap();
        assert_eq!(prev, owner());
        assert_eq!(rec.owner, Identifier::new("O2"));
        assert_eq!(rec.version, 1);
        assert!(rec.is_active());
    }

    #[test]
    fn revoke_is_terminal() {
        let mut rec = make_record();
        assert_eq!(rec.revoke(owner(), Sequence::new(2)).unwrap(), 1);
        assert!(rec.is_revoked());
        assert!(rec.status.is_terminal());
        let last = rec.transitions.last().unwrap();
        assert_eq!(last.from_status, Some(SignetStatus::Active));
        assert_eq!(last.to_status, SignetStatus::Revoked);
    }

    #[test]
    fn transition_log_keeps_recent_window() {
        let mut rec = make_record();
        for i in 0..40u64 {
            rec.rotate(PublicMaterial::opaque(vec![i as u8 + 1]), owner(), Sequence::new(i + 2))
                .unwrap();
        }
        assert_eq!(rec.version, 40);
        assert_eq!(rec.transitions.len(), MAX_RETAINED_TRANSITIONS);
        assert_eq!(rec.transitions[0].version, 9);
        assert_eq!(rec.transitions.last().unwrap().version, 40);
        assert!(rec
            .transitions
            .windows(2)
            .all(|w| w[1].version == w[0].version + 1));
    }

    // ── Rejected transitions ─────────────────────────────────────────

    #[test]
    fn revoked_record_rejects_rotation_unchanged() {
        let mut rec = make_record();
        rec.revoke(owner(), Sequence::new(2)).unwrap();
        let before = rec.clone();
        let err = rec
            .rotate(PublicMaterial::opaque(b"K3".to_vec()), owner(), Sequence::new(3))
            .unwrap_err();
        assert_eq!(err, RecordError::Revoked { subject: subject("S1") });
        assert_eq!(rec, before);
    }

    #[test]
    fn revoked_record_rejects_transfer() {
        let mut rec = make_record();
        rec.revoke(owner(), Sequence::new(2)).unwrap();
        assert!(matches!(
            rec.transfer_ownership(Identifier::new("O2"), owner(), Sequence::new(3)),
            Err(RecordError::Revoked { .. })
        ));
        assert_eq!(rec.owner, owner());
    }

    #[test]
    fn second_revoke_fails_already_revoked() {
        let mut rec = make_record();
        rec.revoke(owner(), Sequence::new(2)).unwrap();
        let before = rec.clone();
        assert!(matches!(
            rec.revoke(owner(), Sequence::new(3)),
            Err(RecordError::AlreadyRevoked { .. })
        ));
        assert_eq!(rec, before);
    }

    #[test]
    fn version_exhaustion_leaves_record_untouched() {
        let mut rec = make_record();
        rec.version = u64::MAX;
        let before = rec.clone();
        assert!(matches!(
            rec.rotate(PublicMaterial::opaque(b"K2".to_vec()), owner(), Sequence::new(2)),
            Err(RecordError::VersionExhausted { .. })
        ));
        assert_eq!(rec, before);
    }

    // ── Display / serde ──────────────────────────────────────────────

    #[test]
    fn status_display() {
        assert_eq!(SignetStatus::Active.to_string(), "ACTIVE");
        assert_eq!(SignetStatus::Revoked.to_string(), "REVOKED");
    }

    #[test]
    fn record_serialization() {
        let mut rec = make_record();
        rec.metadata = Some(RecordMetadata::new("Launch video", "Official cut"));
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["subject"], "S1");
        assert_eq!(json["metadata"]["title"], "Launch video");
        let parsed: SignetRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, rec);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Rotate(u8),
        Transfer(u8),
        Revoke,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<u8>().prop_map(Op::Rotate),
            (1u8..=255).prop_map(Op::Transfer),
            Just(Op::Revoke),
        ]
    }

    proptest! {
        /// Each successful transition bumps the version by exactly one;
        /// each failed one leaves the record byte-for-byte unchanged.
        #[test]
        fn version_tracks_successful_transitions(ops in prop::collection::vec(op(), 0..32)) {
            let actor = Identifier::new("O1");
            let mut rec = SignetRecord::register(
                SubjectId::new("S1").unwrap(),
                actor.clone(),
                PublicMaterial::opaque(vec![0u8]),
                None,
                actor.clone(),
                Sequence::new(1),
            );
            let mut seq = 1u64;
            for op in ops {
                seq += 1;
                let before = rec.clone();
                let at = Sequence::new(seq);
                let result = match op {
                    Op::Rotate(b) => rec.rotate(PublicMaterial::opaque(vec![b]), actor.clone(), at).map(|_| ()),
                    Op::Transfer(b) => rec.transfer_ownership(Identifier::new(format!("O{b}")), actor.clone(), at).map(|_| ()),
                    Op::Revoke => rec.revoke(actor.clone(), at).map(|_| ()),
                };
                match result {
                    Ok(()) => {
                        prop_assert_eq!(rec.version, before.version + 1);
                        prop_assert_eq!(
                            rec.transitions.len(),
                            (before.transitions.len() + 1).min(MAX_RETAINED_TRANSITIONS)
                        );
                        prop_assert_eq!(rec.transitions.last().map(|t| t.version), Some(rec.version));
                    }
                    Err(_) => {
                        prop_assert!(before.is_revoked());
                        prop_assert_eq!(&rec, &before);
                    }
                }
            }
            prop_assert_eq!(
                rec.transitions.len(),
                (rec.version as usize + 1).min(MAX_RETAINED_TRANSITIONS)
            );
        }
    }
}
