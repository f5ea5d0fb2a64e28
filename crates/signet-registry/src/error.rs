//! # Registry Errors
//!
//! Every rejected operation returns exactly one `RegistryError`. When a
//! call violates several preconditions, the first one in this order wins:
//!
//! 1. existence (`NotFound`, `AlreadyRegistered`)
//! 2. status (`Revoked`, `AlreadyRevoked`)
//! 3. authorization (`Unauthorized`)
//! 4. argument validity (`InvalidOwner`, `OwnerLimitReached`, `InvalidMaterial`,
//!    `InvalidAdministrator`, `AlreadyAdministrator`, `NotAdministrator`,
//!    `LastAdministrator`)
//!
//! Administrator operations have no record, so authorization comes first
//! for them and the membership checks follow as argument validity.
//!
//! No error leaves partial state behind.

use thiserror::Error;

use signet_core::{CanonicalizationError, Identifier, SequenceError, SubjectId};
use signet_crypto::{MaterialError, MaterialKind};
use signet_state::RecordError;

use crate::auth::Operation;

/// Errors returned by [`SignetRegistry`](crate::SignetRegistry) operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No record exists for the subject.
    #[error("no signet registered for subject {subject}")]
    NotFound {
        /// The requested subject.
        subject: SubjectId,
    },

    /// A record already exists for the subject, active or revoked.
    #[error("subject {subject} is already registered")]
    AlreadyRegistered {
        /// The conflicting subject.
        subject: SubjectId,
    },

    /// Revocation of a record that is already revoked.
    #[error("signet {subject} is already revoked")]
    AlreadyRevoked {
        /// The revoked subject.
        subject: SubjectId,
    },

    /// Mutation of a revoked record.
    #[error("signet {subject} is revoked")]
    Revoked {
        /// The revoked subject.
        subject: SubjectId,
    },

    /// The caller may not perform the operation.
    #[error("{caller} is not authorized to {operation}")]
    Unauthorized {
        /// The attempted operation.
        operation: Operation,
        /// The rejected caller.
        caller: Identifier,
    },

    /// The proposed owner is the null identifier.
    #[error("invalid owner {owner:?}: the null identifier cannot own a signet")]
    InvalidOwner {
        /// The rejected owner.
        owner: Identifier,
    },

    /// The owner already holds the configured maximum of active signets.
    #[error("{owner} already holds {limit} active signets")]
    OwnerLimitReached {
        /// The proposed owner.
        owner: Identifier,
        /// Configured per-owner cap.
        limit: usize,
    },

    /// Removing the administrator would leave the set empty.
    #[error("cannot remove {administrator}: it is the last administrator")]
    LastAdministrator {
        /// The sole remaining administrator.
        administrator: Identifier,
    },

    /// The proposed administrator is the null identifier.
    #[error("invalid administrator {administrator:?}")]
    InvalidAdministrator {
        /// The rejected identifier.
        administrator: Identifier,
    },

    /// The identifier is already an administrator.
    #[error("{administrator} is already an administrator")]
    AlreadyAdministrator {
        /// The duplicate identifier.
        administrator: Identifier,
    },

    /// The identifier is not an administrator.
    #[error("{administrator} is not an administrator")]
    NotAdministrator {
        /// The unknown identifier.
        administrator: Identifier,
    },

    /// Material failed validation.
    #[error("invalid material: {0}")]
    InvalidMaterial(#[from] MaterialError),

    /// The bound material is not of the kind the query needs.
    #[error("signet {subject} is bound to {actual} material, expected {expected}")]
    MaterialMismatch {
        /// The queried subject.
        subject: SubjectId,
        /// Kind required by the query.
        expected: MaterialKind,
        /// Kind actually bound.
        actual: MaterialKind,
    },

    /// Signature did not verify against the bound key.
    #[error("signature does not verify for {subject}: {reason}")]
    SignatureInvalid {
        /// The queried subject.
        subject: SubjectId,
        /// Verifier detail.
        reason: String,
    },

    /// A value could not be canonicalized for hashing or verification.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// The registry's logical clock cannot advance.
    #[error(transparent)]
    SequenceExhausted(#[from] SequenceError),

    /// A record's version counter cannot advance.
    #[error("signet {subject} version counter exhausted")]
    VersionExhausted {
        /// The affected subject.
        subject: SubjectId,
    },
}

impl RegistryError {
    /// Stable machine-readable name of the variant, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AlreadyRegistered { .. } => "already_registered",
            Self::AlreadyRevoked { .. } => "already_revoked",
            Self::Revoked { .. } => "revoked",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidOwner { .. } => "invalid_owner",
            Self::OwnerLimitReached { .. } => "owner_limit_reached",
            Self::LastAdministrator { .. } => "last_administrator",
            Self::InvalidAdministrator { .. } => "invalid_administrator",
            Self::AlreadyAdministrator { .. } => "already_administrator",
            Self::NotAdministrator { .. } => "not_administrator",
            Self::InvalidMaterial(_) => "invalid_material",
            Self::MaterialMismatch { .. } => "material_mismatch",
            Self::SignatureInvalid { .. } => "signature_invalid",
            Self::Canonicalization(_) => "canonicalization",
            Self::SequenceExhausted(_) => "sequence_exhausted",
            Self::VersionExhausted { .. } => "version_exhausted",
        }
    }
}

impl From<RecordError> for RegistryError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Revoked { subject } => Self::Revoked { subject },
            RecordError::AlreadyRevoked { subject } => Self::AlreadyRevoked { subject },
            RecordError::VersionExhausted { subject } => Self::VersionExhausted { subject },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_errors_map_one_to_one() {
        let s = SubjectId::new("S1").unwrap();
        let e: RegistryError = RecordError::Revoked { subject: s.clone() }.into();
        assert_eq!(e.code(), "revoked");
        let e: RegistryError = RecordError::AlreadyRevoked { subject: s.clone() }.into();
        assert_eq!(e.code(), "already_revoked");
        let e: RegistryError = RecordError::VersionExhausted { subject: s }.into();
        assert_eq!(e.code(), "version_exhausted");
    }

    #[test]
    fn unauthorized_message_names_operation_and_caller() {
        let e = RegistryError::Unauthorized {
            operation: Operation::Rotate,
            caller: Identifier::new("mallory"),
        };
        assert_eq!(e.to_string(), "mallory is not authorized to rotate");
    }

    #[test]
    fn material_errors_convert() {
        let e: RegistryError = MaterialError::Empty.into();
        assert_eq!(e.code(), "invalid_material");
        assert!(e.to_string().contains("must not be empty"));
    }
}
