//! # SignetRegistry
//!
//! The authoritative subject → signet mapping.
//!
//! ## Concurrency
//!
//! All state sits behind one `parking_lot::RwLock`. A mutation takes the
//! write guard, runs every precondition check, reserves the next logical
//! sequence, applies the change, appends the event, and only then releases
//! the guard. Concurrent mutations therefore serialize, and the later one
//! always observes the earlier one's effect. Reads take the read guard just
//! long enough to clone a snapshot.
//!
//! `parking_lot` locks do not poison, and no guard is ever held across a
//! call into caller-supplied code.
//!
//! ## Receipts
//!
//! Mutations return a [`Receipt`]: the resulting value plus the exact
//! events the operation appended. The same events are visible to observers
//! through [`SignetRegistry::events_since`].

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use signet_core::{
    sha256_digest, CanonicalBytes, ContentDigest, Identifier, LogicalClock, Sequence,
    SequenceError, SubjectId,
};
use signet_crypto::PublicMaterial;
use signet_state::{RecordMetadata, SignetRecord};

use crate::auth::{authorize, AccessContext, AdministratorSet, Operation};
use crate::config::{ConfigError, RegistrationPolicy, RegistryConfig};
use crate::error::RegistryError;
use crate::event::{EventEnvelope, EventJournal, RegistryEvent};

/// Result of a committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt<T> {
    /// The operation's value.
    pub value: T,
    /// Events appended by this operation, in order.
    pub events: Vec<EventEnvelope>,
}

#[derive(Debug)]
struct RegistryState {
    records: HashMap<SubjectId, SignetRecord>,
    /// Active record count per owner; owners at zero have no entry.
    active_by_owner: HashMap<Identifier, usize>,
    administrators: AdministratorSet,
    admin_epoch: u64,
    clock: LogicalClock,
    journal: EventJournal,
}

/// The signet registry.
///
/// Share it between threads with `Arc<SignetRegistry>`; every method takes
/// `&self`.
#[derive(Debug)]
pub struct SignetRegistry {
    config: RegistryConfig,
    state: RwLock<RegistryState>,
}

impl SignetRegistry {
    /// Construct a registry with default limits.
    ///
    /// # Errors
    ///
    /// `ConfigError::NullAdministrator` if the initial administrator is null.
    pub fn new(
        initial_administrator: Identifier,
        registration_policy: RegistrationPolicy,
    ) -> Result<Self, ConfigError> {
        Self::with_config(RegistryConfig::new(initial_administrator, registration_policy))
    }

    /// Construct a registry from a full configuration.
    pub fn with_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::info!(
            initial_administrator = %config.initial_administrator,
            policy = %config.registration_policy,
            fingerprint_threshold = config.fingerprint_match_threshold,
            "signet registry constructed"
        );
        let state = RegistryState {
            records: HashMap::new(),
            active_by_owner: HashMap::new(),
            administrators: AdministratorSet::with_initial(config.initial_administrator.clone()),
            admin_epoch: 0,
            clock: LogicalClock::new(),
            journal: EventJournal::new(),
        };
        Ok(Self {
            config,
            state: RwLock::new(state),
        })
    }

    /// The construction-time configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The registration policy.
    pub fn policy(&self) -> RegistrationPolicy {
        self.config.registration_policy
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Register a new signet.
    ///
    /// Fails with `AlreadyRegistered` if the subject exists in any status,
    /// `Unauthorized` if the policy excludes the caller, `InvalidOwner` for
    /// a null owner, and `InvalidMaterial` for unacceptable material.
    pub fn register(
        &self,
        subject: SubjectId,
        owner: Identifier,
        public_material: PublicMaterial,
        caller: &Identifier,
    ) -> Result<Receipt<SignetRecord>, RegistryError> {
        self.register_with_metadata(subject, owner, public_material, None, caller)
    }

    /// Register a new signet with descriptive metadata.
    pub fn register_with_metadata(
        &self,
        subject: SubjectId,
        owner: Identifier,
        public_material: PublicMaterial,
        metadata: Option<RecordMetadata>,
        caller: &Identifier,
    ) -> Result<Receipt<SignetRecord>, RegistryError> {
        let target = subject.to_string();
        let result = self.state.write().register(
            &self.config,
            subject,
            owner,
            public_material,
            metadata,
            caller,
        );
        trace_outcome(Operation::Register, &target, caller, &result);
        result
    }

    /// Replace the material bound to `subject`.
    ///
    /// Precedence: `NotFound`, `Revoked`, `Unauthorized`, `InvalidMaterial`.
    pub fn rotate(
        &self,
        subject: &SubjectId,
        new_public_material: PublicMaterial,
        caller: &Identifier,
    ) -> Result<Receipt<SignetRecord>, RegistryError> {
        let result = self
            .state
            .write()
            .rotate(&self.config, subject, new_public_material, caller);
        trace_outcome(Operation::Rotate, subject.as_str(), caller, &result);
        result
    }

    /// Hand `subject` to `new_owner`.
    ///
    /// Precedence: `NotFound`, `Revoked`, `Unauthorized`, `InvalidOwner`.
    pub fn transfer_ownership(
        &self,
        subject: &SubjectId,
        new_owner: Identifier,
        caller: &Identifier,
    ) -> Result<Receipt<SignetRecord>, RegistryError> {
        let result = self
            .state
            .write()
            .transfer_ownership(&self.config, subject, new_owner, caller);
        trace_outcome(Operation::TransferOwnership, subject.as_str(), caller, &result);
        result
    }

    /// Revoke `subject` permanently. Owner or any administrator may revoke.
    ///
    /// Precedence: `NotFound`, `AlreadyRevoked`, `Unauthorized`.
    pub fn revoke(
        &self,
        subject: &SubjectId,
        caller: &Identifier,
    ) -> Result<Receipt<SignetRecord>, RegistryError> {
        let result = self.state.write().revoke(&self.config, subject, caller);
        trace_outcome(Operation::Revoke, subject.as_str(), caller, &result);
        result
    }

    /// Add an administrator. Returns the administrator-set version.
    pub fn add_administrator(
        &self,
        administrator: Identifier,
        caller: &Identifier,
    ) -> Result<Receipt<u64>, RegistryError> {
        let target = administrator.to_string();
        let result = self
            .state
            .write()
            .add_administrator(&self.config, administrator, caller);
        trace_outcome(Operation::AddAdministrator, &target, caller, &result);
        result
    }

    /// Remove an administrator. The last one cannot be removed.
    pub fn remove_administrator(
        &self,
        administrator: &Identifier,
        caller: &Identifier,
    ) -> Result<Receipt<u64>, RegistryError> {
        let result = self
            .state
            .write()
            .remove_administrator(&self.config, administrator, caller);
        trace_outcome(Operation::RemoveAdministrator, administrator.as_str(), caller, &result);
        result
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Latest committed record for `subject`.
    pub fn lookup(&self, subject: &SubjectId) -> Result<SignetRecord, RegistryError> {
        let record = self.state.read().records.get(subject).cloned();
        tracing::debug!(subject = %subject, found = record.is_some(), "lookup");
        record.ok_or_else(|| RegistryError::NotFound {
            subject: subject.clone(),
        })
    }

    /// Lookup together with the digest of the returned snapshot.
    pub fn lookup_with_digest(
        &self,
        subject: &SubjectId,
    ) -> Result<(SignetRecord, ContentDigest), RegistryError> {
        let record = self.lookup(subject)?;
        let digest = record_digest(&record)?;
        Ok((record, digest))
    }

    /// SHA-256 digest of the canonical encoding of the current record.
    pub fn record_digest(&self, subject: &SubjectId) -> Result<ContentDigest, RegistryError> {
        self.lookup_with_digest(subject).map(|(_, d)| d)
    }

    /// Whether `id` is currently an administrator.
    pub fn is_administrator(&self, id: &Identifier) -> bool {
        self.state.read().administrators.contains(id)
    }

    /// Snapshot of the administrator set, sorted.
    pub fn administrators(&self) -> Vec<Identifier> {
        self.state.read().administrators.iter().cloned().collect()
    }

    /// Version of the administrator set; 0 at construction.
    pub fn administrator_version(&self) -> u64 {
        self.state.read().admin_epoch
    }

    /// Every registered subject, sorted.
    pub fn subjects(&self) -> Vec<SubjectId> {
        let mut subjects: Vec<SubjectId> = self.state.read().records.keys().cloned().collect();
        subjects.sort();
        subjects
    }

    /// Number of registered records, revoked included.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence of the latest committed mutation.
    pub fn head(&self) -> Sequence {
        self.state.read().clock.now()
    }

    /// Journal envelopes with `sequence > cursor`, oldest first.
    pub fn events_since(&self, cursor: Sequence) -> Vec<EventEnvelope> {
        self.state.read().journal.since(cursor)
    }

    /// Every journal envelope, oldest first.
    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events_since(Sequence::GENESIS)
    }

    /// Run `f` against the record map under the read guard.
    pub(crate) fn with_records<R>(&self, f: impl FnOnce(&HashMap<SubjectId, SignetRecord>) -> R) -> R {
        f(&self.state.read().records)
    }
}

/// SHA-256 digest of a record's canonical encoding.
pub fn record_digest(record: &SignetRecord) -> Result<ContentDigest, RegistryError> {
    let canonical = CanonicalBytes::new(record)?;
    Ok(sha256_digest(&canonical))
}

fn trace_outcome<T>(
    operation: Operation,
    target: &str,
    caller: &Identifier,
    result: &Result<Receipt<T>, RegistryError>,
) {
    match result {
        Ok(receipt) => {
            let sequence = receipt.events.last().map(|e| e.sequence.value());
            tracing::info!(%operation, subject = target, %caller, ?sequence, "signet registry mutation committed");
        }
        Err(e) => {
            tracing::warn!(%operation, subject = target, %caller, code = e.code(), error = %e, "signet registry mutation rejected");
        }
    }
}

impl RegistryState {
    fn context<'a>(
        &'a self,
        config: &RegistryConfig,
        record: Option<&'a SignetRecord>,
    ) -> AccessContext<'a> {
        AccessContext {
            policy: config.registration_policy,
            administrators: &self.administrators,
            record,
        }
    }

    fn require_authorized(
        &self,
        config: &RegistryConfig,
        operation: Operation,
        caller: &Identifier,
        record: Option<&SignetRecord>,
    ) -> Result<(), RegistryError> {
        if authorize(operation, caller, &self.context(config, record)) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized {
                operation,
                caller: caller.clone(),
            })
        }
    }

    fn existing(&self, subject: &SubjectId) -> Result<&SignetRecord, RegistryError> {
        self.records.get(subject).ok_or_else(|| RegistryError::NotFound {
            subject: subject.clone(),
        })
    }

    fn active_held(&self, owner: &Identifier) -> usize {
        self.active_by_owner.get(owner).copied().unwrap_or(0)
    }

    /// Fail with `OwnerLimitReached` if `owner` already holds the configured
    /// maximum of active signets. `already_held` is set when the record being
    /// moved belongs to `owner` and so is counted already.
    fn check_owner_limit(
        &self,
        config: &RegistryConfig,
        owner: &Identifier,
        already_held: bool,
    ) -> Result<(), RegistryError> {
        let Some(limit) = config.max_signets_per_owner else {
            return Ok(());
        };
        let held = self.active_held(owner).saturating_sub(usize::from(already_held));
        if held >= limit {
            return Err(RegistryError::OwnerLimitReached {
                owner: owner.clone(),
                limit,
            });
        }
        Ok(())
    }

    fn count_active(&mut self, owner: &Identifier) {
        *self.active_by_owner.entry(owner.clone()).or_insert(0) += 1;
    }

    fn uncount_active(&mut self, owner: &Identifier) {
        if let Some(held) = self.active_by_owner.get_mut(owner) {
            *held = held.saturating_sub(1);
            if *held == 0 {
                self.active_by_owner.remove(owner);
            }
        }
    }

    /// Append the event at `seq` and advance the clock.
    fn emit(&mut self, seq: Sequence, caller: &Identifier, event: RegistryEvent) -> EventEnvelope {
        self.clock.commit(seq);
        let envelope = EventEnvelope {
            sequence: seq,
            caller: caller.clone(),
            event,
        };
        self.journal.append(envelope.clone());
        envelope
    }

    fn register(
        &mut self,
        config: &RegistryConfig,
        subject: SubjectId,
        owner: Identifier,
        material: PublicMaterial,
        metadata: Option<RecordMetadata>,
        caller: &Identifier,
    ) -> Result<Receipt<SignetRecord>, RegistryError> {
        if self.records.contains_key(&subject) {
            return Err(RegistryError::AlreadyRegistered { subject });
        }
        self.require_authorized(config, Operation::Register, caller, None)?;
        if owner.is_null() {
            return Err(RegistryError::InvalidOwner { owner });
        }
        self.check_owner_limit(config, &owner, false)?;
        material.validate(config.max_material_bytes)?;
        let seq = self.clock.peek_next()?;

        let record = SignetRecord::register(
            subject.clone(),
            owner.clone(),
            material,
            metadata,
            caller.clone(),
            seq,
        );
        self.records.insert(subject.clone(), record.clone());
        self.count_active(&owner);
        let envelope = self.emit(
            seq,
            caller,
            RegistryEvent::Registered {
                subject,
                owner,
                version: record.version,
            },
        );
        Ok(Receipt {
            value: record,
            events: vec![envelope],
        })
    }

    fn rotate(
        &mut self,
        config: &RegistryConfig,
        subject: &SubjectId,
        material: PublicMaterial,
        caller: &Identifier,
    ) -> Result<Receipt<SignetRecord>, RegistryError> {
        let current = self.existing(subject)?;
        current.ensure_mutable()?;
        self.require_authorized(config, Operation::Rotate, caller, Some(current))?;
        material.validate(config.max_material_bytes)?;
        let seq = self.clock.peek_next()?;

        let record = self
            .records
            .get_mut(subject)
            .ok_or_else(|| RegistryError::NotFound {
                subject: subject.clone(),
            })?;
        let version = record.rotate(material, caller.clone(), seq)?;
        let snapshot = record.clone();
        let envelope = self.emit(
            seq,
            caller,
            RegistryEvent::Rotated {
                subject: subject.clone(),
                version,
            },
        );
        Ok(Receipt {
            value: snapshot,
            events: vec![envelope],
        })
    }

    fn transfer_ownership(
        &mut self,
        config: &RegistryConfig,
        subject: &SubjectId,
        new_owner: Identifier,
        caller: &Identifier,
    ) -> Result<Receipt<SignetRecord>, RegistryError> {
        let current = self.existing(subject)?;
        current.ensure_mutable()?;
        self.require_authorized(config, Operation::TransferOwnership, caller, Some(current))?;
        if new_owner.is_null() {
            return Err(RegistryError::InvalidOwner { owner: new_owner });
        }
        self.check_owner_limit(config, &new_owner, current.owner == new_owner)?;
        let seq = self.clock.peek_next()?;

        let record = self
            .records
            .get_mut(subject)
            .ok_or_else(|| RegistryError::NotFound {
                subject: subject.clone(),
            })?;
        let old_owner = record.transfer_ownership(new_owner.clone(), caller.clone(), seq)?;
        let snapshot = record.clone();
        self.uncount_active(&old_owner);
        self.count_active(&new_owner);
        let envelope = self.emit(
            seq,
            caller,
            RegistryEvent::OwnershipTransferred {
                subject: subject.clone(),
                old_owner,
                new_owner,
                version: snapshot.version,
            },
        );
        Ok(Receipt {
            value: snapshot,
            events: vec![envelope],
        })
    }

    fn revoke(
        &mut self,
        config: &RegistryConfig,
        subject: &SubjectId,
        caller: &Identifier,
    ) -> Result<Receipt<SignetRecord>, RegistryError> {
        let current = self.existing(subject)?;
        current.ensure_revocable()?;
        self.require_authorized(config, Operation::Revoke, caller, Some(current))?;
        let seq = self.clock.peek_next()?;

        let record = self
            .records
            .get_mut(subject)
            .ok_or_else(|| RegistryError::NotFound {
                subject: subject.clone(),
            })?;
        let version = record.revoke(caller.clone(), seq)?;
        let snapshot = record.clone();
        self.uncount_active(&snapshot.owner);
        let envelope = self.emit(
            seq,
            caller,
            RegistryEvent::Revoked {
                subject: subject.clone(),
                version,
            },
        );
        Ok(Receipt {
            value: snapshot,
            events: vec![envelope],
        })
    }

    fn next_admin_epoch(&self) -> Result<u64, RegistryError> {
        self.admin_epoch
            .checked_add(1)
            .ok_or(RegistryError::SequenceExhausted(SequenceError {
                at: self.admin_epoch,
            }))
    }

    fn add_administrator(
        &mut self,
        config: &RegistryConfig,
        administrator: Identifier,
        caller: &Identifier,
    ) -> Result<Receipt<u64>, RegistryError> {
        self.require_authorized(config, Operation::AddAdministrator, caller, None)?;
        if administrator.is_null() {
            return Err(RegistryError::InvalidAdministrator { administrator });
        }
        if self.administrators.contains(&administrator) {
            return Err(RegistryError::AlreadyAdministrator { administrator });
        }
        let epoch = self.next_admin_epoch()?;
        let seq = self.clock.peek_next()?;

        self.administrators.insert(administrator.clone());
        self.admin_epoch = epoch;
        let envelope = self.emit(
            seq,
            caller,
            RegistryEvent::AdministratorAdded {
                administrator,
                version: epoch,
            },
        );
        Ok(Receipt {
            value: epoch,
            events: vec![envelope],
        })
    }

    fn remove_administrator(
        &mut self,
        config: &RegistryConfig,
        administrator: &Identifier,
        caller: &Identifier,
    ) -> Result<Receipt<u64>, RegistryError> {
        self.require_authorized(config, Operation::RemoveAdministrator, caller, None)?;
        if !self.administrators.contains(administrator) {
            return Err(RegistryError::NotAdministrator {
                administrator: administrator.clone(),
            });
        }
        if self.administrators.len() == 1 {
            return Err(RegistryError::LastAdministrator {
                administrator: administrator.clone(),
            });
        }
        let epoch = self.next_admin_epoch()?;
        let seq = self.clock.peek_next()?;

        self.administrators.remove(administrator);
        self.admin_epoch = epoch;
        let envelope = self.emit(
            seq,
            caller,
            RegistryEvent::AdministratorRemoved {
                administrator: administrator.clone(),
                version: epoch,
            },
        );
        Ok(Receipt {
            value: epoch,
            events: vec![envelope],
        })
    }
}
