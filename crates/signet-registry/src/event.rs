//! # Notifications
//!
//! Every committed mutation appends exactly one [`EventEnvelope`] to the
//! registry's [`EventJournal`] and returns the same envelope in the
//! operation's receipt. Observers tail the journal with a cursor; the core
//! never interprets events after emitting them.
//!
//! Envelope sequences are the registry's logical clock values, so they are
//! strictly increasing and gap-free in commit order.

use serde::{Deserialize, Serialize};

use signet_core::{Identifier, Sequence, SubjectId};

/// A typed registry notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A record was created.
    Registered {
        /// New subject.
        subject: SubjectId,
        /// Its owner.
        owner: Identifier,
        /// Always 0.
        version: u64,
    },
    /// A record's material was replaced.
    Rotated {
        /// Rotated subject.
        subject: SubjectId,
        /// Version after rotation.
        version: u64,
    },
    /// A record changed hands.
    OwnershipTransferred {
        /// Transferred subject.
        subject: SubjectId,
        /// Owner before.
        old_owner: Identifier,
        /// Owner after.
        new_owner: Identifier,
        /// Version after transfer.
        version: u64,
    },
    /// A record was revoked.
    Revoked {
        /// Revoked subject.
        subject: SubjectId,
        /// Version after revocation.
        version: u64,
    },
    /// An administrator joined.
    AdministratorAdded {
        /// The new administrator.
        administrator: Identifier,
        /// Administrator-set version after the change.
        version: u64,
    },
    /// An administrator left.
    AdministratorRemoved {
        /// The removed administrator.
        administrator: Identifier,
        /// Administrator-set version after the change.
        version: u64,
    },
}

impl RegistryEvent {
    /// Resulting version carried by the event.
    pub fn version(&self) -> u64 {
        match self {
            Self::Registered { version, .. }
            | Self::Rotated { version, .. }
            | Self::OwnershipTransferred { version, .. }
            | Self::Revoked { version, .. }
            | Self::AdministratorAdded { version, .. }
            | Self::AdministratorRemoved { version, .. } => *version,
        }
    }

    /// Subject of record events; `None` for administrator events.
    pub fn subject(&self) -> Option<&SubjectId> {
        match self {
            Self::Registered { subject, .. }
            | Self::Rotated { subject, .. }
            | Self::OwnershipTransferred { subject, .. }
            | Self::Revoked { subject, .. } => Some(subject),
            Self::AdministratorAdded { .. } | Self::AdministratorRemoved { .. } => None,
        }
    }

    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "registered",
            Self::Rotated { .. } => "rotated",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::Revoked { .. } => "revoked",
            Self::AdministratorAdded { .. } => "administrator_added",
            Self::AdministratorRemoved { .. } => "administrator_removed",
        }
    }
}

/// An event plus its position in the journal and the caller that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Journal position.
    pub sequence: Sequence,
    /// Authorized caller of the originating operation.
    pub caller: Identifier,
    /// The event itself.
    #[serde(flatten)]
    pub event: RegistryEvent,
}

/// Append-only, ordered list of committed events.
#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    entries: Vec<EventEnvelope>,
}

impl EventJournal {
    /// An empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an envelope. Sequences must arrive in increasing order.
    pub(crate) fn append(&mut self, envelope: EventEnvelope) {
        debug_assert!(self
            .entries
            .last()
            .map_or(true, |last| last.sequence < envelope.sequence));
        self.entries.push(envelope);
    }

    /// Envelopes with `sequence > cursor`, oldest first.
    pub fn since(&self, cursor: Sequence) -> Vec<EventEnvelope> {
        let start = self.entries.partition_point(|e| e.sequence <= cursor);
        self.entries[start..].to_vec()
    }

    /// All envelopes, oldest first.
    pub fn entries(&self) -> &[EventEnvelope] {
        &self.entries
    }

    /// Sequence of the newest envelope.
    pub fn last_sequence(&self) -> Option<Sequence> {
        self.entries.last().map(|e| e.sequence)
    }

    /// Number of envelopes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been committed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
