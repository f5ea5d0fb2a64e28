//! # signet-state: Signet Record Lifecycle
//!
//! Implements the per-record state machine:
//!
//! ```text
//!   ∅ ──register──▶ Active ──revoke──▶ Revoked (terminal)
//!                   │    ▲
//!                   └────┘ rotate / transfer_ownership (version + 1)
//! ```
//!
//! The record enforces status and version invariants only. Who may call a
//! transition is decided by the registry before the transition is applied.
//!
//! ## Invariants
//!
//! - `version` starts at 0 and increases by exactly 1 per transition.
//! - Once `Revoked`, neither material nor owner can change.
//! - A rejected transition leaves the record untouched.
//! - At most `MAX_RETAINED_TRANSITIONS` transitions are kept per record.

pub mod record;

pub use record::{
    RecordError, RecordMetadata, SignetRecord, SignetStatus, TransitionKind, TransitionRecord,
    MAX_RETAINED_TRANSITIONS,
};
