//! # Logical Time
//!
//! The registry orders everything with a monotonic counter rather than a
//! clock. `created_at` and `updated_at` on records and the position of each event
//! in the notification journal are [`Sequence`] values.
//!
//! The clock is advanced in two steps so an operation can reserve the next
//! value, validate, and only then commit. A failed operation never consumes
//! a sequence number, which keeps the journal gap-free.

use serde::{Deserialize, Serialize};

use crate::error::SequenceError;

/// A position in the registry's logical timeline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sequence(u64);

impl Sequence {
    /// The position before any mutation has been committed.
    pub const GENESIS: Self = Self(0);

    /// Wrap a raw sequence value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw sequence value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A monotonic counter handing out strictly increasing [`Sequence`] values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalClock {
    current: Sequence,
}

impl LogicalClock {
    /// A clock positioned at [`Sequence::GENESIS`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The last committed sequence.
    pub fn now(&self) -> Sequence {
        self.current
    }

    /// The value the next commit will take, without consuming it.
    pub fn peek_next(&self) -> Result<Sequence, SequenceError> {
        self.current
            .0
            .checked_add(1)
            .map(Sequence)
            .ok_or(SequenceError { at: self.current.0 })
    }

    /// Commit a value previously returned by [`peek_next`](Self::peek_next).
    ///
    /// Values that would not move the clock forward are ignored.
    pub fn commit(&mut self, seq: Sequence) {
        if seq > self.current {
            self.current = seq;
        }
    }

    /// Reserve and commit the next value in one step.
    pub fn tick(&mut self) -> Result<Sequence, SequenceError> {
        let next = self.peek_next()?;
        self.current = next;
        Ok(next)
    }
}
