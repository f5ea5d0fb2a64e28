//! # Authorization
//!
//! One capability check, [`authorize`], guards every mutating operation.
//! It is a pure function of the operation, the caller, and an
//! [`AccessContext`]; it never touches registry state itself, so the
//! registry can call it under its write guard at a fixed point in the
//! precedence order.
//!
//! | Operation | Allowed callers |
//! |---|---|
//! | `Register` | anyone under `Open`, administrators under `AdministratorOnly` |
//! | `Rotate`, `TransferOwnership` | the record owner |
//! | `Revoke` | the record owner or any administrator |
//! | `AddAdministrator`, `RemoveAdministrator` | administrators |

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use signet_core::Identifier;
use signet_state::SignetRecord;

use crate::config::RegistrationPolicy;

/// A mutating registry operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Create a record.
    Register,
    /// Replace a record's material.
    Rotate,
    /// Replace a record's owner.
    TransferOwnership,
    /// Revoke a record.
    Revoke,
    /// Grow the administrator set.
    AddAdministrator,
    /// Shrink the administrator set.
    RemoveAdministrator,
}

impl Operation {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Rotate => "rotate",
            Self::TransferOwnership => "transfer_ownership",
            Self::Revoke => "revoke",
            Self::AddAdministrator => "add_administrator",
            Self::RemoveAdministrator => "remove_administrator",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of privileged principals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdministratorSet(BTreeSet<Identifier>);

impl AdministratorSet {
    /// A set holding a single administrator.
    pub fn with_initial(admin: Identifier) -> Self {
        let mut set = BTreeSet::new();
        set.insert(admin);
        Self(set)
    }

    /// Whether `id` is an administrator.
    pub fn contains(&self, id: &Identifier) -> bool {
        self.0.contains(id)
    }

    /// Number of administrators.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty. Never true for a live registry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Administrators in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, id: Identifier) -> bool {
        self.0.insert(id)
    }

    pub(crate) fn remove(&mut self, id: &Identifier) -> bool {
        self.0.remove(id)
    }
}

/// Everything [`authorize`] is allowed to look at.
#[derive(Debug, Clone, Copy)]
pub struct AccessContext<'a> {
    /// Construction-time registration policy.
    pub policy: RegistrationPolicy,
    /// Current administrator set.
    pub administrators: &'a AdministratorSet,
    /// Target record, for record-scoped operations.
    pub record: Option<&'a SignetRecord>,
}

/// Decide whether `caller` may perform `operation`.
///
/// Record-scoped operations without a record in the context are denied.
pub fn authorize(operation: Operation, caller: &Identifier, ctx: &AccessContext<'_>) -> bool {
    let is_admin = ctx.administrators.contains(caller);
    let is_owner = ctx.record.is_some_and(|r| &r.owner == caller);
    match operation {
        Operation::Register => match ctx.policy {
            RegistrationPolicy::Open => true,
            RegistrationPolicy::AdministratorOnly => is_admin,
        },
        Operation::Rotate | Operation::TransferOwnership => is_owner,
        Operation::Revoke => is_owner || (ctx.record.is_some() && is_admin),
        Operation::AddAdministrator | Operation::RemoveAdministrator => is_admin,
    }
}
