//! # Identity Newtypes
//!
//! Two identifier namespaces exist in the registry:
//!
//! - [`SubjectId`]: the unique key a signet is registered under (an address,
//!   a public-key hash, a perceptual content hash). Validated non-empty.
//! - [`Identifier`]: a principal. Owners, callers, and administrators are
//!   all `Identifier`s. It may be the null identifier, which is never a
//!   valid owner or administrator but can still show up as a caller.
//!
//! Type-level distinction prevents substituting a subject for a principal.

use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;

/// Maximum encoded length of a subject identifier in bytes.
pub const MAX_SUBJECT_LEN: usize = 512;

/// A principal: owner, caller, or administrator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap a principal identifier. No normalization is applied.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The null identifier.
    pub fn null() -> Self {
        Self(String::new())
    }

    /// Whether this is the null/zero identifier.
    ///
    /// Null means: empty or whitespace, or (after an optional `0x` prefix)
    /// made up entirely of `0` digits, as in the zero address
    /// `0x0000000000000000000000000000000000000000`.
    pub fn is_null(&self) -> bool {
        let s = self.0.trim();
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        body.is_empty() || body.chars().all(|c| c == '0')
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The unique key of a signet record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);

impl SubjectId {
    /// Validate and wrap a subject identifier.
    ///
    /// # Errors
    ///
    /// - `EmptySubject` if the string is empty or only whitespace.
    /// - `SubjectTooLong` if it exceeds [`MAX_SUBJECT_LEN`] bytes.
    pub fn new(id: impl Into<String>) -> Result<Self, IdentifierError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(IdentifierError::EmptySubject);
        }
        if id.len() > MAX_SUBJECT_LEN {
            return Err(IdentifierError::SubjectTooLong {
                len: id.len(),
                max: MAX_SUBJECT_LEN,
            });
        }
        Ok(Self(id))
    }

    /// Access the subject string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SubjectId {
    type Error = IdentifierError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<SubjectId> for String {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
