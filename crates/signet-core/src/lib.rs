//! # signet-core: Foundational Types for the Signet Registry
//!
//! This crate is the leaf of the workspace DAG. It defines the primitives
//! every other crate builds on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `SubjectId` (the registry key)
//!    and `Identifier` (owners, callers, administrators) are distinct types.
//!    You cannot pass a caller where a subject is expected.
//!
//! 2. **Logical time only.** Records and events are ordered by `Sequence`
//!    values handed out by a `LogicalClock`. There is no wall-clock in the
//!    registry because the deployment environment has no trusted clock.
//!
//! 3. **`CanonicalBytes` newtype.** Every digest and every signed message
//!    flows through `CanonicalBytes::new()` (RFC 8785 JCS, floats rejected).
//!
//! 4. **`sha256_digest()` accepts only `&CanonicalBytes`.** Record digests
//!    and deployment addresses cannot be computed over ad-hoc bytes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `signet-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod sequence;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, CryptoError, IdentifierError, SequenceError};
pub use identity::{Identifier, SubjectId};
pub use sequence::{LogicalClock, Sequence};
