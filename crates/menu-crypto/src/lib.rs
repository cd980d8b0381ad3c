//! Hashing primitives for the menu ledger.
//!
//! Provides the canonical JSON serialization used for snapshot payloads,
//! SHA-256 content digests over those bytes, and a verifier for the
//! per-organization snapshot version chain.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod canonical;
pub mod chain;
pub mod hasher;

pub use canonical::{to_canonical_bytes, to_canonical_string, CanonicalError};
pub use chain::{ChainError, ChainLink, VersionChainVerifier};
pub use hasher::{ContentDigest, ContentHasher, DigestError};
