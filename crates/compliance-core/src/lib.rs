//! # Compliance Core
//!
//! Canonical claims and Ed25519 primitives for signed domain compliance
//! records.
//!
//! ## Key Concepts
//!
//! - **Compliance claim**: `(domain_name, status, compliance_level, issued_at)`,
//!   the tuple a signature attests to
//! - **Canonical payload**: the deterministic bytes a claim serializes to; the
//!   exact input to both signing and verification
//! - **Signature record**: 64-byte signature plus the 32-byte public key that
//!   made it, stored hex-encoded with each record
//!
//! ## Issuance Convention
//!
//! Claims are always signed with `status = active`. A signature proves
//! issuance, not current state: revoking a record never re-signs it, and
//! verifiers rebuild the `active` claim regardless of the live status.

pub mod canonical;
pub mod crypto;
pub mod error;
pub mod types;
pub mod verify;

pub use canonical::canonicalize;
pub use crypto::{KeyPair, PublicKey, SignatureRecord};
pub use error::{ComplianceError, Result};
pub use types::{ComplianceClaim, ComplianceStatus, IssuedAt};
pub use verify::verify;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
