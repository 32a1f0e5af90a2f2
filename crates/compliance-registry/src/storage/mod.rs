//! Storage abstraction for compliance records
//!
//! This module provides a trait-based abstraction for record storage,
//! enabling both in-memory (default) and persistent (PostgreSQL) backends.
//!
//! Stores keep the signature and public key exactly as issued; revocation
//! only touches `status`, `revoked_at` and `updated_at`.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use compliance_core::{ComplianceStatus, SignatureRecord};
use std::fmt::Debug;
use uuid::Uuid;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Domain already exists: {0}")]
    AlreadyExists(String),

    #[error("Record already revoked: {0}")]
    AlreadyRevoked(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// A signed compliance record for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// Record identifier
    pub id: Uuid,
    /// Domain name, unique across the store
    pub domain_name: String,
    /// Live status
    pub status: ComplianceStatus,
    /// Compliance tier (e.g. "basic", "advanced")
    pub compliance_level: String,
    /// Issuance time covered by the signature
    pub issued_at: DateTime<Utc>,
    /// When the record was revoked, if it was
    pub revoked_at: Option<DateTime<Utc>>,
    /// Hex Ed25519 signature over the `active` issuance claim
    pub signature: String,
    /// Hex public key that produced `signature`
    pub public_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DomainRecord {
    /// Build a new active record around an issuance signature
    pub fn issue(
        domain_name: impl Into<String>,
        compliance_level: impl Into<String>,
        issued_at: DateTime<Utc>,
        signature: &SignatureRecord,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            domain_name: domain_name.into(),
            status: ComplianceStatus::Active,
            compliance_level: compliance_level.into(),
            issued_at,
            revoked_at: None,
            signature: signature.signature_hex(),
            public_key: signature.public_key_hex(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the stored signature matches the stored fields
    ///
    /// Always checks the `active` issuance claim, since revocation never
    /// re-signs; the live status is reported separately.
    pub fn signature_valid(&self) -> bool {
        compliance_core::verify(
            &self.domain_name,
            ComplianceStatus::Active,
            &self.compliance_level,
            self.issued_at,
            &self.signature,
            &self.public_key,
        )
    }
}

/// Storage backend trait for compliance records
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait DomainStore: Send + Sync + Debug {
    /// Insert a new record; fails with `AlreadyExists` on a duplicate domain
    async fn insert(&self, record: DomainRecord) -> Result<DomainRecord, StorageError>;

    /// Get a record by id
    async fn get(&self, id: Uuid) -> Result<Option<DomainRecord>, StorageError>;

    /// Get a record by domain name
    async fn find_by_domain(&self, domain_name: &str) -> Result<Option<DomainRecord>, StorageError>;

    /// Page through records, newest first; returns `(total, page)`
    async fn list(&self, skip: usize, limit: usize)
        -> Result<(usize, Vec<DomainRecord>), StorageError>;

    /// Mark a record revoked at `at`
    ///
    /// Fails with `NotFound` or `AlreadyRevoked`. Signature fields are left
    /// untouched.
    async fn revoke(&self, id: Uuid, at: DateTime<Utc>) -> Result<DomainRecord, StorageError>;

    /// Delete a record; returns whether it existed
    async fn delete(&self, id: Uuid) -> Result<bool, StorageError>;

    /// Number of stored records
    async fn count(&self) -> Result<usize, StorageError>;
}
