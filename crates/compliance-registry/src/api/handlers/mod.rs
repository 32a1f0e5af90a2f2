//! API request handlers

pub mod admin;
pub mod public;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::keys::{KeyManager, Signer};
use crate::storage::{DomainRecord, DomainStore};

pub use admin::{
    create_domain, delete_domain, list_domains, require_admin_key, revoke_domain,
    CreateDomainRequest, DomainListResponse, ListQuery,
};
pub use public::{verify_domain, VerifyQuery, VerifyResponse};

/// Application state shared across handlers
#[derive(Debug)]
pub struct AppState {
    /// Issuer key, initialized before the listener starts
    pub keys: Arc<KeyManager>,
    /// Signs issuance claims with `keys`
    pub signer: Signer,
    /// Record storage
    pub store: Arc<dyn DomainStore>,
    pub config: RegistryConfig,
}

impl AppState {
    pub fn new(config: RegistryConfig, keys: Arc<KeyManager>, store: Arc<dyn DomainStore>) -> Self {
        Self {
            signer: Signer::new(Arc::clone(&keys)),
            keys,
            store,
            config,
        }
    }
}

/// A domain record as returned by the admin API
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DomainResponse {
    pub id: Uuid,
    pub domain_name: String,
    pub status: compliance_core::ComplianceStatus,
    pub compliance_level: String,
    pub issued_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub signature: String,
    pub public_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DomainRecord> for DomainResponse {
    fn from(record: DomainRecord) -> Self {
        Self {
            id: record.id,
            domain_name: record.domain_name,
            status: record.status,
            compliance_level: record.compliance_level,
            issued_at: record.issued_at,
            revoked_at: record.revoked_at,
            signature: record.signature,
            public_key: record.public_key,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
