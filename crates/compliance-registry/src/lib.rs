//! Compliance Registry Server
//!
//! Issues and publicly verifies signed compliance records for domains:
//! - Admins register a domain; the registry signs its issuance claim once
//! - Admins may later revoke or delete the record
//! - Anyone can look a domain up and check that its record is authentic
//!
//! ## Signing Convention
//!
//! Every signature covers the record's `active` claim. Revocation updates the
//! live status but never re-signs, so a revoked record still verifies and the
//! verify endpoint reports both facts side by side.
//!
//! ## API Endpoints
//!
//! ### Public
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check with the issuer public key
//! - `GET /verify?domain=` - Live status plus signature check
//!
//! ### Admin (`X-Admin-Key` required)
//! - `GET /admin/domains` - Paginated list, newest first
//! - `POST /admin/domains` - Register and sign a domain
//! - `PATCH /admin/domains/{id}/revoke` - Revoke a record
//! - `DELETE /admin/domains/{id}` - Delete a record

pub mod api;
pub mod config;
pub mod keys;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{ConfigError, CorsOrigins, RegistryConfig};
pub use keys::{KeyError, KeyManager, Signer};
pub use storage::{DomainRecord, DomainStore, MemoryStore, StorageError};
