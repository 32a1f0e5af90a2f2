//! Public verification endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use compliance_core::ComplianceStatus;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::AppState;
use crate::api::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    /// Domain name to look up (e.g. `example.com`)
    pub domain: String,
}

/// Live status of a domain plus the outcome of its signature check
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub domain: String,
    pub status: ComplianceStatus,
    pub compliance_level: String,
    pub issued_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    /// Whether the stored signature matches the stored issuance claim
    pub signature_valid: bool,
    /// Key the signature was checked against
    pub public_key: String,
}

/// Verify a domain's compliance record
///
/// GET /verify?domain=example.com
///
/// Checks the stored signature against the stored public key; the registry's
/// own key is not consulted. Revoked records still report
/// `signature_valid = true` when untampered.
pub async fn verify_domain(
    State(state): State<Arc<AppState>>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Query(query) = query?;
    let record = state
        .store
        .find_by_domain(&query.domain)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No compliance record found for domain '{}'",
                query.domain
            ))
        })?;

    let signature_valid = record.signature_valid();
    if signature_valid {
        debug!(domain = %record.domain_name, status = %record.status, "Verified domain record");
    } else {
        warn!(domain = %record.domain_name, "Stored signature does not match record");
    }

    Ok(Json(VerifyResponse {
        domain: record.domain_name,
        status: record.status,
        compliance_level: record.compliance_level,
        issued_at: record.issued_at,
        revoked_at: record.revoked_at,
        signature_valid,
        public_key: record.public_key,
    }))
}
