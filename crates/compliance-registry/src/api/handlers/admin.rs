//! Admin Handlers
//!
//! Create, list, revoke and delete compliance records. Every route here sits
//! behind [`require_admin_key`], which checks the `X-Admin-Key` header in
//! constant time.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, Request, State,
    },
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::Utc;
use compliance_core::IssuedAt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

use super::{AppState, DomainResponse};
use crate::api::error::ApiError;
use crate::storage::DomainRecord;

/// Header carrying the shared admin secret
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 500;

const DOMAIN_NAME_LENGTH: std::ops::RangeInclusive<usize> = 3..=255;
const COMPLIANCE_LEVEL_LENGTH: std::ops::RangeInclusive<usize> = 1..=50;

/// Reject requests that do not present the configured admin key
pub async fn require_admin_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = headers
        .get(ADMIN_KEY_HEADER)
        .map(|value| value.as_bytes())
        .unwrap_or_default();

    let authorized: bool = presented
        .ct_eq(state.config.admin_key.as_bytes())
        .into();

    if !authorized {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected admin request with missing or invalid key"
        );
        return Err(ApiError::Unauthorized(
            "Invalid or missing admin API key".into(),
        ));
    }

    Ok(next.run(request).await)
}

/// Pagination parameters for the record list
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Requested page size, clamped to `1..=500`
    pub fn page_size(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of records, newest first
#[derive(Debug, Serialize)]
pub struct DomainListResponse {
    pub total: usize,
    pub items: Vec<DomainResponse>,
}

/// Request to register a domain
#[derive(Debug, Deserialize)]
pub struct CreateDomainRequest {
    /// Domain name (e.g. `example.com`)
    pub domain_name: String,
    /// Compliance tier (e.g. `basic`, `advanced`)
    pub compliance_level: String,
}

impl CreateDomainRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_length("domain_name", &self.domain_name, DOMAIN_NAME_LENGTH)?;
        check_length(
            "compliance_level",
            &self.compliance_level,
            COMPLIANCE_LEVEL_LENGTH,
        )
    }
}

fn check_length(
    field: &str,
    value: &str,
    allowed: std::ops::RangeInclusive<usize>,
) -> Result<(), ApiError> {
    let length = value.chars().count();
    if allowed.contains(&length) {
        return Ok(());
    }
    Err(ApiError::Validation(format!(
        "{field} must be between {} and {} characters, got {length}",
        allowed.start(),
        allowed.end()
    )))
}

/// Parse a path id; anything that is not a UUID cannot name a record
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Domain not found".into()))
}

/// List records
///
/// GET /admin/domains?skip=0&limit=50
pub async fn list_domains(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<DomainListResponse>, ApiError> {
    let Query(query) = query?;
    let (total, records) = state.store.list(query.skip, query.page_size()).await?;

    Ok(Json(DomainListResponse {
        total,
        items: records.into_iter().map(DomainResponse::from).collect(),
    }))
}

/// Register and sign a new domain record
///
/// POST /admin/domains
///
/// The record is signed once, here, over its `active` claim.
pub async fn create_domain(
    State(state): State<Arc<AppState>>,
    request: Result<Json<CreateDomainRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DomainResponse>), ApiError> {
    let Json(request) = request?;
    request.validate()?;

    if state
        .store
        .find_by_domain(&request.domain_name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Domain '{}' already exists",
            request.domain_name
        )));
    }

    let issued_at = IssuedAt::now();
    let signature = state
        .signer
        .sign(&request.domain_name, &request.compliance_level, issued_at)?;

    let record = DomainRecord::issue(
        request.domain_name,
        request.compliance_level,
        issued_at.as_datetime(),
        &signature,
    );
    let record = state.store.insert(record).await?;

    info!(
        id = %record.id,
        domain = %record.domain_name,
        compliance_level = %record.compliance_level,
        "Registered domain"
    );

    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Revoke a record
///
/// PATCH /admin/domains/{id}/revoke
///
/// The issuance signature is kept; verification keeps reporting it valid
/// alongside `status = revoked`.
pub async fn revoke_domain(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DomainResponse>, ApiError> {
    let id = parse_id(&id)?;
    let record = state.store.revoke(id, Utc::now()).await?;

    info!(id = %record.id, domain = %record.domain_name, "Revoked domain");
    Ok(Json(record.into()))
}

/// Permanently delete a record
///
/// DELETE /admin/domains/{id}
pub async fn delete_domain(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound("Domain not found".into()));
    }

    info!(id = %id, "Deleted domain");
    Ok(StatusCode::NO_CONTENT)
}
