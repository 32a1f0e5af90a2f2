//! API module for the compliance registry server

pub mod error;
pub mod handlers;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::CorsOrigins;
use error::ApiError;
use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub public_key: String,
    pub domain_count: usize,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Readiness check endpoint
///
/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Result<Json<ReadyResponse>, ApiError> {
    let public_key = state.keys.public_key()?;
    let domain_count = state.store.count().await?;

    Ok(Json(ReadyResponse {
        ready: true,
        public_key: public_key.to_hex(),
        domain_count,
    }))
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::from(Any),
        CorsOrigins::List(list) => {
            let parsed: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "Ignoring unparseable CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(handlers::admin::ADMIN_KEY_HEADER),
        ])
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let admin = Router::new()
        .route(
            "/domains",
            get(handlers::list_domains).post(handlers::create_domain),
        )
        .route("/domains/{id}/revoke", patch(handlers::revoke_domain))
        .route("/domains/{id}", delete(handlers::delete_domain))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            handlers::require_admin_key,
        ));

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Public verification
        .route("/verify", get(handlers::verify_domain))
        // Record management
        .nest("/admin", admin)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
