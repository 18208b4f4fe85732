use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use utoipa::ToSchema;

use crate::config::RuntimeEnvironment;

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub environment: RuntimeEnvironment,
}

/// Service banner served at the root path
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    /// Package name
    pub service: String,
    /// Package version
    pub version: String,
    /// Location of the interactive API documentation
    pub docs: String,
}

/// Health report
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,
    pub service: String,
    pub version: String,
    /// Runtime environment name
    pub environment: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses(
        (status = 200, description = "Service banner", body = ServiceInfo)
    )
)]
pub async fn root() -> impl IntoResponse {
    Json(ServiceInfo {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: crate::api::openapi::DOCS_PATH.to_string(),
    })
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 500, description = "Internal server error", body = crate::errors::OutgoingErrorBody)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Health check");

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.environment.to_string(),
        uptime_seconds: START_TIME.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
