//! One-time application setup: routing layout, documentation, validation and
//! the global exception filter.

use axum::{middleware, Router};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::AppStateInner;
use crate::api::middleware::logging_middleware;
use crate::api::openapi::{build_openapi, ProjectMetadata, DOCS_PATH, OPENAPI_JSON_PATH};
use crate::api::routes::create_router;
use crate::config::{Config, RuntimeEnvironment};
use crate::errors::{exception_filter, panic_response, HttpExceptionFilter};
use crate::metrics;

/// Build the fully configured application router
pub fn configure_app(config: &Config) -> Router {
    let state = Arc::new(AppStateInner {
        environment: config.environment.clone(),
    });

    let docs = build_openapi(&ProjectMetadata::current());
    let router = create_router(state)
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_JSON_PATH, docs));

    install_global_layers(router, &config.environment)
}

/// Wrap a router with the exception filter and the shared middleware stack.
///
/// Order, innermost first: panic capture -> exception filter -> logging ->
/// metrics -> compression -> cors -> trace.
pub fn install_global_layers(router: Router, environment: &RuntimeEnvironment) -> Router {
    let filter = HttpExceptionFilter::new(environment.clone());
    info!(environment = %environment, "Installing global exception filter");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(filter, exception_filter))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}
