use axum::{routing::get, routing::MethodRouter, Router};

use super::handlers::{health, root, AppState};
use crate::metrics;

/// Fixed URI layout: `/{global_prefix}/{version}{path}` unless the path is excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiConfig {
    pub global_prefix: &'static str,
    pub default_version: &'static str,
    /// Paths served as-is, without prefix or version
    pub prefix_exclusions: &'static [&'static str],
}

/// `#[utoipa::path]` attributes on handlers spell out resolved paths, so they
/// must change together with this layout.
pub const API_CONFIG: ApiConfig = ApiConfig {
    global_prefix: "api",
    default_version: "v1",
    prefix_exclusions: &["/", "/metrics"],
};

impl ApiConfig {
    pub fn is_excluded(&self, path: &str) -> bool {
        self.prefix_exclusions.contains(&path)
    }

    /// Full path a route is served under
    pub fn resolve_path(&self, version: Option<&str>, path: &str) -> String {
        let path = normalize_path(path);
        if self.is_excluded(&path) {
            return path;
        }

        let version = version.unwrap_or(self.default_version);
        let suffix = if path == "/" { "" } else { path.as_str() };
        format!("/{}/{}{}", self.global_prefix, version, suffix)
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Router builder applying the global prefix and URI versioning
pub struct ApiRouter<S = ()> {
    config: ApiConfig,
    router: Router<S>,
}

impl<S> ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            router: Router::new(),
        }
    }

    /// Register a route under the default version
    pub fn route(self, path: &str, method_router: MethodRouter<S>) -> Self {
        self.mount(None, path, method_router)
    }

    /// Register a route under an explicit version
    pub fn route_versioned(self, version: &str, path: &str, method_router: MethodRouter<S>) -> Self {
        self.mount(Some(version), path, method_router)
    }

    fn mount(self, version: Option<&str>, path: &str, method_router: MethodRouter<S>) -> Self {
        let full_path = self.config.resolve_path(version, path);
        Self {
            config: self.config,
            router: self.router.route(&full_path, method_router),
        }
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}

/// Routes served by this service
pub fn create_router(state: AppState) -> Router {
    ApiRouter::new(API_CONFIG)
        .route("/", get(root))
        .route("/health", get(health))
        .route("/metrics", get(metrics::metrics_handler))
        .into_router()
        .with_state(state)
}
