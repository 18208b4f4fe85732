use utoipa::openapi::{ContactBuilder, OpenApi as OpenApiDocument};
use utoipa::OpenApi;

use crate::api::handlers::{HealthResponse, ServiceInfo};
use crate::errors::OutgoingErrorBody;
use crate::validation::FieldError;

/// Swagger UI mount point
pub const DOCS_PATH: &str = "/docs";
/// Raw OpenAPI document
pub const OPENAPI_JSON_PATH: &str = "/docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::root,
        crate::api::handlers::health,
    ),
    components(
        schemas(
            ServiceInfo,
            HealthResponse,
            OutgoingErrorBody,
            FieldError,
        )
    ),
    tags(
        (name = "service", description = "Service information"),
        (name = "health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

/// Descriptive project data shown in the generated document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    /// Colon-separated list, as Cargo provides it
    pub authors: &'static str,
}

impl ProjectMetadata {
    /// Metadata of this package, taken from Cargo at build time
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            version: env!("CARGO_PKG_VERSION"),
            authors: env!("CARGO_PKG_AUTHORS"),
        }
    }

    pub fn author(&self) -> &'static str {
        self.authors.split(':').next().unwrap_or_default().trim()
    }
}

/// OpenAPI document with `info` filled from project metadata
pub fn build_openapi(metadata: &ProjectMetadata) -> OpenApiDocument {
    let mut doc = ApiDoc::openapi();
    doc.info.title = metadata.name.to_string();
    doc.info.description = Some(metadata.description.to_string());
    doc.info.version = metadata.version.to_string();

    let author = metadata.author();
    if !author.is_empty() {
        doc.info.contact = Some(ContactBuilder::new().name(Some(author)).build());
    }

    doc
}
