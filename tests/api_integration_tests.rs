use axum::{
    body::Body,
    extract::{Path, Query},
    http::{header, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

use api_foundation::api::routes::{ApiRouter, API_CONFIG};
use api_foundation::bootstrap::{configure_app, install_global_layers};
use api_foundation::config::{Config, RuntimeEnvironment, ServerConfig};
use api_foundation::errors::{HttpException, RaisedError};
use api_foundation::validation::{Validate, ValidatedJson, ValidationError, Validator};

fn test_config(environment: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        environment: RuntimeEnvironment::new(environment),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateProfile {
    name: String,
    age: i64,
}

impl Validate for CreateProfile {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut validator = Validator::new();
        validator
            .check("name", !self.name.trim().is_empty(), "isNotEmpty", "name is required")
            .check("age", self.age >= 0, "min", "age must not be less than 0");
        validator.finish()
    }
}

async fn create_profile(ValidatedJson(profile): ValidatedJson<CreateProfile>) -> Json<Value> {
    Json(json!({ "name": profile.name, "age": profile.age }))
}

async fn missing_item() -> Result<Json<Value>, RaisedError> {
    Err(HttpException::new(404, "Not found").into())
}

async fn invalid_fields() -> Result<Json<Value>, HttpException> {
    Err(HttpException::unprocessable_entity(json!({
        "message": ["name is required", "age must be a number"],
        "error": "Unprocessable Entity",
    })))
}

async fn database_down() -> Result<Json<Value>, RaisedError> {
    Err(anyhow::anyhow!("DB connection lost").into())
}

async fn malformed() -> Result<Json<Value>, RaisedError> {
    Err(HttpException::new(400, json!({ "message": { "detail": "not a string" } })).into())
}

async fn expired_token() -> Result<Json<Value>, RaisedError> {
    Err(HttpException::new(401, json!({ "statusCode": "401", "error": "Unauthorized" })).into())
}

#[derive(Debug, Deserialize)]
struct Page {
    page: u32,
}

async fn order(Path(id): Path<u32>) -> Json<Value> {
    Json(json!({ "id": id }))
}

async fn orders(Query(query): Query<Page>) -> Json<Value> {
    Json(json!({ "page": query.page }))
}

async fn explode() -> Json<Value> {
    panic!("handler exploded")
}

async fn report_v1() -> &'static str {
    "v1"
}

async fn report_v2() -> &'static str {
    "v2"
}

// Routes that exercise every error path through the global layers
fn create_failing_app(environment: &str) -> Router {
    let router = ApiRouter::new(API_CONFIG)
        .route("/items/missing", get(missing_item))
        .route("/items/invalid", get(invalid_fields))
        .route("/items/database", get(database_down))
        .route("/items/malformed", get(malformed))
        .route("/items/panic", get(explode))
        .route("/items/expired", get(expired_token))
        .route("/orders", get(orders))
        .route("/orders/:id", get(order))
        .route("/profiles", post(create_profile))
        .route("/reports", get(report_v1))
        .route_versioned("v2", "/reports", get(report_v2))
        .into_router();

    install_global_layers(router, &RuntimeEnvironment::new(environment))
}

// Helper to send request and parse JSON response
async fn send_json_request(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    read_json(app, request).await
}

// Helper to send JSON request with JSON body
async fn send_json_body_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let bytes = serde_json::to_vec(&body).unwrap();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .unwrap();

    read_json(app, request).await
}

async fn read_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

#[tokio::test]
async fn test_root_is_excluded_from_prefix() {
    let app = configure_app(&test_config("development"));
    let (status, body) = send_json_request(app, "GET", "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "api-foundation");
    assert_eq!(body["docs"], "/docs");
}

#[tokio::test]
async fn test_health_is_versioned_and_prefixed() {
    let app = configure_app(&test_config("staging"));
    let (status, body) = send_json_request(app, "GET", "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "staging");
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_unprefixed_health_is_not_found() {
    let app = configure_app(&test_config("production"));
    let (status, body) = send_json_request(app, "GET", "/health").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "statusCode": 404,
            "errorDescription": "Cannot GET /health",
            "errorCode": "Not Found",
        })
    );
}

#[tokio::test]
async fn test_wrong_method_is_formatted() {
    let app = configure_app(&test_config("production"));
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/v1/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(response.headers().contains_key(header::ALLOW));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["statusCode"], 405);
    assert_eq!(json["errorDescription"], "Method Not Allowed");
}

#[tokio::test]
async fn test_openapi_document_is_published() {
    let app = configure_app(&test_config("development"));
    let (status, body) = send_json_request(app, "GET", "/docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "api-foundation");
    assert_eq!(body["info"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["paths"]["/api/v1/health"].is_object());
    assert!(body["components"]["schemas"]["OutgoingErrorBody"].is_object());
}

#[tokio::test]
async fn test_metrics_endpoint_is_excluded_from_prefix() {
    let app = configure_app(&test_config("development"));
    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = configure_app(&test_config("development"));
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_string_payload_exception() {
    let app = create_failing_app("production");
    let (status, body) = send_json_request(app, "GET", "/api/v1/items/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "statusCode": 404,
            "errorDescription": "Not found",
            "errorCode": "Not found",
        })
    );
}

#[tokio::test]
async fn test_object_payload_exception() {
    let app = create_failing_app("production");
    let (status, body) = send_json_request(app, "GET", "/api/v1/items/invalid").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({
            "statusCode": 422,
            "errorDescription": "name is required, age must be a number",
            "errorCode": "Unprocessable Entity",
        })
    );
}

#[tokio::test]
async fn test_generic_error_in_production() {
    let app = create_failing_app("production");
    let (status, body) = send_json_request(app, "GET", "/api/v1/items/database").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "statusCode": 500,
            "errorDescription": "Something went wrong",
            "errorCode": "An unexpected error occurred on the server",
        })
    );
}

#[tokio::test]
async fn test_generic_error_in_development() {
    let app = create_failing_app("development");
    let (status, body) = send_json_request(app, "GET", "/api/v1/items/database").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorDescription"], "DB connection lost");
    assert_eq!(
        body["errorCode"],
        "An unexpected error occurred on the server"
    );
}

#[tokio::test]
async fn test_malformed_exception_becomes_500() {
    let app = create_failing_app("production");
    let (status, body) = send_json_request(app, "GET", "/api/v1/items/malformed").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorDescription"], "Something went wrong");
}

#[tokio::test]
async fn test_loose_payload_keeps_declared_status() {
    let app = create_failing_app("production");
    let (status, body) = send_json_request(app, "GET", "/api/v1/items/expired").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({
            "statusCode": 401,
            "errorDescription": "Unauthorized",
            "errorCode": "Unauthorized",
        })
    );
}

#[tokio::test]
async fn test_path_rejection_is_formatted() {
    let (status, body) =
        send_json_request(create_failing_app("production"), "GET", "/api/v1/orders/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["errorCode"], "Bad Request");
    assert!(body["errorDescription"].as_str().unwrap().contains("abc"));

    let (status, body) =
        send_json_request(create_failing_app("production"), "GET", "/api/v1/orders/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 7 }));
}

#[tokio::test]
async fn test_query_rejection_is_formatted() {
    let app = create_failing_app("production");
    let (status, body) = send_json_request(app, "GET", "/api/v1/orders?page=x").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["errorCode"], "Bad Request");
    assert!(body["errorDescription"]
        .as_str()
        .unwrap()
        .starts_with("Failed to deserialize query string"));
}

#[tokio::test]
async fn test_panic_becomes_500() {
    let app = create_failing_app("development");
    let (status, body) = send_json_request(app, "GET", "/api/v1/items/panic").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["statusCode"], 500);
    assert_eq!(body["errorDescription"], "handler exploded");
}

#[tokio::test]
async fn test_identical_errors_produce_identical_bodies() {
    let first = send_json_request(create_failing_app("production"), "GET", "/api/v1/items/invalid").await;
    let second = send_json_request(create_failing_app("production"), "GET", "/api/v1/items/invalid").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_valid_body_passes_validation() {
    let app = create_failing_app("production");
    let (status, body) = send_json_body_request(
        app,
        "POST",
        "/api/v1/profiles",
        json!({ "name": "Ada", "age": 36 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "name": "Ada", "age": 36 }));
}

#[tokio::test]
async fn test_failed_validation_is_422() {
    let app = create_failing_app("production");
    let (status, body) = send_json_body_request(
        app,
        "POST",
        "/api/v1/profiles",
        json!({ "name": "", "age": -1 }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body,
        json!({
            "statusCode": 422,
            "errorDescription": "name is required, age must not be less than 0",
            "errorCode": "Unprocessable Entity",
        })
    );
}

#[tokio::test]
async fn test_unknown_field_is_rejected() {
    let app = create_failing_app("production");
    let (status, body) = send_json_body_request(
        app,
        "POST",
        "/api/v1/profiles",
        json!({ "name": "Ada", "age": 36, "role": "admin" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errorCode"], "Unprocessable Entity");
    assert!(body["errorDescription"]
        .as_str()
        .unwrap()
        .contains("unknown field `role`"));
}

#[tokio::test]
async fn test_explicit_version_routes() {
    let (status, _) = send_json_request(create_failing_app("production"), "GET", "/api/v1/reports").await;
    assert_eq!(status, StatusCode::OK);

    let response = create_failing_app("production")
        .oneshot(
            Request::builder()
                .uri("/api/v2/reports")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"v2");
}
