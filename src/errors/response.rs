use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON body written for every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingErrorBody {
    /// HTTP status code of the response
    pub status_code: u16,
    /// Human-readable description of what went wrong
    pub error_description: String,
    /// Error category label
    pub error_code: String,
}

impl OutgoingErrorBody {
    pub fn new(
        status: StatusCode,
        error_description: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            status_code: status.as_u16(),
            error_description: error_description.into(),
            error_code: error_code.into(),
        }
    }

    /// Serialized JSON text of the body
    pub fn to_json(&self) -> String {
        // Only strings and an integer; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Writes an error body onto one kind of response primitive.
///
/// `reply` consumes the adapter, so each handled error is written exactly once.
pub trait ReplyAdapter {
    type Output;

    fn reply(self, status: StatusCode, body: &OutgoingErrorBody) -> Self::Output;
}

/// Adapter for axum handlers and middleware
#[derive(Debug, Clone, Copy, Default)]
pub struct AxumReply;

impl ReplyAdapter for AxumReply {
    type Output = Response;

    fn reply(self, status: StatusCode, body: &OutgoingErrorBody) -> Response {
        (status, Json(body)).into_response()
    }
}

/// Adapter for bare `http::Response` transports (plain hyper or tower services)
#[derive(Debug, Clone, Copy, Default)]
pub struct RawHttpReply;

impl ReplyAdapter for RawHttpReply {
    type Output = axum::http::Response<String>;

    fn reply(self, status: StatusCode, body: &OutgoingErrorBody) -> Self::Output {
        let mut response = axum::http::Response::new(body.to_json());
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}
