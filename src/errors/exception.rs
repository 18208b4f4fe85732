use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::codes::{error_code_or_fallback, FALLBACK_ERROR_CODE};

/// Payload attached to an [`HttpException`]
#[derive(Debug, Clone, PartialEq)]
pub enum ExceptionPayload {
    /// Plain string, used as both message and error label
    Text(String),
    /// Structured object with `message` and optional `error`, `statusCode`, `status`
    Object(Value),
}

impl From<&str> for ExceptionPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ExceptionPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for ExceptionPayload {
    fn from(value: Value) -> Self {
        Self::Object(value)
    }
}

/// Message field of a normalized payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExceptionMessage {
    Single(String),
    List(Vec<String>),
}

impl ExceptionMessage {
    /// Collapse into one description; list entries are joined with ", "
    pub fn into_description(self) -> String {
        match self {
            Self::Single(message) => message,
            Self::List(messages) => messages.join(", "),
        }
    }
}

/// Normalized view of an exception payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExceptionResponse {
    /// Informational only; any JSON value is accepted
    #[serde(rename = "statusCode", default)]
    pub status_code: Option<Value>,
    /// Informational only; any JSON value is accepted
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub message: Option<ExceptionMessage>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExceptionResponse {
    fn from_text(text: &str) -> Self {
        Self {
            status_code: Some(json!(0)),
            status: Some(json!(0)),
            message: Some(ExceptionMessage::Single(text.to_string())),
            error: Some(text.to_string()),
        }
    }

    /// Description and error label for a response with the given status.
    ///
    /// A missing `error` uses the table label for `status`; a missing
    /// `message` uses the label.
    pub fn into_description_and_code(self, status: StatusCode) -> (String, String) {
        let error_code = self
            .error
            .unwrap_or_else(|| error_code_or_fallback(status.as_u16()).to_string());
        let description = match self.message {
            Some(message) => message.into_description(),
            None => error_code.clone(),
        };
        (description, error_code)
    }
}

/// A structured exception whose payload could not be normalized
#[derive(Debug, thiserror::Error)]
pub enum MalformedException {
    #[error("Invalid HTTP status code: {0}")]
    InvalidStatus(u16),

    #[error("Malformed exception payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Intentional, application-raised error with an explicit status and payload
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("HTTP exception with status {status}")]
pub struct HttpException {
    status: u16,
    payload: ExceptionPayload,
}

impl HttpException {
    pub fn new(status: u16, payload: impl Into<ExceptionPayload>) -> Self {
        Self {
            status,
            payload: payload.into(),
        }
    }

    /// Build the `{statusCode, message, error}` payload the built-in exceptions use
    pub fn with_message(status: StatusCode, message: impl Into<String>) -> Self {
        let reason = status.canonical_reason().unwrap_or(FALLBACK_ERROR_CODE);
        Self::new(
            status.as_u16(),
            json!({
                "statusCode": status.as_u16(),
                "message": message.into(),
                "error": reason,
            }),
        )
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::CONFLICT, message)
    }

    pub fn unprocessable_entity(payload: impl Into<ExceptionPayload>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY.as_u16(), payload)
    }

    /// Declared status, possibly not a valid HTTP status
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn payload(&self) -> &ExceptionPayload {
        &self.payload
    }

    pub fn status_code(&self) -> Result<StatusCode, MalformedException> {
        StatusCode::from_u16(self.status).map_err(|_| MalformedException::InvalidStatus(self.status))
    }

    /// Validate the declared status and normalize the payload
    pub fn normalize(&self) -> Result<(StatusCode, ExceptionResponse), MalformedException> {
        let status = self.status_code()?;
        let response = match &self.payload {
            ExceptionPayload::Text(text) => ExceptionResponse::from_text(text),
            ExceptionPayload::Object(value) => ExceptionResponse::deserialize(value)?,
        };
        Ok((status, response))
    }
}

impl IntoResponse for HttpException {
    fn into_response(self) -> Response {
        RaisedError::from(self).into_response()
    }
}

/// Unexpected fault carrying only a message and an optional trace
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct GenericError {
    pub message: String,
    pub trace: Option<String>,
}

impl GenericError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: None,
        }
    }

    pub fn with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: Some(trace.into()),
        }
    }
}

/// Any error that reaches the exception filter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RaisedError {
    #[error(transparent)]
    Http(#[from] HttpException),

    #[error(transparent)]
    Generic(#[from] GenericError),
}

impl RaisedError {
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic(GenericError::new(message))
    }
}

impl From<anyhow::Error> for RaisedError {
    fn from(error: anyhow::Error) -> Self {
        Self::Generic(GenericError::with_trace(error.to_string(), format!("{:?}", error)))
    }
}

/// The response only carries the error; the exception filter renders the body
impl IntoResponse for RaisedError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Http(exception) => exception
                .status_code()
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Generic(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}
