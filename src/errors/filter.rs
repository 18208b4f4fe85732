//! Global exception filter: turns every raised error into one JSON error body.

use axum::{
    body::{self, HttpBody},
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;
use tracing::error;

use super::codes::{internal_error_code, FALLBACK_ERROR_CODE};
use super::exception::{GenericError, HttpException, RaisedError};
use super::response::{AxumReply, OutgoingErrorBody, ReplyAdapter};
use crate::config::RuntimeEnvironment;
use crate::metrics::ERROR_RESPONSES_TOTAL;

/// Description exposed for unexpected errors in production
pub const GENERIC_ERROR_DESCRIPTION: &str = "Something went wrong";

/// Largest extractor rejection body read back into a description
const REJECTION_BODY_LIMIT: usize = 16 * 1024;

/// Converts raised errors into [`OutgoingErrorBody`] responses.
///
/// Holds only the runtime environment, so clones are cheap and concurrent use
/// needs no locking.
#[derive(Debug, Clone)]
pub struct HttpExceptionFilter {
    environment: RuntimeEnvironment,
}

impl HttpExceptionFilter {
    pub fn new(environment: RuntimeEnvironment) -> Self {
        Self { environment }
    }

    /// Decide status and body for an error. Never fails.
    pub fn format(&self, error: &RaisedError) -> (StatusCode, OutgoingErrorBody) {
        match error {
            RaisedError::Generic(generic) => {
                self.internal_error(&generic.message, generic.trace.as_deref())
            }
            RaisedError::Http(exception) => match exception.normalize() {
                Ok((status, response)) => {
                    let (description, error_code) = response.into_description_and_code(status);
                    (status, OutgoingErrorBody::new(status, description, error_code))
                }
                Err(malformed) => {
                    let trace = format!("{:?} raised by {:?}", malformed, exception);
                    self.internal_error(&malformed.to_string(), Some(&trace))
                }
            },
        }
    }

    /// Format the error and write it through the given adapter
    pub fn handle<A: ReplyAdapter>(&self, error: &RaisedError, adapter: A) -> A::Output {
        let (status, body) = self.format(error);
        adapter.reply(status, &body)
    }

    fn internal_error(&self, message: &str, trace: Option<&str>) -> (StatusCode, OutgoingErrorBody) {
        error!(
            error = %message,
            trace = trace.unwrap_or("<no trace>"),
            "Unhandled error while processing request"
        );

        let description = if self.environment.is_production() || message.is_empty() {
            GENERIC_ERROR_DESCRIPTION
        } else {
            message
        };

        let status = StatusCode::INTERNAL_SERVER_ERROR;
        (
            status,
            OutgoingErrorBody::new(status, description, internal_error_code()),
        )
    }
}

/// Middleware installing [`HttpExceptionFilter`] for the whole router
pub async fn exception_filter(
    State(filter): State<HttpExceptionFilter>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let raised = response.extensions().get::<RaisedError>().cloned();
    let (error, response) = match raised {
        Some(error) => (error, response),
        None if is_bare_framework_error(&response) => (
            framework_exception(response.status(), &method, &path).into(),
            response,
        ),
        None if is_plain_text_error(&response) => {
            let (parts, rejection) = response.into_parts();
            let message = match body::to_bytes(rejection, REJECTION_BODY_LIMIT).await {
                Ok(bytes) => String::from_utf8(bytes.to_vec()).unwrap_or_default(),
                Err(_) => String::new(),
            };
            let exception = rejection_exception(parts.status, message.trim());
            (exception.into(), Response::from_parts(parts, body::Body::empty()))
        }
        None => return response,
    };

    let kind = match &error {
        RaisedError::Http(_) => "http",
        RaisedError::Generic(_) => "generic",
    };
    let mut reply = filter.handle(&error, AxumReply);
    // 405 responses must keep advertising the allowed methods
    if let Some(allow) = response.headers().get(header::ALLOW) {
        reply.headers_mut().insert(header::ALLOW, allow.clone());
    }
    ERROR_RESPONSES_TOTAL
        .with_label_values(&[reply.status().as_str(), kind])
        .inc();

    reply
}

/// Error statuses produced by the router itself carry no body and no content type
fn is_bare_framework_error(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error())
        && !response.headers().contains_key(header::CONTENT_TYPE)
        && response.body().size_hint().exact() == Some(0)
}

/// Extractor rejections (path, query, form, ...) answer with a text/plain body
fn is_plain_text_error(response: &Response) -> bool {
    let status = response.status();
    (status.is_client_error() || status.is_server_error())
        && response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/plain"))
}

fn rejection_exception(status: StatusCode, message: &str) -> HttpException {
    if message.is_empty() {
        let reason = status.canonical_reason().unwrap_or(FALLBACK_ERROR_CODE);
        HttpException::with_message(status, reason)
    } else {
        HttpException::with_message(status, message)
    }
}

fn framework_exception(status: StatusCode, method: &Method, path: &str) -> HttpException {
    let message = if status == StatusCode::NOT_FOUND {
        format!("Cannot {} {}", method, path)
    } else {
        status
            .canonical_reason()
            .unwrap_or(FALLBACK_ERROR_CODE)
            .to_string()
    };
    HttpException::with_message(status, message)
}

/// Response for `CatchPanicLayer::custom`; the filter renders it as a 500
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "Handler panicked".to_string()
    };

    RaisedError::Generic(GenericError::with_trace(message, "panic in request handler"))
        .into_response()
}
