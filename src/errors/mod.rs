//! Uniform JSON error responses

pub mod codes;
pub mod exception;
pub mod filter;
pub mod response;

pub use codes::{error_code_for_status, error_code_or_fallback, FALLBACK_ERROR_CODE};
pub use exception::{
    ExceptionMessage, ExceptionPayload, ExceptionResponse, GenericError, HttpException,
    MalformedException, RaisedError,
};
pub use filter::{exception_filter, panic_response, HttpExceptionFilter, GENERIC_ERROR_DESCRIPTION};
pub use response::{AxumReply, OutgoingErrorBody, RawHttpReply, ReplyAdapter};
