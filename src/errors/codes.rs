/// Fallback label for statuses that have no entry in the table
pub const FALLBACK_ERROR_CODE: &str = "Error";

/// Human-readable error codes keyed by HTTP status
static HTTP_ERROR_CODES_BY_STATUS: &[(u16, &str)] = &[
    (400, "Invalid request syntax or parameters"),
    (401, "Authentication required or failed"),
    (403, "Access to the resource is denied"),
    (404, "The requested resource could not be found"),
    (405, "Method not allowed"),
    (409, "Conflict with the current state of the resource"),
    (413, "Payload too large"),
    (429, "Rate limit exceeded, please try again later"),
    (500, "An unexpected error occurred on the server"),
    (502, "Bad gateway"),
    (503, "The server is currently unable to handle the request"),
    (504, "Gateway timeout"),
];

/// Look up the label for a status code, if the table has one
pub fn error_code_for_status(status: u16) -> Option<&'static str> {
    HTTP_ERROR_CODES_BY_STATUS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, label)| *label)
}

/// Label for a status code, falling back to [`FALLBACK_ERROR_CODE`]
pub fn error_code_or_fallback(status: u16) -> &'static str {
    error_code_for_status(status).unwrap_or(FALLBACK_ERROR_CODE)
}

/// Label used for every 500 response produced by the filter
pub fn internal_error_code() -> &'static str {
    error_code_or_fallback(500)
}
