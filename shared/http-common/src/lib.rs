//! Shared HTTP-facing pieces for the URL shortener workspace.
//!
//! Provides bearer authentication, bounded JSON ingestion, typed field
//! extraction and the error envelope that handlers return. Nothing here knows
//! about routing or storage.

use domain::{CoreError, ErrorKind};

pub mod auth;
pub mod fields;
pub mod ingest;

pub use auth::{check_bearer_auth, constant_time_eq, AdminSecret};
pub use ingest::{ingest_json_body, ingest_request, IngestError, IngestedBody, MAX_BODY_BYTES};

// ============================================================================
// JSON Response Helpers (framework-agnostic)
// ============================================================================

/// Create a structured error JSON with a default message based on the code.
///
/// Returns: `{"error": {"code": "<code>", "message": "<default message>"}}`
pub fn json_err(code: &str) -> serde_json::Value {
    let message = match code {
        "not_found" => "Resource not found",
        "bad_request" => "Bad request",
        "invalid_slug" => "Invalid slug format",
        "unauthorized" => "Authentication required",
        "conflict" => "Resource already exists",
        "error" | "internal" => "Internal server error",
        _ => code, // Fallback to code as message for unknown codes
    };
    serde_json::json!({"error": {"code": code, "message": message}})
}

/// Create a structured error JSON with a custom message.
///
/// Returns: `{"error": {"code": "<code>", "message": "<message>"}}`
pub fn json_error_with_message(code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({"error": {"code": code, "message": message}})
}

// ============================================================================
// Error classification -> HTTP status
// ============================================================================

/// HTTP status for a failure class.
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::Type | ErrorKind::Format | ErrorKind::Resource => 400,
        ErrorKind::Policy => 422,
        ErrorKind::Authorization => 401,
    }
}

/// Machine-readable error code for a failure class.
pub fn code_for(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Type => "invalid_type",
        ErrorKind::Format => "invalid_request",
        ErrorKind::Policy => "policy_violation",
        ErrorKind::Resource => "bad_body",
        ErrorKind::Authorization => "unauthorized",
    }
}

/// Status and envelope for a classified validation failure. The message is
/// the error's `Display`, which never carries input or secrets.
pub fn error_response(kind: ErrorKind, err: &dyn std::fmt::Display) -> (u16, serde_json::Value) {
    (
        status_for(kind),
        json_error_with_message(code_for(kind), &err.to_string()),
    )
}

/// Status and envelope for a domain error; server-side faults get a generic
/// 500 body.
pub fn core_error_response(err: &CoreError) -> (u16, serde_json::Value) {
    match err.kind() {
        Some(kind) => error_response(kind, err),
        None => (500, json_err("internal")),
    }
}

/// Status and envelope for a failed bearer check.
pub fn unauthorized() -> (u16, serde_json::Value) {
    (401, json_err("unauthorized"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{SlugError, UrlError};

    #[test]
    fn test_json_err() {
        let err = json_err("not_found");
        assert_eq!(err, serde_json::json!({"error": {"code": "not_found", "message": "Resource not found"}}));

        // Unknown code falls back to code as message
        let err = json_err("custom_error");
        assert_eq!(err, serde_json::json!({"error": {"code": "custom_error", "message": "custom_error"}}));
    }

    #[test]
    fn test_json_error_with_message() {
        let err = json_error_with_message("bad_request", "Invalid input");
        assert_eq!(
            err,
            serde_json::json!({"error": {"code": "bad_request", "message": "Invalid input"}})
        );
    }

    #[test]
    fn validation_failures_map_to_statuses() {
        let (status, body) = error_response(UrlError::BlockedAddress.kind(), &UrlError::BlockedAddress);
        assert_eq!(status, 422);
        assert_eq!(body["error"]["code"], "policy_violation");
        assert_eq!(
            body["error"]["message"],
            "url points to a private, local or reserved address"
        );

        let (status, _) = error_response(UrlError::NotAString.kind(), &UrlError::NotAString);
        assert_eq!(status, 400);

        let too_large = IngestError::TooLarge { limit: MAX_BODY_BYTES };
        let (status, body) = error_response(too_large.kind(), &too_large);
        assert_eq!(status, 400);
        assert_eq!(body["error"]["message"], "request body exceeds 8192 bytes");
    }

    #[test]
    fn core_errors_hide_internals() {
        let (status, body) = core_error_response(&CoreError::Repository("dynamo timeout at shard 7".into()));
        assert_eq!(status, 500);
        assert_eq!(body, json_err("internal"));

        let (status, body) = core_error_response(&CoreError::from(SlugError::Reserved));
        assert_eq!(status, 422);
        assert_eq!(body["error"]["message"], "invalid slug: slug is reserved");
    }

    #[test]
    fn unauthorized_envelope() {
        let (status, body) = unauthorized();
        assert_eq!(status, 401);
        assert_eq!(body["error"]["code"], "unauthorized");
    }
}
