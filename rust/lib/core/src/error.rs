use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all crates.
///
/// Each variant maps to one HTTP status code. The JSON body is a bare
/// status echo keyed by the lower-case reason phrase:
///
/// ```json
/// {"not found": 404}
/// ```
///
/// The message carried by the variant is for logs only and never reaches
/// the client.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Request cannot be satisfied from its path, headers or body. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Request body exceeds the size the server will buffer. HTTP 413.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The route exists but does not handle this verb. HTTP 405.
    #[error("method not allowed (allowed: {})", allowed.join(", "))]
    MethodNotAllowed { allowed: Vec<&'static str> },

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The JSON body sent to the client.
    pub fn body(&self) -> serde_json::Value {
        let status = self.status_code();
        let mut body = serde_json::Map::new();
        body.insert(status_echo_key(status), status.as_u16().into());
        if let ServiceError::MethodNotAllowed { allowed } = self {
            body.insert("allowed".into(), allowed.clone().into());
        }
        serde_json::Value::Object(body)
    }
}

fn status_echo_key(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("error")
        .to_ascii_lowercase()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", self);
        }

        let mut resp = (status, axum::Json(self.body())).into_response();
        if let ServiceError::MethodNotAllowed { allowed } = &self {
            if let Ok(v) = HeaderValue::from_str(&allowed.join(", ")) {
                resp.headers_mut().insert(header::ALLOW, v);
            }
        }
        resp
    }
}
