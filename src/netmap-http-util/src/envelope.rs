//! The `{status, error, warnings, data}` response envelope every netmap HTTP
//! endpoint wraps its payload in.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// A successful response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope {
            status: "success",
            warnings: Vec::new(),
            data,
        }
    }

    pub fn success_with_warnings(data: T, warnings: Vec<String>) -> Self {
        Envelope {
            status: "success",
            warnings,
            data,
        }
    }

    /// Wraps the envelope in a response with the given status code.
    pub fn into_response_with(self, code: StatusCode) -> Response {
        (code, Json(self)).into_response()
    }
}

/// An error response body; `data` is always an empty array, matching every
/// other endpoint's `data` field shape.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    error: String,
    data: [(); 0],
}

/// Builds the JSON error envelope for `message` at the given HTTP status.
pub fn error_response(code: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        status: "error",
        error: message.into(),
        data: [],
    };
    (code, Json(body)).into_response()
}

impl From<&netmap_types::NetmapError> for StatusCode {
    fn from(err: &netmap_types::NetmapError) -> Self {
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Converts a [`netmap_types::NetmapError`] directly into the error envelope
/// response its kind maps to.
pub fn error_response_for(err: netmap_types::NetmapError) -> Response {
    let code = StatusCode::from(&err);
    error_response(code, err.to_string())
}
