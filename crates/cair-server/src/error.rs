//! Error responses.
//!
//! Two shapes share one body layout (`{status: "error", kind?, message}`):
//! `ApiError` for failures that carry an HTTP status (input errors on the
//! judge and bridge), and in-band errors returned with HTTP 200 by the
//! enhance endpoints.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cair_core::{CoreError, ErrorKind};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: Option<ErrorKind>, message: impl Into<String>) -> Self {
        Self {
            status: "error",
            kind: kind.map(|k| k.as_str()),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: status_for(kind),
            kind,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    pub fn from_rejection(rejection: JsonRejection) -> Self {
        Self::input(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::PathEscape => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(Some(self.kind), self.message);
        (self.status, Json(body)).into_response()
    }
}

/// In-band error: HTTP 200 with `{status: "error", message}`.
pub fn in_band(message: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody::new(None, message))
}
