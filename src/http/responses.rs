//! Uniform response envelope and error translation for the HTTP API
//!
//! Every response is `{"msg": …, "data": …}`. Client-caused failures
//! surface their reason; infrastructure failures surface an opaque
//! message, with the full detail recorded in the operational logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::types::Error;

/// Fallback message when field errors cannot be itemized
pub const PARAM_ERROR_MSG: &str = "request parameters are invalid";

/// Response envelope: a human-readable message plus an optional payload
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub msg: String,
    pub data: Option<T>,
}

impl ApiResponse<()> {
    pub fn success() -> Self {
        Self {
            msg: "success".to_string(),
            data: None,
        }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            data: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success_with(data: T) -> Self {
        Self {
            msg: "success".to_string(),
            data: Some(data),
        }
    }
}

/// Map error categories to HTTP status codes. The reference returned 500
/// for everything; client faults get proper 4xx codes here.
pub fn error_to_status_code(error: &Error) -> StatusCode {
    match error {
        Error::Unauthorized => StatusCode::UNAUTHORIZED,
        Error::Stale { .. } => StatusCode::BAD_REQUEST,
        Error::Upload(_) => StatusCode::BAD_REQUEST,
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::Config(_)
        | Error::Storage(_)
        | Error::Execution(_)
        | Error::Io(_)
        | Error::Application(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The message surfaced to the caller. Internal failure detail stays in
/// the logs.
fn error_to_message(error: &Error) -> String {
    match error {
        Error::Unauthorized | Error::Stale { .. } | Error::Upload(_) | Error::Validation { .. } => {
            error.to_string()
        }
        _ => "deployment failed".to_string(),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = error_to_status_code(&self);
        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "Deployment request failed");
        }
        let envelope = ApiResponse::fail(error_to_message(&self));
        (status_code, Json(envelope)).into_response()
    }
}
