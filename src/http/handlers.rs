//! HTTP endpoint handlers for the deployment API

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use std::{sync::Arc, time::SystemTime};
use tracing::{info, warn};

use crate::{
    build,
    config::SystemConfig,
    deploy::{DeployPipeline, DeployRequest},
    http::responses::{ApiResponse, PARAM_ERROR_MSG},
    types::Error,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: SystemConfig,
    pub pipeline: DeployPipeline,
    pub start_time: SystemTime,
}

/// Multipart fields as received, before shape validation. The wire field
/// names are the upload client's contract.
#[derive(Default)]
struct RawPackageUpload {
    jar_name: Option<String>,
    time_stamp: Option<String>,
    file_size: Option<String>,
    ciphertext: Option<String>,
    file: Option<Bytes>,
}

/// POST /deploy/package - Accept an artifact upload and run the pipeline
pub async fn handle_deploy_package(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let raw = match read_multipart(multipart).await {
        Ok(raw) => raw,
        Err(e) => return e.into_response(),
    };

    let request = match validate_fields(raw) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Malformed deployment request");
            return e.into_response();
        }
    };

    let artifact = request.artifact_name.clone();
    let result = state.pipeline.execute(request).await;
    crate::metrics::record_deployment(&result);

    match result {
        Ok(report) => {
            info!(
                artifact = %report.artifact_name,
                stored_path = %report.stored_path.display(),
                duration_ms = report.script.duration_ms,
                "Deployment request completed"
            );
            (StatusCode::OK, Json(ApiResponse::success())).into_response()
        }
        Err(e) => {
            warn!(artifact = %artifact, error = %e, "Deployment request failed");
            e.into_response()
        }
    }
}

/// Drain the multipart stream into the raw field set. Unknown parts are
/// ignored.
async fn read_multipart(mut multipart: Multipart) -> Result<RawPackageUpload, Error> {
    let mut raw = RawPackageUpload::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read multipart body");
                return Err(Error::Validation {
                    message: PARAM_ERROR_MSG.to_string(),
                });
            }
        };

        let name = field.name().unwrap_or("").to_string();
        let read_error = |e: axum::extract::multipart::MultipartError| {
            warn!(field = %name, error = %e, "Failed to read multipart field");
            Error::Validation {
                message: PARAM_ERROR_MSG.to_string(),
            }
        };

        match name.as_str() {
            "jarName" => raw.jar_name = Some(field.text().await.map_err(read_error)?),
            "timeStamp" => raw.time_stamp = Some(field.text().await.map_err(read_error)?),
            "fileSize" => raw.file_size = Some(field.text().await.map_err(read_error)?),
            "ciphertext" => raw.ciphertext = Some(field.text().await.map_err(read_error)?),
            "file" => raw.file = Some(field.bytes().await.map_err(read_error)?),
            _ => {}
        }
    }

    Ok(raw)
}

/// Check the request shape, collecting every field error into one
/// `field: message` list joined by "; ".
fn validate_fields(raw: RawPackageUpload) -> Result<DeployRequest, Error> {
    let mut errors: Vec<String> = Vec::new();

    let artifact_name = match raw.jar_name {
        Some(name) if !name.trim().is_empty() => Some(name),
        _ => {
            errors.push("jarName: must not be blank".to_string());
            None
        }
    };

    let timestamp_ms = match raw.time_stamp.as_deref() {
        None => {
            errors.push("timeStamp: must not be null".to_string());
            None
        }
        Some(text) => match text.trim().parse::<i64>() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.push("timeStamp: must be an integer".to_string());
                None
            }
        },
    };

    let declared_size = match raw.file_size.as_deref() {
        None => {
            errors.push("fileSize: must not be null".to_string());
            None
        }
        Some(text) => match text.trim().parse::<u64>() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.push("fileSize: must be an integer".to_string());
                None
            }
        },
    };

    let ciphertext = match raw.ciphertext {
        Some(tag) if !tag.trim().is_empty() => Some(tag),
        _ => {
            errors.push("ciphertext: must not be blank".to_string());
            None
        }
    };

    let payload = match raw.file {
        Some(bytes) => Some(bytes),
        None => {
            errors.push("file: must not be null".to_string());
            None
        }
    };

    match (artifact_name, timestamp_ms, declared_size, ciphertext, payload) {
        (Some(artifact_name), Some(timestamp_ms), Some(declared_size), Some(ciphertext), Some(payload))
            if errors.is_empty() =>
        {
            Ok(DeployRequest {
                artifact_name,
                timestamp_ms,
                declared_size,
                ciphertext,
                payload,
            })
        }
        _ => Err(Error::Validation {
            message: if errors.is_empty() {
                PARAM_ERROR_MSG.to_string()
            } else {
                errors.join("; ")
            },
        }),
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub build: String,
    pub uptime_seconds: u64,
}

/// GET /health - liveness and build information
pub async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime_seconds = SystemTime::now()
        .duration_since(state.start_time)
        .unwrap_or_default()
        .as_secs();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: build::SHORT_COMMIT.to_string(),
        uptime_seconds,
    })
}

/// GET /metrics - Prometheus text exposition
pub async fn handle_metrics() -> impl IntoResponse {
    crate::metrics::gather_metrics()
}

/// Fallback for unknown routes
pub async fn handle_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::fail("resource not found")),
    )
}
