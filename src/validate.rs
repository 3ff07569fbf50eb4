//! Pure request checks run before any file I/O: artifact-name shape,
//! declared-vs-actual size, and the freshness window.

use crate::types::{Error, UploadError};

/// Check the artifact name ends with the configured suffix and names a
/// plain file. Suffix first: it is the cheapest and most common failure.
pub fn check_artifact_name(name: &str, required_suffix: &str) -> Result<(), UploadError> {
    if !name.ends_with(required_suffix) {
        return Err(UploadError::BadSuffix {
            name: name.to_string(),
            required: required_suffix.to_string(),
        });
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(UploadError::UnsafeName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Guard against truncated or tampered transfers: the size the client
/// signed must be the size it sent.
pub fn check_declared_size(declared: u64, actual: u64) -> Result<(), UploadError> {
    if declared != actual {
        return Err(UploadError::SizeMismatch { declared, actual });
    }
    Ok(())
}

/// Reject requests whose timestamp falls outside the freshness window in
/// either direction. The bound is inclusive: a request aged exactly
/// `window_ms` still passes.
pub fn check_freshness(request_ts_ms: i64, now_ms: i64, window_ms: u64) -> Result<(), Error> {
    let elapsed = now_ms - request_ts_ms;
    if elapsed.unsigned_abs() > window_ms {
        return Err(Error::Stale {
            elapsed_ms: elapsed,
            window_ms,
        });
    }
    Ok(())
}
