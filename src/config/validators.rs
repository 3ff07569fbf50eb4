use std::net::SocketAddr;

use crate::config::types::{DeploymentMode, SystemConfig};
use crate::types::{Error, Result};

const MAX_UPLOAD_SIZE_BYTES: u64 = 1024 * 1024 * 1024; // 1GB

fn validation_error(field: &str, message: impl Into<String>) -> Error {
    Error::Validation {
        message: format!("{}: {}", field, message.into()),
    }
}

/// Parse a human-readable size string ("1000", "1KB", "100MB", "1GB")
pub fn parse_size_string(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim();
    if size.is_empty() {
        return Err("size cannot be empty".to_string());
    }

    let upper = size.to_uppercase();
    let (digits, multiplier) = if let Some(prefix) = upper.strip_suffix("GB") {
        (prefix, 1024 * 1024 * 1024)
    } else if let Some(prefix) = upper.strip_suffix("MB") {
        (prefix, 1024 * 1024)
    } else if let Some(prefix) = upper.strip_suffix("KB") {
        (prefix, 1024)
    } else {
        (upper.as_str(), 1)
    };

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid size '{}'", size))?;
    Ok(value * multiplier)
}

pub fn validate_listen_address(listen: &str, field: &str) -> Result<()> {
    listen
        .parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| validation_error(field, format!("invalid listen address '{}': {}", listen, e)))
}

pub fn validate_positive_timeout(value: u64, field: &str) -> Result<()> {
    if value == 0 {
        return Err(validation_error(field, "timeout must be greater than zero"));
    }
    Ok(())
}

pub fn validate_upload_size(size: &str, field: &str) -> Result<()> {
    let bytes = parse_size_string(size).map_err(|e| validation_error(field, e))?;
    if bytes == 0 {
        return Err(validation_error(field, "size must be greater than zero"));
    }
    if bytes > MAX_UPLOAD_SIZE_BYTES {
        return Err(validation_error(field, "size exceeds the 1GB limit"));
    }
    Ok(())
}

pub fn validate_log_level(level: &str, field: &str) -> Result<()> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        other => Err(validation_error(
            field,
            format!("unknown log level '{}'", other),
        )),
    }
}

pub fn validate_log_format(format: &str, field: &str) -> Result<()> {
    match format {
        "json" | "pretty" => Ok(()),
        other => Err(validation_error(
            field,
            format!("unknown log format '{}'", other),
        )),
    }
}

impl SystemConfig {
    /// Validate the loaded configuration, reporting the first offending
    /// field by path.
    pub fn validate(&self) -> Result<()> {
        validate_listen_address(&self.server.listen, "server.listen")?;
        validate_upload_size(&self.server.max_upload_size, "server.max_upload_size")?;
        validate_positive_timeout(self.server.request_timeout, "server.request_timeout")?;
        validate_positive_timeout(self.server.shutdown_timeout, "server.shutdown_timeout")?;

        if self.deploy.salt.trim().is_empty() {
            return Err(validation_error("deploy.salt", "salt cannot be empty"));
        }
        if self.deploy.artifact_dir.trim().is_empty() {
            return Err(validation_error(
                "deploy.artifact_dir",
                "artifact directory cannot be empty",
            ));
        }
        if !self.deploy.artifact_suffix.starts_with('.') || self.deploy.artifact_suffix.len() < 2 {
            return Err(validation_error(
                "deploy.artifact_suffix",
                format!(
                    "suffix '{}' must start with '.' and name an extension",
                    self.deploy.artifact_suffix
                ),
            ));
        }
        validate_positive_timeout(self.deploy.script_timeout, "deploy.script_timeout")?;
        if self.deploy.timeout.value == 0 {
            return Err(validation_error(
                "deploy.timeout.value",
                "freshness window must be greater than zero",
            ));
        }
        if self.deploy.timeout.as_millis() == 0 {
            return Err(validation_error(
                "deploy.timeout",
                "freshness window truncates to zero milliseconds",
            ));
        }

        if self.deploy.scripts.single_node.trim().is_empty() {
            return Err(validation_error(
                "deploy.scripts.single_node",
                "script path cannot be empty",
            ));
        }
        if self.deploy.mode == DeploymentMode::Cluster
            && self
                .deploy
                .scripts
                .cluster
                .as_deref()
                .map(str::trim)
                .unwrap_or("")
                .is_empty()
        {
            return Err(validation_error(
                "deploy.scripts.cluster",
                "cluster mode requires a cluster script path",
            ));
        }

        validate_log_level(&self.logging.level, "logging.level")?;
        validate_log_format(&self.logging.format, "logging.format")?;

        Ok(())
    }
}
