use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request authentication failed")]
    Unauthorized,

    #[error("Request outside freshness window: elapsed {elapsed_ms}ms, window {window_ms}ms")]
    Stale { elapsed_ms: i64, window_ms: u64 },

    #[error("Invalid upload: {0}")]
    Upload(#[from] UploadError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Invalid request: {message}")]
    Validation { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Application error: {0}")]
    Application(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config file parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

/// Upload validation errors
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("artifact name '{name}' does not end with '{required}'")]
    BadSuffix { name: String, required: String },

    #[error("artifact name '{name}' contains path components")]
    UnsafeName { name: String },

    #[error("declared size {declared} does not match payload size {actual}")]
    SizeMismatch { declared: u64, actual: u64 },
}

/// Artifact persistence errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("could not create artifact directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write artifact {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Script execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("deployment script not found: {path}")]
    ScriptNotFound { path: String },

    #[error("deployment script is not executable: {path}")]
    ScriptNotExecutable { path: String },

    #[error("deployment script '{script}' could not be started: {source}")]
    StartFailed {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("deployment script '{script}' failed with exit code {code}")]
    NonZeroExit {
        script: String,
        code: i32,
        output: String,
    },

    #[error("deployment script '{script}' timed out after {timeout}s")]
    Timeout { script: String, timeout: u64 },
}

/// Type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage for a deployment request. The pipeline walks these in
/// order; any failure is terminal for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeployStage {
    Received,
    Authenticated,
    Validated,
    Stored,
    Executed,
    Succeeded,
}

impl std::fmt::Display for DeployStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeployStage::Received => "received",
            DeployStage::Authenticated => "authenticated",
            DeployStage::Validated => "validated",
            DeployStage::Stored => "stored",
            DeployStage::Executed => "executed",
            DeployStage::Succeeded => "succeeded",
        };
        f.write_str(name)
    }
}

/// Result of a deployment script run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptResult {
    /// Combined stdout and stderr, truncated to a fixed cap
    pub output: String,
    pub exit_code: i32,
    pub duration_ms: u64,
}
