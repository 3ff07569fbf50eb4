//! Deployment pipeline: authenticate, validate, store, execute.
//!
//! Each request runs the stages in a fixed order and short-circuits on
//! the first failure; exactly one failure reason surfaces per request and
//! nothing is retried. The traversed stages are recorded on the report so
//! logs and tests can observe the linear state machine.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::auth;
use crate::config::SystemConfig;
use crate::execution::ScriptRunner;
use crate::storage::ArtifactStore;
use crate::types::{ConfigError, DeployStage, Error, Result, ScriptResult};
use crate::validate;

/// One deployment request, as handed over by the HTTP layer
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub artifact_name: String,
    /// Client-supplied milliseconds since epoch
    pub timestamp_ms: i64,
    /// Byte count the client signed into the authentication tag
    pub declared_size: u64,
    pub ciphertext: String,
    pub payload: Bytes,
}

/// Outcome of a successful pipeline run
#[derive(Debug)]
pub struct DeployReport {
    pub artifact_name: String,
    pub stored_path: PathBuf,
    pub script: ScriptResult,
    pub stages: Vec<DeployStage>,
}

/// Composes the verifier, validators, store, and runner into the
/// per-request pipeline. Configuration is read-only for the process
/// lifetime; the pipeline holds its own copies at startup.
#[derive(Debug, Clone)]
pub struct DeployPipeline {
    deploy: crate::config::DeployConfig,
    store: ArtifactStore,
    runner: ScriptRunner,
}

impl DeployPipeline {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            deploy: config.deploy.clone(),
            store: ArtifactStore::new(config.deploy.artifact_dir.clone()),
            runner: ScriptRunner::new(Duration::from_secs(config.deploy.script_timeout)),
        }
    }

    /// Run the full pipeline for one request. Every failure is terminal
    /// for the request; the client must resubmit.
    #[instrument(skip_all, fields(artifact = %request.artifact_name))]
    pub async fn execute(&self, request: DeployRequest) -> Result<DeployReport> {
        let mut stages = vec![DeployStage::Received];
        info!(
            declared_size = request.declared_size,
            timestamp_ms = request.timestamp_ms,
            "Received deployment request"
        );

        // Authenticate the ciphertext before anything else; a request that
        // fails here learns nothing about validation.
        if !auth::authenticate(
            &request.artifact_name,
            request.timestamp_ms,
            request.declared_size,
            &self.deploy.salt,
            &request.ciphertext,
        ) {
            return Err(Error::Unauthorized);
        }
        advance(&mut stages, DeployStage::Authenticated);

        validate::check_artifact_name(&request.artifact_name, &self.deploy.artifact_suffix)?;
        validate::check_declared_size(request.declared_size, request.payload.len() as u64)?;
        let now_ms = chrono::Utc::now().timestamp_millis();
        validate::check_freshness(request.timestamp_ms, now_ms, self.deploy.timeout.as_millis())?;
        advance(&mut stages, DeployStage::Validated);

        let stored_path = self
            .store
            .store(&request.artifact_name, &request.payload)
            .await?;
        advance(&mut stages, DeployStage::Stored);

        let script = self.run_script(&request.artifact_name).await?;
        advance(&mut stages, DeployStage::Executed);

        info!(
            exit_code = script.exit_code,
            duration_ms = script.duration_ms,
            "Deployment succeeded"
        );
        advance(&mut stages, DeployStage::Succeeded);

        Ok(DeployReport {
            artifact_name: request.artifact_name,
            stored_path,
            script,
            stages,
        })
    }

    async fn run_script(&self, artifact_name: &str) -> Result<ScriptResult> {
        let script = self.deploy.script_path().ok_or_else(|| {
            Error::Config(ConfigError::MissingField {
                field: format!("deploy.scripts.{}", self.deploy.mode),
            })
        })?;

        let args = vec![
            artifact_name.to_string(),
            self.deploy.artifact_dir.clone(),
        ];

        let result = if self.deploy.stage_script {
            self.runner.run_staged(Path::new(script), &args).await?
        } else {
            self.runner.run(Path::new(script), &args).await?
        };

        info!(
            script = %script,
            output = %result.output,
            "Deployment script output"
        );
        Ok(result)
    }
}

fn advance(stages: &mut Vec<DeployStage>, stage: DeployStage) {
    debug!(stage = %stage, "Pipeline stage reached");
    stages.push(stage);
}
