use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::staging::StagedScript;
use crate::types::{Error, ExecutionError, Result, ScriptResult};

/// Maximum size of the captured combined output
const MAX_OUTPUT_SIZE: usize = 16 * 1024; // 16KB

/// Runs the deployment script as a child process with a hard timeout.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    /// Maximum time to wait for the script before killing it
    pub timeout: Duration,
}

impl ScriptRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Execute `script` with the given positional arguments, capturing
    /// stdout and stderr to completion before interpreting the exit code.
    /// Exit code 0 is the only success path.
    pub async fn run(&self, script: &Path, args: &[String]) -> Result<ScriptResult> {
        ensure_executable(script).await?;

        let script_str = script.display().to_string();
        debug!(
            script = %script_str,
            args = ?args,
            timeout_secs = self.timeout.as_secs(),
            "Executing deployment script"
        );

        let start_time = Instant::now();

        let mut cmd = Command::new(script);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let execution_result = timeout(self.timeout, cmd.output()).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        match execution_result {
            Ok(Ok(output)) => {
                let combined = merge_output(&output.stdout, &output.stderr);
                // A signal-terminated child has no exit code
                let exit_code = output.status.code().unwrap_or(-1);

                debug!(
                    script = %script_str,
                    exit_code = exit_code,
                    duration_ms = duration_ms,
                    output_len = combined.len(),
                    "Deployment script completed"
                );

                if exit_code != 0 {
                    warn!(
                        script = %script_str,
                        exit_code = exit_code,
                        output = %combined,
                        "Deployment script failed with non-zero exit code"
                    );
                    return Err(ExecutionError::NonZeroExit {
                        script: script_str,
                        code: exit_code,
                        output: combined,
                    }
                    .into());
                }

                Ok(ScriptResult {
                    output: combined,
                    exit_code,
                    duration_ms,
                })
            }
            Ok(Err(io_error)) => {
                warn!(
                    script = %script_str,
                    error = %io_error,
                    "Failed to start deployment script"
                );
                Err(ExecutionError::StartFailed {
                    script: script_str,
                    source: io_error,
                }
                .into())
            }
            Err(_elapsed) => {
                // kill_on_drop terminates the child when the future drops
                warn!(
                    script = %script_str,
                    timeout_secs = self.timeout.as_secs(),
                    "Deployment script timed out, child terminated"
                );
                Err(ExecutionError::Timeout {
                    script: script_str,
                    timeout: self.timeout.as_secs(),
                }
                .into())
            }
        }
    }

    /// Stage `source` to an executable temporary file and run the copy.
    /// The staged copy is removed whether the run succeeds, fails, or
    /// never starts.
    pub async fn run_staged(&self, source: &Path, args: &[String]) -> Result<ScriptResult> {
        let staged = StagedScript::materialize(source).await?;
        self.run(staged.path(), args).await
    }
}

/// Fail fast if the script is missing or lacks an executable bit
async fn ensure_executable(script: &Path) -> Result<()> {
    let metadata = match tokio::fs::metadata(script).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExecutionError::ScriptNotFound {
                path: script.display().to_string(),
            }
            .into());
        }
        Err(e) => return Err(Error::Io(e)),
    };

    if !metadata.is_file() {
        return Err(ExecutionError::ScriptNotFound {
            path: script.display().to_string(),
        }
        .into());
    }

    if metadata.permissions().mode() & 0o111 == 0 {
        return Err(ExecutionError::ScriptNotExecutable {
            path: script.display().to_string(),
        }
        .into());
    }

    Ok(())
}

/// Merge captured stdout and stderr into one output text, truncated to
/// `MAX_OUTPUT_SIZE`.
fn merge_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&String::from_utf8_lossy(stderr));
    }

    if combined.len() > MAX_OUTPUT_SIZE {
        let mut end = MAX_OUTPUT_SIZE;
        while !combined.is_char_boundary(end) {
            end -= 1;
        }
        combined.truncate(end);
        combined.push_str("... [truncated]");
    }
    combined
}
