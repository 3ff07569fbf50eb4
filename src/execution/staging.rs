use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::types::{Error, ExecutionError, Result};

/// A copy of the deployment script materialized to an executable
/// temporary file. The file is removed when the value drops, so cleanup
/// covers every exit path: success, script failure, and launch failure.
pub struct StagedScript {
    file: NamedTempFile,
}

impl StagedScript {
    /// Copy `source` to a fresh temporary file and set the executable bit.
    pub async fn materialize(source: &Path) -> Result<Self> {
        let contents = tokio::fs::read(source).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Execution(ExecutionError::ScriptNotFound {
                    path: source.display().to_string(),
                })
            } else {
                Error::Io(e)
            }
        })?;

        let mut file = tempfile::Builder::new()
            .prefix("deploy-script-")
            .suffix(".sh")
            .tempfile()?;
        file.write_all(&contents)?;
        file.flush()?;

        let mut permissions = std::fs::metadata(file.path())?.permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(file.path(), permissions)?;

        debug!(
            source = %source.display(),
            staged = %file.path().display(),
            "Staged deployment script"
        );

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
