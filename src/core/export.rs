use std::path::Path;
use tracing::{debug, error, info};

use crate::config::{ConnectionTarget, ToolPaths};
use crate::core::error::ExportError;
use crate::core::invocation;
use crate::platform::{run_checked, CommandRunner};

/// Dumps the source database into the artifact file
pub struct Exporter<'a, R> {
    runner: &'a R,
    tools: &'a ToolPaths,
}

impl<'a, R> Exporter<'a, R>
where
    R: CommandRunner + Sync,
{
    pub fn new(runner: &'a R, tools: &'a ToolPaths) -> Self {
        Self { runner, tools }
    }

    /// Run the dump once. Returns after the tool exited, so on success the artifact is complete.
    pub async fn export(&self, source: &ConnectionTarget, artifact: &Path) -> Result<(), ExportError> {
        info!("Dumping the source database {} to {}...", source, artifact.display());

        Self::prepare_artifact_dir(artifact).await?;

        let invocation = invocation::dump(self.tools, source, artifact);
        let output = match run_checked(self.runner, &invocation).await {
            Ok(output) => output,
            Err(cause) => {
                let err = ExportError::Dump {
                    dbname: source.dbname.clone(),
                    cause,
                };
                error!("Error dumping the source database: {}", err);
                return Err(err);
            }
        };

        if !output.stderr.trim().is_empty() {
            debug!("{} stderr: {}", invocation.program, output.stderr.trim());
        }

        info!("Successfully dumped the source database");
        Ok(())
    }

    async fn prepare_artifact_dir(artifact: &Path) -> Result<(), ExportError> {
        let Some(parent) = artifact.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        if !parent.exists() {
            tokio::fs::create_dir_all(parent).await
                .map_err(|source| ExportError::ArtifactDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            debug!("Created artifact directory: {}", parent.display());
        }

        Ok(())
    }
}
