use std::path::Path;
use tracing::{debug, error, info};

use crate::config::{ConnectionTarget, ToolPaths};
use crate::core::error::ImportError;
use crate::core::invocation;
use crate::platform::{run_checked, CommandRunner};

/// Replays the artifact file into the destination database
pub struct Importer<'a, R> {
    runner: &'a R,
    tools: &'a ToolPaths,
    verify_artifact: bool,
}

impl<'a, R> Importer<'a, R>
where
    R: CommandRunner + Sync,
{
    pub fn new(runner: &'a R, tools: &'a ToolPaths) -> Self {
        Self {
            runner,
            tools,
            verify_artifact: true,
        }
    }

    /// Check the artifact exists and is non-empty before loading (on by default)
    pub fn verify_artifact(mut self, verify: bool) -> Self {
        self.verify_artifact = verify;
        self
    }

    /// Run the load once; no retry
    pub async fn import(&self, destination: &ConnectionTarget, artifact: &Path) -> Result<(), ImportError> {
        info!("Loading {} into the destination database {}...", artifact.display(), destination);

        if self.verify_artifact {
            if let Err(e) = Self::check_artifact(artifact).await {
                error!("Refusing to load: {}", e);
                return Err(e);
            }
        }

        let invocation = invocation::load(self.tools, destination, artifact);
        if let Err(cause) = run_checked(self.runner, &invocation).await {
            let err = ImportError::Load {
                dbname: destination.dbname.clone(),
                cause,
            };
            error!("Error loading the destination database: {}", err);
            return Err(err);
        }

        info!("Successfully loaded the destination database");
        Ok(())
    }

    async fn check_artifact(artifact: &Path) -> Result<(), ImportError> {
        let metadata = match tokio::fs::metadata(artifact).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImportError::ArtifactMissing(artifact.to_path_buf()));
            }
            Err(source) => {
                return Err(ImportError::ArtifactUnreadable {
                    path: artifact.to_path_buf(),
                    source,
                });
            }
        };

        if !metadata.is_file() {
            return Err(ImportError::ArtifactNotFile(artifact.to_path_buf()));
        }

        if metadata.len() == 0 {
            return Err(ImportError::ArtifactEmpty(artifact.to_path_buf()));
        }

        debug!("Artifact {} holds {} bytes", artifact.display(), metadata.len());
        Ok(())
    }
}
