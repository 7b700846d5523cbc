use std::path::PathBuf;
use thiserror::Error;

use crate::platform::CommandError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot prepare artifact directory {}: {source}", .path.display())]
    ArtifactDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dump of database '{dbname}' failed: {cause}")]
    Dump {
        dbname: String,
        #[source]
        cause: CommandError,
    },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("artifact {} does not exist", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("artifact {} is empty", .0.display())]
    ArtifactEmpty(PathBuf),

    #[error("artifact {} is not a regular file", .0.display())]
    ArtifactNotFile(PathBuf),

    #[error("cannot inspect artifact {}: {source}", .path.display())]
    ArtifactUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("load into database '{dbname}' failed: {cause}")]
    Load {
        dbname: String,
        #[source]
        cause: CommandError,
    },
}
