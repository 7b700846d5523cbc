use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Terminal status of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// A probed database never accepted connections within the retry budget
    ReadinessTimeout,
    ExportFailed,
    ImportFailed,
    Success,
}

impl RunOutcome {
    /// Process exit code reported to the outer scheduler
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Success => 0,
            RunOutcome::ReadinessTimeout => 1,
            RunOutcome::ExportFailed => 2,
            RunOutcome::ImportFailed => 3,
        }
    }

    pub fn is_success(self) -> bool {
        self == RunOutcome::Success
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RunOutcome::ReadinessTimeout => "readiness timeout",
            RunOutcome::ExportFailed => "export failed",
            RunOutcome::ImportFailed => "import failed",
            RunOutcome::Success => "success",
        };
        f.write_str(text)
    }
}

/// Summary of one run, persisted as JSON when a report path is configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for future migrations
    pub version: u32,

    pub outcome: RunOutcome,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Readiness checks issued across all probed targets
    pub probe_attempts: u32,

    pub artifact_path: PathBuf,

    /// Artifact size at the end of the run, if it exists
    pub artifact_bytes: Option<u64>,

    /// Cause of failure
    pub error: Option<String>,
}

impl RunReport {
    /// Report for a run starting now. Outcome stays `ReadinessTimeout` until the run says otherwise.
    pub fn begin(artifact_path: PathBuf) -> Self {
        Self {
            version: REPORT_SCHEMA_VERSION,
            outcome: RunOutcome::ReadinessTimeout,
            started_at: Utc::now(),
            finished_at: None,
            probe_attempts: 0,
            artifact_path,
            artifact_bytes: None,
            error: None,
        }
    }

    pub fn finish(&mut self, outcome: RunOutcome, error: Option<String>) {
        self.outcome = outcome;
        self.error = error;
        self.finished_at = Some(Utc::now());
    }

    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|f| f.signed_duration_since(self.started_at))
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }
}
