use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::models::RunReport;

/// Persists run reports to a JSON file
pub struct ReportStore {
    report_path: PathBuf,
}

impl ReportStore {
    pub fn new(report_path: PathBuf) -> Self {
        Self { report_path }
    }

    pub fn path(&self) -> &Path {
        &self.report_path
    }

    /// Load the last saved report, if any
    pub async fn load(&self) -> Result<Option<RunReport>> {
        if !self.report_path.exists() {
            return Ok(None);
        }

        debug!("Loading report from: {}", self.report_path.display());

        let content = tokio::fs::read_to_string(&self.report_path).await
            .context("Failed to read report file")?;

        let report: RunReport = serde_json::from_str(&content)
            .context("Failed to parse report file")?;

        Ok(Some(report))
    }

    /// Save with atomic write and fsync
    pub async fn save(&self, report: &RunReport) -> Result<()> {
        let temp_path = self.report_path.with_extension("tmp");

        debug!("Saving report atomically to: {}", self.report_path.display());

        if let Some(parent) = self.report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await
                .context("Failed to create report directory")?;
        }

        // 1. Write to temporary file
        let json = serde_json::to_string_pretty(report)
            .context("Failed to serialize report")?;

        tokio::fs::write(&temp_path, &json).await
            .context("Failed to write temporary report file")?;

        // 2. fsync temporary file
        let temp_file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&temp_path)
            .await?;

        temp_file.sync_all().await
            .context("Failed to sync temporary report file")?;

        drop(temp_file);

        // 3. Atomic rename
        tokio::fs::rename(&temp_path, &self.report_path).await
            .context("Failed to rename temporary report file")?;

        debug!("Report saved successfully");
        Ok(())
    }
}
