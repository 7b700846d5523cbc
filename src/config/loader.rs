use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use super::models::TransferConfig;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pghandoff_config.json";

/// Overrides `source.password` when set
pub const SOURCE_PASSWORD_ENV: &str = "PGHANDOFF_SOURCE_PASSWORD";
/// Overrides `destination.password` when set
pub const DESTINATION_PASSWORD_ENV: &str = "PGHANDOFF_DESTINATION_PASSWORD";

/// Read the config file and apply environment overrides
pub async fn load_config(path: &Path) -> Result<TransferConfig> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file not found: {}\n\nCreate a config file first. Example:\n{}",
            path.display(),
            example_config()
        );
    }

    let content = tokio::fs::read_to_string(path).await
        .context("Failed to read config file")?;

    let mut config = parse_config(&content)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

pub fn parse_config(content: &str) -> Result<TransferConfig> {
    serde_json::from_str(content).context("Failed to parse config file")
}

/// Replace file passwords with values found through `lookup`.
///
/// Empty values are ignored so an exported-but-blank variable does not wipe a configured password.
pub fn apply_env_overrides<F>(config: &mut TransferConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(password) = lookup(SOURCE_PASSWORD_ENV).filter(|p| !p.is_empty()) {
        debug!("Source password taken from {}", SOURCE_PASSWORD_ENV);
        config.source.password = password;
    }

    if let Some(password) = lookup(DESTINATION_PASSWORD_ENV).filter(|p| !p.is_empty()) {
        debug!("Destination password taken from {}", DESTINATION_PASSWORD_ENV);
        config.destination.password = password;
    }
}

pub fn example_config() -> &'static str {
    r#"{
  "source": {
    "host": "source_postgres",
    "user": "postgres",
    "dbname": "source_db"
  },
  "destination": {
    "host": "destination_postgres",
    "user": "postgres",
    "dbname": "destination_db"
  },
  "retry": {
    "max_attempts": 5,
    "interval_secs": 5
  },
  "artifact_path": "data_dump.sql",
  "verify_artifact": true,
  "wait_for_destination": false,
  "report_path": "pghandoff_report.json",
  "log_level": "info",
  "log_directory": "./logs",
  "log_rotation": {
    "type": "daily"
  }
}"#
}
