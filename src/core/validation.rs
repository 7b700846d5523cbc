use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::config::{ConnectionTarget, TransferConfig};

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub warnings: Vec<String>,
}

/// Check a transfer can start; hard problems are errors, soft ones come back as warnings
pub async fn validate_transfer(config: &TransferConfig) -> Result<ValidationResult> {
    let mut warnings = Vec::new();

    debug!("Validating transfer: {} -> {}", config.source, config.destination);

    // 1. Retry budget
    if config.retry.max_attempts == 0 {
        bail!("retry.max_attempts must be at least 1");
    }

    // 2. Connection targets
    validate_target("source", &config.source, &mut warnings)?;
    validate_target("destination", &config.destination, &mut warnings)?;

    if config.source.same_database(&config.destination) {
        bail!("Source and destination cannot be the same database: {}", config.source);
    }

    // 3. Artifact location
    let artifact = &config.artifact_path;
    if artifact.as_os_str().is_empty() {
        bail!("artifact_path cannot be empty");
    }

    if artifact.is_dir() {
        bail!("artifact_path is a directory: {}", artifact.display());
    }

    if let Some(parent) = artifact.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            tokio::fs::create_dir_all(parent).await
                .context("Cannot create artifact directory")?;
            debug!("Created artifact directory: {}", parent.display());
        } else if !parent.is_dir() {
            bail!("Artifact parent exists but is not a directory: {}", parent.display());
        }
    }

    if artifact.exists() {
        debug!("Artifact from a previous run will be overwritten: {}", artifact.display());
    }

    // 4. Soft checks
    if !config.wait_for_destination {
        warnings.push(format!(
            "Destination {} is not probed before the transfer",
            config.destination.host
        ));
    }

    if !config.verify_artifact {
        warnings.push("Artifact verification before load is disabled".to_string());
    }

    Ok(ValidationResult {
        is_valid: true,
        warnings,
    })
}

fn validate_target(role: &str, target: &ConnectionTarget, warnings: &mut Vec<String>) -> Result<()> {
    if target.host.trim().is_empty() {
        bail!("{} host cannot be empty", role);
    }

    if target.user.trim().is_empty() {
        bail!("{} user cannot be empty", role);
    }

    if target.dbname.trim().is_empty() {
        bail!("{} dbname cannot be empty", role);
    }

    if target.port == Some(0) {
        bail!("{} port cannot be 0", role);
    }

    if target.password.is_empty() {
        warnings.push(format!("No {} password configured; relying on .pgpass or trust auth", role));
    }

    Ok(())
}
