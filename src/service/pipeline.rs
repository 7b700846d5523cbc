use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::config::{ConnectionTarget, RetryPolicy, TransferConfig};
use crate::core::{Exporter, Importer, ReadinessProber};
use crate::platform::CommandRunner;
use crate::state::{RunOutcome, RunReport};

/// Readiness-gated dump-then-load run
pub struct TransferPipeline<'a, R> {
    config: &'a TransferConfig,
    runner: R,
}

impl<'a, R> TransferPipeline<'a, R>
where
    R: CommandRunner + Sync,
{
    pub fn new(config: &'a TransferConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run every phase in order and stop at the first failure
    pub async fn run(&self) -> RunReport {
        let config = self.config;
        let mut report = RunReport::begin(config.artifact_path.clone());

        info!("Starting ELT process: {} -> {}", config.source, config.destination);

        let policy = config.retry.policy();
        debug!(
            "Readiness budget: {} checks, at most {:?} between them ({:?} total)",
            policy.max_attempts, policy.interval, policy.max_wait()
        );

        let (outcome, failure) = match self.run_phases(&policy, &mut report).await {
            Ok(()) => (RunOutcome::Success, None),
            Err((outcome, cause)) => (outcome, Some(cause)),
        };

        report.artifact_bytes = Self::artifact_size(&config.artifact_path).await;
        report.finish(outcome, failure);

        match &report.error {
            None => info!("ELT process completed"),
            Some(cause) => error!("ELT process failed ({}): {}", report.outcome, cause),
        }

        report
    }

    async fn run_phases(&self, policy: &RetryPolicy, report: &mut RunReport) -> Result<(), (RunOutcome, String)> {
        let config = self.config;

        self.await_ready(&config.source, policy, report).await?;

        if config.wait_for_destination {
            self.await_ready(&config.destination, policy, report).await?;
        }

        Exporter::new(&self.runner, &config.tools)
            .export(&config.source, &config.artifact_path)
            .await
            .map_err(|e| (RunOutcome::ExportFailed, e.to_string()))?;

        Importer::new(&self.runner, &config.tools)
            .verify_artifact(config.verify_artifact)
            .import(&config.destination, &config.artifact_path)
            .await
            .map_err(|e| (RunOutcome::ImportFailed, e.to_string()))?;

        Ok(())
    }

    async fn await_ready(
        &self,
        target: &ConnectionTarget,
        policy: &RetryPolicy,
        report: &mut RunReport,
    ) -> Result<(), (RunOutcome, String)> {
        let probe = ReadinessProber::new(&self.runner, &self.config.tools)
            .probe(target, policy)
            .await;
        report.probe_attempts += probe.attempts;

        if probe.ready {
            Ok(())
        } else {
            Err((
                RunOutcome::ReadinessTimeout,
                format!("{} not ready after {} attempts", target.host, probe.attempts),
            ))
        }
    }

    async fn artifact_size(path: &Path) -> Option<u64> {
        match tokio::fs::metadata(path).await {
            Ok(m) if m.is_file() => Some(m.len()),
            Ok(_) => None,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Cannot inspect artifact {}: {}", path.display(), e);
                }
                None
            }
        }
    }
}
