use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::{ConnectionTarget, RetryPolicy, ToolPaths};
use crate::core::invocation;
use crate::platform::{run_checked, CommandError, CommandRunner};

/// Text `pg_isready` prints once the server takes connections
pub const READY_MARKER: &str = "accepting connections";

/// Result of a readiness wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub ready: bool,
    /// Checks actually issued
    pub attempts: u32,
}

/// Why a single check did not count as ready
#[derive(Debug, Error)]
pub enum NotReady {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("probe output did not report \"accepting connections\": {0}")]
    Output(String),
}

pub struct ReadinessProber<'a, R> {
    runner: &'a R,
    tools: &'a ToolPaths,
}

impl<'a, R> ReadinessProber<'a, R>
where
    R: CommandRunner + Sync,
{
    pub fn new(runner: &'a R, tools: &'a ToolPaths) -> Self {
        Self { runner, tools }
    }

    /// True once the target accepts connections, false when the budget runs out
    pub async fn wait_ready(&self, target: &ConnectionTarget, policy: &RetryPolicy) -> bool {
        self.probe(target, policy).await.ready
    }

    /// Issue at most `policy.max_attempts` checks, sleeping `policy.interval` between them
    pub async fn probe(&self, target: &ConnectionTarget, policy: &RetryPolicy) -> ProbeReport {
        let max_attempts = policy.max_attempts;

        for attempt in 1..=max_attempts {
            info!("Waiting for {} to be ready (attempt {}/{})", target.host, attempt, max_attempts);

            match self.check(target).await {
                Ok(()) => {
                    info!("{} is accepting connections", target.host);
                    return ProbeReport { ready: true, attempts: attempt };
                }
                Err(e) => {
                    warn!("{} not ready (attempt {}/{}): {}", target.host, attempt, max_attempts, e);
                }
            }

            if attempt < max_attempts && !policy.interval.is_zero() {
                info!("Retrying in {:?}...", policy.interval);
                sleep(policy.interval).await;
            }
        }

        error!("{} did not become ready after {} attempts", target.host, max_attempts);
        ProbeReport { ready: false, attempts: max_attempts }
    }

    /// One readiness check
    async fn check(&self, target: &ConnectionTarget) -> Result<(), NotReady> {
        let invocation = invocation::readiness_probe(self.tools, target);
        let output = run_checked(self.runner, &invocation).await?;

        if output.stdout.contains(READY_MARKER) {
            Ok(())
        } else {
            Err(NotReady::Output(output.stdout.trim().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::{Scripted, ScriptedRunner};
    use crate::platform::CommandOutput;
    use std::time::{Duration, Instant};

    fn target() -> ConnectionTarget {
        ConnectionTarget::new("source_postgres", "postgres", "secret", "source_db")
    }

    fn no_wait(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    async fn probe_with(runner: &ScriptedRunner, policy: RetryPolicy) -> ProbeReport {
        let tools = ToolPaths::default();
        ReadinessProber::new(runner, &tools).probe(&target(), &policy).await
    }

    #[tokio::test]
    async fn test_ready_on_first_attempt() {
        let runner = ScriptedRunner::new().on("pg_isready", Scripted::ready());

        let report = probe_with(&runner, no_wait(5)).await;

        assert_eq!(report, ProbeReport { ready: true, attempts: 1 });
        assert_eq!(runner.calls_to("pg_isready"), 1);
    }

    #[tokio::test]
    async fn test_ready_on_third_attempt() {
        let runner = ScriptedRunner::new().on_each("pg_isready", [
            Scripted::no_response(),
            Scripted::no_response(),
            Scripted::ready(),
        ]);

        let report = probe_with(&runner, no_wait(5)).await;

        assert!(report.ready);
        assert_eq!(report.attempts, 3);
        assert_eq!(runner.calls_to("pg_isready"), 3, "No checks after the first success");
    }

    #[tokio::test]
    async fn test_always_failing_uses_exact_budget() {
        for max_attempts in 1..=6 {
            let runner = ScriptedRunner::new().on("pg_isready", Scripted::no_response());

            let report = probe_with(&runner, no_wait(max_attempts)).await;

            assert!(!report.ready);
            assert_eq!(report.attempts, max_attempts);
            assert_eq!(
                runner.calls_to("pg_isready") as u32,
                max_attempts,
                "Expected exactly {} checks",
                max_attempts
            );
        }
    }

    #[tokio::test]
    async fn test_ready_on_last_allowed_attempt() {
        let runner = ScriptedRunner::new().on_each("pg_isready", [
            Scripted::no_response(),
            Scripted::no_response(),
            Scripted::ready(),
        ]);

        let report = probe_with(&runner, no_wait(3)).await;
        assert_eq!(report, ProbeReport { ready: true, attempts: 3 });
    }

    #[tokio::test]
    async fn test_successful_exit_without_marker_is_not_ready() {
        let ambiguous = Scripted::Output(CommandOutput::exited(0, "source_postgres:5432 - rejecting connections\n", ""));
        let runner = ScriptedRunner::new().on("pg_isready", ambiguous);

        let tools = ToolPaths::default();
        let ready = ReadinessProber::new(&runner, &tools)
            .wait_ready(&target(), &no_wait(2))
            .await;

        assert!(!ready);
        assert_eq!(runner.calls_to("pg_isready"), 2);
    }

    #[tokio::test]
    async fn test_spawn_failure_counts_as_failed_attempt() {
        let runner = ScriptedRunner::new().on_each("pg_isready", [
            Scripted::SpawnError,
            Scripted::ready(),
        ]);

        let report = probe_with(&runner, no_wait(3)).await;
        assert_eq!(report, ProbeReport { ready: true, attempts: 2 });
    }

    #[tokio::test]
    async fn test_single_attempt_does_not_sleep() {
        let runner = ScriptedRunner::new().on("pg_isready", Scripted::no_response());
        let policy = RetryPolicy::new(1, Duration::from_secs(30));

        let started = Instant::now();
        let report = probe_with(&runner, policy).await;

        assert!(!report.ready);
        assert_eq!(runner.calls_to("pg_isready"), 1);
        assert!(started.elapsed() < Duration::from_secs(5), "Should not wait after the only attempt");
    }

    #[tokio::test]
    async fn test_sleeps_only_between_attempts() {
        let runner = ScriptedRunner::new().on("pg_isready", Scripted::no_response());
        let policy = RetryPolicy::new(3, Duration::from_millis(40));

        let started = Instant::now();
        let report = probe_with(&runner, policy).await;
        let elapsed = started.elapsed();

        assert!(!report.ready);
        assert!(elapsed >= Duration::from_millis(80), "Two pauses expected, took {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "Took {:?}", elapsed);
    }

    #[test]
    fn test_not_ready_message() {
        let err = NotReady::Output("db:5432 - no response".to_string());
        assert_eq!(
            err.to_string(),
            "probe output did not report \"accepting connections\": db:5432 - no response"
        );
    }
}
