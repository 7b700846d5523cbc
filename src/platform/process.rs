use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::traits::{CommandError, CommandOutput, CommandRunner, Invocation};

/// Runs invocations as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        debug!("Running: {}", invocation.command_line());

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            // Overlay applies to this child only; our own environment is untouched
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if invocation.capture_stdout {
            command.stdout(Stdio::piped());
        } else {
            command.stdout(Stdio::inherit());
        }

        let spawn_error = |source| CommandError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        let child = command.spawn().map_err(spawn_error)?;
        let output = child.wait_with_output().await.map_err(spawn_error)?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!("`{}` finished with {}", invocation.program, result.status_text());
        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let invocation = Invocation::new("sh")
            .args(["-c", "echo accepting connections; echo oops >&2; exit 3"])
            .capture_stdout();

        let output = SystemRunner::new().run(&invocation).await.unwrap();

        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "accepting connections");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn test_env_overlay_reaches_child_only() {
        let key = "PGHANDOFF_TEST_OVERLAY_SECRET";
        let script = format!("printf %s \"${}\"", key);
        let invocation = Invocation::new("sh")
            .args(["-c", script.as_str()])
            .env(key, "overlay-value")
            .capture_stdout();

        let output = SystemRunner::new().run(&invocation).await.unwrap();

        assert!(output.success);
        assert_eq!(output.stdout, "overlay-value");
        assert!(
            std::env::var(key).is_err(),
            "Overlay must not leak into the parent environment"
        );
        assert!(!invocation.args.iter().any(|a| a.contains("overlay-value")));
    }

    #[tokio::test]
    async fn test_child_inherits_parent_environment() {
        let invocation = Invocation::new("sh")
            .args(["-c", "printf %s \"$PATH\""])
            .env("PGPASSWORD", "x")
            .capture_stdout();

        let output = SystemRunner::new().run(&invocation).await.unwrap();
        assert!(!output.stdout.is_empty(), "PATH should be inherited");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let invocation = Invocation::new("pghandoff-definitely-not-a-real-binary");

        let err = SystemRunner::new().run(&invocation).await.unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }), "{:?}", err);
        assert!(err.to_string().contains("failed to start"));
    }
}
