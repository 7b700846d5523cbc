use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogRotation;

const LOG_FILE_NAME: &str = "pghandoff.log";

/// Must be kept alive until the run ends so buffered file output is flushed
static LOG_GUARD: OnceLock<Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> = OnceLock::new();

/// Log rotation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Daily,
    Hourly,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::Daily,
            LogRotation::Hourly => Rotation::Hourly,
            LogRotation::Never => Rotation::Never,
        }
    }
}

/// Install the process-wide subscriber: console always, file when `log_dir` is set.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_logging(
    level: &str,
    log_dir: Option<&Path>,
    rotation: Rotation,
) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    // Console layer - always enabled
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer);

    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)?;

        let file_appender = match rotation {
            Rotation::Daily => tracing_appender::rolling::daily(dir, LOG_FILE_NAME),
            Rotation::Hourly => tracing_appender::rolling::hourly(dir, LOG_FILE_NAME),
            Rotation::Never => tracing_appender::rolling::never(dir, LOG_FILE_NAME),
        };

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_ansi(false); // No ANSI colors in file

        subscriber.with(file_layer).try_init()?;

        LOG_GUARD.set(Mutex::new(Some(guard)))
            .map_err(|_| anyhow::anyhow!("Logger already initialized"))?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}

/// Flush and close the file writer, if one was installed
pub fn shutdown_logging() {
    if let Some(mutex) = LOG_GUARD.get() {
        if let Ok(mut guard_option) = mutex.lock() {
            if let Some(guard) = guard_option.take() {
                drop(guard);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_from_config() {
        assert_eq!(Rotation::from(LogRotation::Daily), Rotation::Daily);
        assert_eq!(Rotation::from(LogRotation::Hourly), Rotation::Hourly);
        assert_eq!(Rotation::from(LogRotation::Never), Rotation::Never);
    }

    #[test]
    fn test_shutdown_without_init_is_noop() {
        shutdown_logging();
    }
}
