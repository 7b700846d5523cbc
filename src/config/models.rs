use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of readiness checks before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default pause between readiness checks, in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 5;
const DEFAULT_ARTIFACT_FILE: &str = "data_dump.sql";
const DEFAULT_LOG_LEVEL: &str = "info";

#[inline]
fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

#[inline]
fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

#[inline]
fn default_artifact_path() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACT_FILE)
}

#[inline]
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[inline]
fn default_true() -> bool {
    true
}

/// Main transfer configuration, built once at startup and passed down by reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Database the dump is taken from
    pub source: ConnectionTarget,

    /// Database the dump is replayed into
    pub destination: ConnectionTarget,

    /// Readiness probe budget
    #[serde(default)]
    pub retry: RetryConfig,

    /// Intermediate SQL file handed from the dump phase to the load phase
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// Refuse to load a missing or empty artifact
    #[serde(default = "default_true")]
    pub verify_artifact: bool,

    /// Also probe the destination before dumping
    #[serde(default)]
    pub wait_for_destination: bool,

    /// Optional JSON run report location
    #[serde(default)]
    pub report_path: Option<PathBuf>,

    /// External tool programs
    #[serde(default)]
    pub tools: ToolPaths,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional log file directory (if None, only console logging)
    #[serde(default)]
    pub log_directory: Option<PathBuf>,

    /// Log file rotation strategy
    #[serde(default)]
    pub log_rotation: LogRotation,
}

/// Connection details for one PostgreSQL database
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,

    #[serde(default)]
    pub port: Option<u16>,

    pub user: String,

    /// Usually supplied through the environment rather than the config file
    #[serde(default)]
    pub password: String,

    pub dbname: String,
}

impl ConnectionTarget {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        dbname: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: None,
            user: user.into(),
            password: password.into(),
            dbname: dbname.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Same server and database, regardless of credentials
    pub fn same_database(&self, other: &ConnectionTarget) -> bool {
        self.host.eq_ignore_ascii_case(&other.host)
            && self.port == other.port
            && self.dbname == other.dbname
    }
}

// Password is never printed
impl fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("dbname", &self.dbname)
            .finish()
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}@{}:{}/{}", self.user, self.host, port, self.dbname),
            None => write!(f, "{}@{}/{}", self.user, self.host, self.dbname),
        }
    }
}

/// Readiness retry settings as they appear in the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.interval_secs))
    }
}

/// How many readiness checks to issue and how long to wait between them.
///
/// `max_attempts` is the exact number of checks performed when every one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on time spent sleeping between checks
    pub fn max_wait(&self) -> Duration {
        self.interval
            .saturating_mul(self.max_attempts.saturating_sub(1))
    }
}

/// Program names of the external PostgreSQL client tools
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolPaths {
    #[serde(default = "ToolPaths::default_pg_isready")]
    pub pg_isready: String,

    #[serde(default = "ToolPaths::default_pg_dump")]
    pub pg_dump: String,

    #[serde(default = "ToolPaths::default_psql")]
    pub psql: String,
}

impl ToolPaths {
    fn default_pg_isready() -> String {
        "pg_isready".to_string()
    }

    fn default_pg_dump() -> String {
        "pg_dump".to_string()
    }

    fn default_psql() -> String {
        "psql".to_string()
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            pg_isready: Self::default_pg_isready(),
            pg_dump: Self::default_pg_dump(),
            psql: Self::default_psql(),
        }
    }
}

/// Log file rotation strategy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate daily
    #[default]
    Daily,
    /// Rotate hourly
    Hourly,
    /// Never rotate (single file)
    Never,
}
