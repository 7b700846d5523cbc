pub mod loader;
pub mod models;

pub use loader::{apply_env_overrides, example_config, load_config, DEFAULT_CONFIG_FILE};
pub use models::{ConnectionTarget, LogRotation, RetryConfig, RetryPolicy, ToolPaths, TransferConfig};
