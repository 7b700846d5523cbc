pub mod process;
pub mod traits;

#[cfg(test)]
pub mod fake;

pub use process::SystemRunner;
pub use traits::{run_checked, CommandError, CommandOutput, CommandRunner, Invocation};
