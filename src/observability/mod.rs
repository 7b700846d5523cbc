pub mod logger;

#[cfg(test)]
pub mod capture;

pub use logger::{init_logging, shutdown_logging, Rotation};
