pub mod core;
pub mod platform;
pub mod state;
pub mod service;
pub mod config;
pub mod observability;

pub use anyhow::{Context, Result};
