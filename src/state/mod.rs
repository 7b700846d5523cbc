pub mod manager;
pub mod models;

pub use manager::ReportStore;
pub use models::{RunOutcome, RunReport};
