pub mod error;
pub mod export;
pub mod import;
pub mod invocation;
pub mod probe;
pub mod validation;

pub use error::{ExportError, ImportError};
pub use export::Exporter;
pub use import::Importer;
pub use probe::{ProbeReport, ReadinessProber, READY_MARKER};
pub use validation::{validate_transfer, ValidationResult};
