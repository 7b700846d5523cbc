pub mod pipeline;

pub use pipeline::TransferPipeline;
