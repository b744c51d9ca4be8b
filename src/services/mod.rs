pub mod pipeline;

pub use pipeline::TransactionPipeline;
