//! Configured, parallel peak processing and vectorization on top of [`mzvector`].
mod batch;
mod config;
mod progress;

pub use batch::BatchProcessor;
pub use config::{ConfigError, ProcessOverrides, ProcessingConfig, ENV_PREFIX};
pub use progress::ProgressRecord;
