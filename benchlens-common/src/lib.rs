//! Shared record model, key enums, configuration and error handling for
//! BenchLens.

pub mod types;
pub mod error;
pub mod config;
pub mod dataset;

pub use types::*;
pub use error::{BenchLensError, Result};
pub use config::{
    load_config, AnalyticsConfig, CacheConfig, ComparisonConfig, ConfigSource, SamplingConfig,
};
pub use dataset::{load_records, parse_records};
