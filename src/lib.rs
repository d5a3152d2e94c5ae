//! BenchLens comparative benchmark analytics
//!
//! Entry point crate bundling the record model and configuration from
//! `benchlens-common` with the comparison and chart processing of
//! `benchlens-analytics`.

pub use benchlens_analytics as analytics;
pub use benchlens_common as common;

pub mod prelude {
    pub use benchlens_analytics::*;
    pub use benchlens_common::{
        load_config, load_records, parse_records, AnalyticsConfig, BenchLensError, ConfigSource,
        Result,
    };
}

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` takes precedence over the
/// `verbose` switch.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "benchlens={level},benchlens_report={level},\
             benchlens_analytics={level},benchlens_common={level}"
        ))
    });

    // A second call, e.g. from tests, leaves the first subscriber in place
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
