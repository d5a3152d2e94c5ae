//! BenchLens analytics engine
//!
//! This crate turns in-memory storage benchmark records into comparison and
//! chart data:
//! - Workload fingerprinting and cross-host comparison scoring
//! - Heatmap cells with a relative color scale
//! - Classified scatter points, trend lines and correlation
//! - Stratified sampling, trend series and aggregate statistics
//!
//! Every operation is a pure function over borrowed records.

pub mod cache;
pub mod comparison;
pub mod filter;
pub mod format;
pub mod inventory;
pub mod stats;
pub mod visualization;

pub use benchlens_common::{FieldValue, Metric, RecordField, TestRun};
pub use cache::{ColorCache, ColorCacheStats};
pub use comparison::{
    compare, fingerprint, group_by_configuration, Configuration, ConfigurationComparator,
    ConfigurationComparison, ConfigurationGroup, HostComparisonData,
};
pub use filter::RecordFilter;
pub use format::{format_metric, format_number, format_optional};
pub use inventory::{block_size_bytes, server_inventory, FilterOptions, ServerInfo};
pub use stats::{aggregate, linear_regression, pearson_correlation, MetricSummary};
pub use visualization::{
    annotate_history, build_heatmap, build_scatter, color_for_value, heatmap_cells,
    relative_color_scale, scatter_points, stratified_sample, trend_series, trend_series_grouped,
    ChartDataPoint, ColorScale, Heatmap, HeatmapCell, History, HistoryPoint, HistorySummary,
    PerformanceZone, SampleOptions, ScatterPlot, ScatterPoint, TrendLine, TrendSeries,
};
