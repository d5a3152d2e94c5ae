//! Chart data for heatmaps, scatter plots and trend lines

pub mod color;
pub mod heatmap;
pub mod sampling;
pub mod scatter;
pub mod trend;

pub use color::{color_for_value, relative_color_scale, ColorScale, NEUTRAL_COLOR, PALETTE};
pub use heatmap::{build_heatmap, heatmap_cells, Heatmap, HeatmapCell};
pub use sampling::{stratified_sample, SampleOptions};
pub use scatter::{
    build_scatter, scatter_points, PerformanceZone, ScatterPlot, ScatterPoint, TrendLine,
};
pub use trend::{
    annotate_history, trend_series, trend_series_grouped, ChartDataPoint, History, HistoryPoint,
    HistorySummary, TrendSeries,
};
