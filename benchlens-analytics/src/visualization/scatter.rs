//! Scatter plots with performance zones, trend line and correlation

use crate::stats::{linear_regression, pearson_correlation};
use benchlens_common::{RecordField, TestRun};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// Coarse classification of a single result by IOPS and average latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceZone {
    HighPerformance,
    Balanced,
    HighLatency,
    LowPerformance,
}

impl PerformanceZone {
    pub fn classify(run: &TestRun) -> Self {
        let latency = run.avg_latency.unwrap_or(0.0);
        let iops = run.iops.unwrap_or(0.0);

        if latency < 1.0 && iops > 50_000.0 {
            PerformanceZone::HighPerformance
        } else if latency < 5.0 && iops > 10_000.0 {
            PerformanceZone::Balanced
        } else if latency > 10.0 {
            PerformanceZone::HighLatency
        } else {
            PerformanceZone::LowPerformance
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            PerformanceZone::HighPerformance => "#22c55e",
            PerformanceZone::Balanced => "#f59e0b",
            PerformanceZone::HighLatency => "#ef4444",
            PerformanceZone::LowPerformance => "#6b7280",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceZone::HighPerformance => "High Performance",
            PerformanceZone::Balanced => "Balanced",
            PerformanceZone::HighLatency => "High Latency",
            PerformanceZone::LowPerformance => "Low Performance",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint<'a> {
    pub x: f64,
    pub y: f64,
    pub zone: PerformanceZone,
    pub color: &'static str,
    pub label: String,
    pub record: &'a TestRun,
}

/// End points of the least-squares line across the plotted x range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// Fit a line through the points, `None` when no line is defined.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        let (slope, intercept) = linear_regression(points)?;
        let min_x = points.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|(x, _)| *x).fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            start: (min_x, slope * min_x + intercept),
            end: (max_x, slope * max_x + intercept),
            slope,
            intercept,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterPlot<'a> {
    pub x_field: RecordField,
    pub y_field: RecordField,
    pub points: Vec<ScatterPoint<'a>>,
    pub trend_line: Option<TrendLine>,
    pub correlation: Option<f64>,
    pub zone_counts: IndexMap<PerformanceZone, usize>,
}

/// One classified point per record. Absent axis values plot at 0.
pub fn scatter_points<'a, I>(
    records: I,
    x_field: RecordField,
    y_field: RecordField,
) -> Vec<ScatterPoint<'a>>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    records
        .into_iter()
        .map(|run| {
            let zone = PerformanceZone::classify(run);
            ScatterPoint {
                x: x_field.numeric(run).unwrap_or(0.0),
                y: y_field.numeric(run).unwrap_or(0.0),
                zone,
                color: zone.color(),
                label: format!(
                    "{} - {} {} QD{}",
                    run.host(),
                    run.block_size,
                    run.read_write_pattern,
                    run.queue_depth
                ),
                record: run,
            }
        })
        .collect()
}

/// Scatter points together with trend line, correlation and zone counts
pub fn build_scatter<'a, I>(
    records: I,
    x_field: RecordField,
    y_field: RecordField,
) -> ScatterPlot<'a>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    let points = scatter_points(records, x_field, y_field);

    let pairs: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();

    let mut zone_counts = IndexMap::new();
    for point in &points {
        *zone_counts.entry(point.zone).or_insert(0) += 1;
    }

    let correlation = pearson_correlation(&xs, &ys);
    debug!(
        "Built scatter of {} points ({} vs {}), correlation {:?}",
        points.len(),
        x_field,
        y_field,
        correlation
    );

    ScatterPlot {
        x_field,
        y_field,
        trend_line: TrendLine::fit(&pairs),
        correlation,
        zone_counts,
        points,
    }
}
