//! Aggregate statistics, correlation and regression over result records

use benchlens_common::{RecordField, TestRun};
use indexmap::IndexMap;
use serde::Serialize;

/// Summary of one metric over a set of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricSummary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl MetricSummary {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            avg: values.iter().sum::<f64>() / values.len() as f64,
            min,
            max,
            count: values.len(),
        }
    }
}

/// Summarize each requested metric over its defined, positive values.
/// A metric without any such value summarizes to all zeros.
pub fn aggregate<'a, I>(records: I, metrics: &[RecordField]) -> IndexMap<RecordField, MetricSummary>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    let records: Vec<&TestRun> = records.into_iter().collect();

    metrics
        .iter()
        .map(|&metric| {
            let values: Vec<f64> = records
                .iter()
                .filter_map(|run| metric.numeric(run))
                .filter(|value| *value > 0.0)
                .collect();
            (metric, MetricSummary::from_values(&values))
        })
        .collect()
}

/// Every value equals the first. The computed variance of such input is
/// not always exactly zero.
fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|value| *value == values[0])
}

/// Pearson correlation coefficient of paired samples.
///
/// Returns `None` for fewer than two pairs or when either side has no
/// variance. Extra values on the longer side are ignored.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }

    let (xs, ys) = (&xs[..n], &ys[..n]);
    if is_constant(xs) || is_constant(ys) {
        return None;
    }

    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let (mut covariance, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    Some((covariance / denominator).clamp(-1.0, 1.0))
}

/// Least-squares fit `y = slope * x + intercept`.
///
/// Returns `None` for fewer than two points or when all x are equal.
pub fn linear_regression(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = points.len() as f64;
    if points.len() < 2 || points.iter().all(|(x, _)| *x == points[0].0) {
        return None;
    }

    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();

    let mean_x = sum_x / n;
    let mean_y = sum_y / n;

    let numerator = sum_xy - n * mean_x * mean_y;
    let denominator = sum_x2 - n * mean_x * mean_x;
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    let slope = numerator / denominator;
    Some((slope, mean_y - slope * mean_x))
}
