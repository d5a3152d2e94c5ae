//! Line/trend chart series and per-host history annotation

use benchlens_common::{FieldValue, RecordField, TestRun};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataPoint {
    /// Category or numeric x value
    pub x: FieldValue,
    pub y: f64,
    pub label: String,
    pub group: Option<String>,
}

/// All points of one group key value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub name: String,
    pub points: Vec<ChartDataPoint>,
}

fn describe(run: &TestRun) -> String {
    format!("{} - {} {} QD{}", run.host(), run.block_size, run.read_write_pattern, run.queue_depth)
}

fn point(
    run: &TestRun,
    x_field: RecordField,
    y_field: RecordField,
    group: Option<&str>,
) -> ChartDataPoint {
    let label = describe(run);
    ChartDataPoint {
        x: x_field.value(run),
        y: y_field.numeric(run).unwrap_or(0.0),
        label: match group {
            Some(group) => format!("{}: {}", group, label),
            None => label,
        },
        group: group.map(str::to_string),
    }
}

/// One series per distinct value of `group_by`, in order of first
/// appearance. Records without a value are grouped under `"unknown"`.
pub fn trend_series_grouped<'a, I>(
    records: I,
    x_field: RecordField,
    y_field: RecordField,
    group_by: RecordField,
) -> Vec<TrendSeries>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    let mut series: IndexMap<String, Vec<ChartDataPoint>> = IndexMap::new();
    for run in records {
        let key = group_by.value(run).to_string();
        let data_point = point(run, x_field, y_field, Some(&key));
        series.entry(key).or_default().push(data_point);
    }

    series
        .into_iter()
        .map(|(name, points)| TrendSeries { name, points })
        .collect()
}

/// Chart points for a line/trend chart: one per record, or, when grouped,
/// the points of every group series one after another.
pub fn trend_series<'a, I>(
    records: I,
    x_field: RecordField,
    y_field: RecordField,
    group_by: Option<RecordField>,
) -> Vec<ChartDataPoint>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    match group_by {
        Some(group_by) => trend_series_grouped(records, x_field, y_field, group_by)
            .into_iter()
            .flat_map(|series| series.points)
            .collect(),
        None => records
            .into_iter()
            .map(|run| point(run, x_field, y_field, None))
            .collect(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPoint<'a> {
    pub timestamp: Option<String>,
    pub value: f64,
    pub unit: &'static str,
    /// Mean of this and the two previous values
    pub moving_avg: Option<f64>,
    /// Percent change from the previous value
    pub percent_change: Option<f64>,
    pub record: &'a TestRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_points: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub first: f64,
    pub last: f64,
    /// Percent change from first to last, absent when the first value is 0
    pub overall_change: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct History<'a> {
    pub field: RecordField,
    pub points: Vec<HistoryPoint<'a>>,
    pub summary: Option<HistorySummary>,
}

/// Order records by timestamp and annotate each value of `field` with a
/// 3-point moving average and the change from its predecessor. Records
/// without a value are skipped.
pub fn annotate_history<'a, I>(records: I, field: RecordField) -> History<'a>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    let mut series: Vec<(&'a TestRun, f64)> = records
        .into_iter()
        .filter_map(|run| field.numeric(run).map(|value| (run, value)))
        .collect();
    series.sort_by(|(a, _), (b, _)| {
        a.parsed_timestamp()
            .cmp(&b.parsed_timestamp())
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });

    let values: Vec<f64> = series.iter().map(|(_, value)| *value).collect();
    let points = series
        .iter()
        .enumerate()
        .map(|(i, &(run, value))| {
            let moving_avg = (i >= 2).then(|| values[i - 2..=i].iter().sum::<f64>() / 3.0);
            let percent_change = match i.checked_sub(1).map(|prev| values[prev]) {
                Some(prev) if prev != 0.0 => Some((value - prev) / prev * 100.0),
                _ => None,
            };

            HistoryPoint {
                timestamp: run.timestamp.clone(),
                value,
                unit: field.unit(),
                moving_avg,
                percent_change,
                record: run,
            }
        })
        .collect();

    let summary = match (values.first(), values.last()) {
        (Some(&first), Some(&last)) => Some(HistorySummary {
            total_points: values.len(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg: values.iter().sum::<f64>() / values.len() as f64,
            first,
            last,
            overall_change: (first != 0.0).then(|| (last - first) / first * 100.0),
        }),
        _ => None,
    };

    History { field, points, summary }
}
