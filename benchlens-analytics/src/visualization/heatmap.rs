//! Host × workload heatmaps

use super::color::{color_for_value, relative_color_scale, ColorScale};
use super::sampling::{stratified_sample, SampleOptions};
use crate::format::{format_metric, format_optional};
use benchlens_common::{Metric, TestRun, UNKNOWN};
use indexmap::IndexMap;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

/// One (host, pattern, block size) cell
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapCell<'a> {
    /// Host
    pub x: String,
    /// `"{block_size}-{pattern}"`
    pub y: String,
    /// Mean metric value over the cell's records
    pub value: f64,
    pub color: &'static str,
    pub tooltip: String,
    /// Number of records averaged into the cell
    pub count: usize,
    /// First record of the cell
    pub record: &'a TestRun,
}

/// Heatmap cells plus the scale needed to draw the legend
#[derive(Debug, Clone, Serialize)]
pub struct Heatmap<'a> {
    pub metric: Metric,
    pub cells: Vec<HeatmapCell<'a>>,
    pub scale: ColorScale,
    pub source_count: usize,
    /// Records left after sampling
    pub sampled_count: usize,
}

impl<'a> Heatmap<'a> {
    pub fn was_sampled(&self) -> bool {
        self.sampled_count < self.source_count
    }
}

/// Build heatmap cells and their color scale.
///
/// Inputs above `options.threshold` are first reduced with
/// [`stratified_sample`]. The scale covers the sampled records only. Cell
/// values are plain means of the metric, zeros included.
pub fn build_heatmap<'a, R>(
    records: &'a [TestRun],
    metric: Metric,
    options: &SampleOptions,
    rng: &mut R,
) -> Heatmap<'a>
where
    R: Rng + ?Sized,
{
    let sampled: Vec<&'a TestRun> = if records.len() > options.threshold {
        stratified_sample(records, options.sample_size, rng)
    } else {
        records.iter().collect()
    };

    let scale = relative_color_scale(sampled.iter().copied(), metric);

    let mut groups: IndexMap<(&'a str, &'a str, &'a str), Vec<&'a TestRun>> = IndexMap::new();
    for &run in &sampled {
        groups
            .entry((run.host(), run.read_write_pattern.as_str(), run.block_size.as_str()))
            .or_default()
            .push(run);
    }

    let cells: Vec<HeatmapCell<'a>> = groups
        .into_iter()
        .map(|((host, pattern, block_size), runs)| {
            let value = runs.iter().map(|run| metric.value(run)).sum::<f64>() / runs.len() as f64;
            HeatmapCell {
                x: host.to_string(),
                y: format!("{}-{}", block_size, pattern),
                value,
                color: color_for_value(value, &scale),
                tooltip: tooltip(metric, value, &runs),
                count: runs.len(),
                record: runs[0],
            }
        })
        .collect();

    debug!(
        "Built {} heatmap cells for {} from {} of {} records",
        cells.len(),
        metric,
        sampled.len(),
        records.len()
    );

    Heatmap {
        metric,
        cells,
        scale,
        source_count: records.len(),
        sampled_count: sampled.len(),
    }
}

/// Heatmap cells only. See [`build_heatmap`].
pub fn heatmap_cells<'a, R>(
    records: &'a [TestRun],
    metric: Metric,
    options: &SampleOptions,
    rng: &mut R,
) -> Vec<HeatmapCell<'a>>
where
    R: Rng + ?Sized,
{
    build_heatmap(records, metric, options, rng).cells
}

fn mean_of<F>(runs: &[&TestRun], read: F) -> Option<f64>
where
    F: Fn(&TestRun) -> Option<f64>,
{
    let values: Vec<f64> = runs.iter().filter_map(|&run| read(run)).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn tooltip(metric: Metric, value: f64, runs: &[&TestRun]) -> String {
    let first = runs[0];
    let mut lines = vec![
        format!("Host: {}", first.host()),
        format!(
            "Drive: {} ({})",
            first.drive_model.as_deref().unwrap_or(UNKNOWN),
            first.drive_type.as_deref().unwrap_or(UNKNOWN)
        ),
        format!("Pattern: {}", first.read_write_pattern),
        format!("Block Size: {}", first.block_size),
        format!("Queue Depth: {}", first.queue_depth),
        format!("{}: {}", metric.display_name(), format_metric(value, metric.unit())),
    ];

    if runs.len() > 1 {
        lines.push(format!("(Average of {} tests)", runs.len()));
    }

    let latency = mean_of(runs, |run| run.avg_latency);
    let bandwidth = mean_of(runs, |run| run.bandwidth);
    lines.push(format!("Latency: {}", format_optional(latency, "ms")));
    lines.push(format!("Bandwidth: {}", format_optional(bandwidth, "MB/s")));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(
        host: &str,
        bs: &str,
        pattern: &str,
        iops: Option<f64>,
        latency: Option<f64>,
    ) -> TestRun {
        TestRun {
            hostname: Some(host.to_string()),
            block_size: bs.to_string(),
            read_write_pattern: pattern.to_string(),
            queue_depth: 32,
            iops,
            avg_latency: latency,
            ..Default::default()
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(5)
    }

    #[test]
    fn test_two_host_example() {
        let records = vec![
            run("A", "4K", "randread", Some(1000.0), Some(0.5)),
            run("B", "4K", "randread", Some(1200.0), Some(0.4)),
        ];

        let heatmap = build_heatmap(&records, Metric::Iops, &SampleOptions::default(), &mut rng());
        assert_eq!(heatmap.cells.len(), 2);
        assert_eq!(heatmap.scale.min, 1000.0);
        assert_eq!(heatmap.scale.max, 1200.0);
        assert!(!heatmap.was_sampled());

        let a = &heatmap.cells[0];
        assert_eq!((a.x.as_str(), a.y.as_str(), a.value), ("A", "4K-randread", 1000.0));
        assert_eq!(a.color, heatmap.scale.colors[0]);
        let b = &heatmap.cells[1];
        assert_eq!((b.x.as_str(), b.y.as_str(), b.value), ("B", "4K-randread", 1200.0));
        assert_eq!(b.color, heatmap.scale.colors[17]);
    }

    #[test]
    fn test_cells_average_including_zero() {
        let records = vec![
            run("A", "4K", "randread", Some(1000.0), Some(1.0)),
            run("A", "4K", "randread", Some(0.0), Some(3.0)),
            run("A", "1M", "read", Some(50.0), None),
        ];

        let cells = heatmap_cells(&records, Metric::Iops, &SampleOptions::default(), &mut rng());
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].value, 500.0);
        assert_eq!(cells[0].count, 2);
        assert!(cells[0].tooltip.contains("(Average of 2 tests)"));
        assert!(cells[0].tooltip.contains("Latency: 2.00 ms"));
        assert!(cells[0].tooltip.contains("Bandwidth: N/A"));
        assert!(!cells[1].tooltip.contains("Average of"));
    }

    #[test]
    fn test_tooltip_contents() {
        let mut record = run("node-1", "64K", "write", Some(25000.0), Some(0.8));
        record.drive_model = Some("PM9A3".to_string());
        record.drive_type = Some("NVMe SSD".to_string());
        record.bandwidth = Some(1562.4);
        let records = vec![record];

        let cells = heatmap_cells(&records, Metric::Iops, &SampleOptions::default(), &mut rng());
        let expected = "Host: node-1\nDrive: PM9A3 (NVMe SSD)\nPattern: write\n\
                        Block Size: 64K\nQueue Depth: 32\nIOPS: 25,000 IOPS\n\
                        Latency: 0.80 ms\nBandwidth: 1,562 MB/s";
        assert_eq!(cells[0].tooltip, expected);
    }

    #[test]
    fn test_large_input_is_sampled() {
        let records: Vec<TestRun> = (0..1500)
            .map(|i| {
                let host = if i % 3 == 0 { "A" } else { "B" };
                run(host, "4K", "randread", Some(i as f64 + 1.0), None)
            })
            .collect();

        let options = SampleOptions::default();
        let heatmap = build_heatmap(&records, Metric::Iops, &options, &mut rng());
        assert!(heatmap.was_sampled());
        assert_eq!(heatmap.sampled_count, options.sample_size);
        assert_eq!(heatmap.source_count, 1500);
        assert_eq!(heatmap.cells.iter().map(|c| c.count).sum::<usize>(), options.sample_size);
    }

    #[test]
    fn test_sampling_starts_above_threshold() {
        let options = SampleOptions { threshold: 10, sample_size: 4, seed: Some(1) };
        let records: Vec<TestRun> = (0..11)
            .map(|i| run(if i % 2 == 0 { "A" } else { "B" }, "4K", "read", Some(100.0), None))
            .collect();

        let at_threshold =
            build_heatmap(&records[..10], Metric::Iops, &options, &mut options.rng());
        assert!(!at_threshold.was_sampled());
        assert_eq!(at_threshold.sampled_count, 10);
        assert_eq!(at_threshold.source_count, 10);

        let above = build_heatmap(&records, Metric::Iops, &options, &mut options.rng());
        assert!(above.was_sampled());
        assert_eq!(above.sampled_count, 4);
        assert_eq!(above.source_count, 11);
        assert_eq!(above.cells.iter().map(|c| c.count).sum::<usize>(), 4);
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<TestRun> = Vec::new();
        let heatmap =
            build_heatmap(&records, Metric::Bandwidth, &SampleOptions::default(), &mut rng());
        assert!(heatmap.cells.is_empty());
        assert!(heatmap.scale.is_empty());
    }
}
