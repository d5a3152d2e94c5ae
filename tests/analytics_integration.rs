//! End-to-end checks over records loaded from disk

use benchlens::prelude::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use tempfile::tempdir;

const TWO_HOSTS: &str = r#"[
    {
        "hostname": "A", "block_size": "4K", "read_write_pattern": "randread",
        "queue_depth": 32, "iops": 1000, "avg_latency": 0.5
    },
    {
        "hostname": "B", "block_size": "4K", "read_write_pattern": "randread",
        "queue_depth": 32, "iops": 1200, "avg_latency": 0.4
    }
]"#;

fn two_hosts() -> Vec<TestRun> {
    parse_records(TWO_HOSTS).unwrap()
}

#[test]
fn test_two_host_comparison() {
    let records = two_hosts();
    let comparisons = compare(&records, NonZeroUsize::new(2).unwrap(), 0.5);

    assert_eq!(comparisons.len(), 1);
    let comparison = &comparisons[0];
    assert_eq!(comparison.coverage, 1.0);
    assert!(comparison.has_all_hosts);
    assert_eq!(comparison.host_data.len(), 2);
    assert_eq!(comparison.best_host(Metric::Iops).unwrap().hostname, "B");

    let relative = comparison.relative_to_best(Metric::Iops);
    assert!((relative[0] - 1000.0 / 1200.0).abs() < 1e-12);
    assert_eq!(relative[1], 1.0);
}

#[test]
fn test_two_host_heatmap() {
    let records = two_hosts();
    let mut rng = StdRng::seed_from_u64(1);
    let options = SampleOptions::default();
    let heatmap = build_heatmap(&records, Metric::from_key("iops"), &options, &mut rng);

    assert_eq!(heatmap.cells.len(), 2);
    let hosts: HashSet<&str> = heatmap.cells.iter().map(|c| c.x.as_str()).collect();
    assert_eq!(hosts, HashSet::from(["A", "B"]));
    assert!(heatmap.cells.iter().all(|c| c.y == "4K-randread"));
    assert_eq!(heatmap.cells[0].value, 1000.0);
    assert_eq!(heatmap.cells[1].value, 1200.0);
    assert_eq!((heatmap.scale.min, heatmap.scale.max), (1000.0, 1200.0));
}

#[test]
fn test_aggregate_excludes_zero() {
    let records = parse_records(r#"[{"iops": 0}, {"iops": 100}]"#).unwrap();
    let summary = aggregate(&records, &[RecordField::from_key("iops")]);
    assert_eq!(
        summary[&RecordField::Iops],
        MetricSummary { avg: 100.0, min: 100.0, max: 100.0, count: 1 }
    );
}

#[test]
fn test_unknown_keys_fall_back_to_iops() {
    let records = two_hosts();
    let mut rng = StdRng::seed_from_u64(1);
    let metric = Metric::from_key("throughput_per_watt");
    let heatmap = build_heatmap(&records, metric, &SampleOptions::default(), &mut rng);
    assert_eq!(heatmap.metric, Metric::Iops);

    let points = scatter_points(&records, RecordField::from_key("nope"), RecordField::AvgLatency);
    assert_eq!(points[0].x, 1000.0);
}

#[test]
fn test_non_positive_metric_gives_neutral_scale() {
    let records =
        parse_records(r#"[{"hostname": "A", "bandwidth": 0}, {"hostname": "B"}]"#).unwrap();
    let scale = relative_color_scale(&records, Metric::Bandwidth);
    assert_eq!(scale, ColorScale::empty());
    assert_eq!(color_for_value(42.0, &scale), benchlens::analytics::visualization::NEUTRAL_COLOR);
}

#[test]
fn test_pipeline_from_files() {
    let dir = tempdir().unwrap();

    let config_path = dir.path().join("benchlens.toml");
    std::fs::write(
        &config_path,
        "[comparison]\nmin_coverage = 1.0\n\n\
         [sampling]\nthreshold = 10\nsample_size = 6\nseed = 3\n",
    )
    .unwrap();
    let config = load_config(ConfigSource::File(config_path)).unwrap();

    let mut records = Vec::new();
    for (i, host) in ["A", "B", "C"].iter().cycle().take(30).enumerate() {
        records.push(serde_json::json!({
            "hostname": host,
            "protocol": "NVMe",
            "block_size": if i % 2 == 0 { "4K" } else { "1M" },
            "read_write_pattern": "randread",
            "queue_depth": 32,
            "iops": 1000 + i,
            "timestamp": format!("2025-01-{:02}T00:00:00", i + 1),
        }));
    }
    let data_path = dir.path().join("results.json");
    let envelope = serde_json::json!({ "data": records });
    std::fs::write(&data_path, serde_json::to_string(&envelope).unwrap()).unwrap();

    let records = load_records(&data_path).unwrap();
    assert_eq!(records.len(), 30);

    // Only A and B are selected, C's records drop out
    let comparator = ConfigurationComparator::new(&config.comparison);
    let comparisons = comparator.compare_selected_hosts(&records, &["A", "B"]);
    assert_eq!(comparisons.len(), 2);
    assert!(comparisons.iter().all(|c| c.coverage == 1.0 && c.distinct_hosts == 2));

    let options = SampleOptions::from(&config.sampling);
    let heatmap = build_heatmap(&records, Metric::Iops, &options, &mut options.rng());
    assert!(heatmap.was_sampled());
    assert_eq!(heatmap.sampled_count, 6);
    let sampled_hosts: HashSet<&str> = heatmap.cells.iter().map(|c| c.x.as_str()).collect();
    assert_eq!(sampled_hosts.len(), 3);

    let servers = server_inventory(&records);
    assert_eq!(servers.len(), 3);
    assert_eq!(servers[0].hostname, "C");
    assert_eq!(servers[0].last_test_time.as_deref(), Some("2025-01-30T00:00:00"));

    let filters = FilterOptions::from_records(&records);
    assert_eq!(filters.block_sizes, vec!["4K", "1M"]);
}

#[test]
fn test_filter_before_comparison() {
    let records = parse_records(
        r#"[
        {"hostname": "A", "block_size": "4K", "read_write_pattern": "read",
         "iops": 900, "is_latest": 0},
        {"hostname": "A", "block_size": "4K", "read_write_pattern": "read",
         "iops": 1000, "is_latest": 1},
        {"hostname": "B", "block_size": "4K", "read_write_pattern": "read",
         "iops": 1100},
        {"hostname": "C", "block_size": "4K", "read_write_pattern": "read",
         "iops": 5000, "is_latest": 1}
    ]"#,
    )
    .unwrap();

    let filter = RecordFilter {
        hostnames: vec!["A".to_string(), "B".to_string()],
        ..RecordFilter::new().latest_only(true)
    };
    let kept = filter.apply(&records);
    let iops: Vec<f64> = kept.iter().map(|run| Metric::Iops.value(run)).collect();
    assert_eq!(iops, vec![1000.0, 1100.0]);

    let comparisons = compare(kept, NonZeroUsize::new(2).unwrap(), 1.0);
    assert_eq!(comparisons.len(), 1);
    assert!(comparisons[0].has_all_hosts);
    assert_eq!(comparisons[0].best_host(Metric::Iops).unwrap().hostname, "B");

    let mut owned = records.clone();
    filter.retain(&mut owned);
    assert_eq!(owned.len(), 2);
}

#[test]
fn test_color_cache_matches_pure_lookup() {
    let records = two_hosts();
    let scale = relative_color_scale(&records, Metric::Iops);
    let mut cache = ColorCache::from_config(&AnalyticsConfig::default().cache).unwrap();

    for run in &records {
        let value = Metric::Iops.value(run);
        assert_eq!(cache.color_for(value, &scale), color_for_value(value, &scale));
        assert_eq!(cache.color_for(value, &scale), color_for_value(value, &scale));
    }
    assert_eq!(cache.stats().hits, 2);
}

fn arb_record() -> impl Strategy<Value = TestRun> {
    (
        prop::sample::select(vec!["h1", "h2", "h3", "h4"]),
        prop::sample::select(vec!["4K", "64K"]),
        prop::sample::select(vec!["read", "randwrite"]),
        prop::sample::select(vec![1u32, 32]),
        prop::option::of(0.0f64..100_000.0),
    )
        .prop_map(|(host, bs, pattern, qd, iops)| TestRun {
            hostname: Some(host.to_string()),
            block_size: bs.to_string(),
            read_write_pattern: pattern.to_string(),
            queue_depth: qd,
            iops,
            ..Default::default()
        })
}

proptest! {
    #[test]
    fn test_comparison_invariants(
        records in prop::collection::vec(arb_record(), 0..40),
        selected in 1usize..6,
        min_coverage in 0.0f64..=1.0,
    ) {
        let selected = NonZeroUsize::new(selected).unwrap();
        let comparisons = compare(&records, selected, min_coverage);

        for comparison in &comparisons {
            prop_assert!((0.0..=1.0).contains(&comparison.coverage));
            prop_assert!(comparison.coverage >= min_coverage);
            prop_assert!(comparison.host_data.len() >= 2);
            prop_assert_eq!(comparison.has_all_hosts, comparison.host_data.len() == selected.get());
        }
        for pair in comparisons.windows(2) {
            prop_assert!(
                pair[0].coverage > pair[1].coverage
                        || (pair[0].coverage == pair[1].coverage
                        && pair[0].host_data.len() >= pair[1].host_data.len())
            );
        }
    }

    #[test]
    fn test_sample_size_and_host_coverage(
        records in prop::collection::vec(arb_record(), 0..120),
        sample_size in 4usize..60,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let sample = stratified_sample(&records, sample_size, &mut rng);

        prop_assert_eq!(sample.len(), records.len().min(sample_size));
        // at most four hosts, so every host fits into the sample
        let all_hosts: HashSet<&str> = records.iter().map(|r| r.host()).collect();
        let sampled_hosts: HashSet<&str> = sample.iter().map(|r| r.host()).collect();
        prop_assert_eq!(all_hosts, sampled_hosts);
    }
}
