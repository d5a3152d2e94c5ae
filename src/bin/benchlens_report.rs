//! BenchLens report tool
//!
//! Reads exported benchmark records and prints comparison, chart and
//! inventory data as JSON.

use anyhow::{bail, Context, Result};
use benchlens::prelude::*;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "benchlens-report")]
#[command(about = "Cross-host comparison and chart data for storage benchmark results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Record file: a JSON array or an object with a `data` array
    #[arg(short, long, global = true, default_value = "results.json")]
    input: PathBuf,

    /// TOML configuration, environment overrides apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write JSON here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(flatten)]
    filter: FilterArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Record selection applied before any subcommand
#[derive(Args)]
struct FilterArgs {
    /// Only these hostnames (comma separated)
    #[arg(long = "host", global = true, value_delimiter = ',')]
    hostnames: Vec<String>,

    #[arg(long = "drive-type", global = true, value_delimiter = ',')]
    drive_types: Vec<String>,

    #[arg(long = "protocol", global = true, value_delimiter = ',')]
    protocols: Vec<String>,

    #[arg(long = "pattern", global = true, value_delimiter = ',')]
    patterns: Vec<String>,

    #[arg(long = "block-size", global = true, value_delimiter = ',')]
    block_sizes: Vec<String>,

    /// Skip runs superseded by a newer run of the same workload
    #[arg(long, global = true)]
    latest_only: bool,
}

impl From<FilterArgs> for RecordFilter {
    fn from(args: FilterArgs) -> Self {
        RecordFilter {
            hostnames: args.hostnames,
            drive_types: args.drive_types,
            protocols: args.protocols,
            patterns: args.patterns,
            block_sizes: args.block_sizes,
            latest_only: args.latest_only,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rank workload configurations by how many hosts ran them
    Compare {
        /// Comma separated hostnames, defaults to every host in the input
        #[arg(long, value_delimiter = ',')]
        hosts: Vec<String>,

        /// Override the configured minimum coverage
        #[arg(long)]
        min_coverage: Option<f64>,
    },
    /// Host × workload heatmap
    Heatmap {
        /// iops, bandwidth or responsiveness
        #[arg(short, long, default_value = "iops")]
        metric: String,

        /// Seed for sampling large inputs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Scatter plot with performance zones
    Scatter {
        #[arg(short, long, default_value = "avg_latency")]
        x: String,

        #[arg(short, long, default_value = "iops")]
        y: String,
    },
    /// Trend chart points, optionally grouped
    Trend {
        #[arg(short, long, default_value = "queue_depth")]
        x: String,

        #[arg(short, long, default_value = "iops")]
        y: String,

        #[arg(short, long)]
        group_by: Option<String>,

        /// Emit the timestamp history of `y` instead of chart points
        #[arg(long)]
        history: bool,
    },
    /// Average, min and max of metric fields
    Stats {
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_value = "iops,avg_latency,bandwidth"
        )]
        metrics: Vec<String>,
    },
    /// Filter choices and tested servers
    Inventory,
}

#[derive(Serialize)]
struct ComparisonReport<'a> {
    min_coverage: f64,
    selected_hosts: Vec<String>,
    comparisons: Vec<ComparisonEntry<'a>>,
}

#[derive(Serialize)]
struct ComparisonEntry<'a> {
    label: String,
    /// Best hostname per metric key
    best_hosts: BTreeMap<&'static str, String>,
    #[serde(flatten)]
    comparison: ConfigurationComparison<'a>,
}

impl<'a> From<ConfigurationComparison<'a>> for ComparisonEntry<'a> {
    fn from(comparison: ConfigurationComparison<'a>) -> Self {
        let best_hosts = Metric::ALL
            .iter()
            .filter_map(|&metric| {
                let best = comparison.best_host(metric)?;
                (metric.value(best.record) > 0.0).then(|| (metric.key(), best.hostname.clone()))
            })
            .collect();

        Self {
            label: comparison.configuration.label(),
            best_hosts,
            comparison,
        }
    }
}

#[derive(Serialize)]
struct Inventory {
    filters: FilterOptions,
    servers: Vec<ServerInfo>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    benchlens::init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(ConfigSource::File(path.clone())),
        None => load_config(ConfigSource::Environment),
    }
    .context("Failed to load configuration")?;

    let mut records = load_records(&cli.input)
        .with_context(|| format!("Failed to load records from {}", cli.input.display()))?;
    info!("Loaded {} records from {}", records.len(), cli.input.display());

    let filter = RecordFilter::from(cli.filter);
    if !filter.is_empty() {
        filter.retain(&mut records);
        info!("{} records match the filter", records.len());
    }

    let report = match &cli.command {
        Commands::Compare { hosts, min_coverage } => {
            let comparator = match min_coverage {
                Some(coverage) if !(0.0..=1.0).contains(coverage) => {
                    bail!("--min-coverage must be between 0 and 1, got {}", coverage)
                }
                Some(coverage) => ConfigurationComparator::with_min_coverage(*coverage),
                None => ConfigurationComparator::new(&config.comparison),
            };

            let hosts = if hosts.is_empty() {
                FilterOptions::from_records(&records).hostnames
            } else {
                hosts.clone()
            };
            debug!("Comparing {} hosts", hosts.len());

            let comparisons = comparator.compare_selected_hosts(&records, hosts.as_slice());
            to_json(&ComparisonReport {
                min_coverage: comparator.min_coverage(),
                selected_hosts: hosts,
                comparisons: comparisons.into_iter().map(ComparisonEntry::from).collect(),
            })?
        }
        Commands::Heatmap { metric, seed } => {
            let mut options = SampleOptions::from(&config.sampling);
            if seed.is_some() {
                options.seed = *seed;
            }
            let metric = Metric::from_key(metric);
            let heatmap = build_heatmap(&records, metric, &options, &mut options.rng());
            if heatmap.was_sampled() {
                info!("Sampled {} of {} records", heatmap.sampled_count, heatmap.source_count);
            }
            to_json(&heatmap)?
        }
        Commands::Scatter { x, y } => {
            let (x_field, y_field) = (RecordField::from_key(x), RecordField::from_key(y));
            to_json(&build_scatter(&records, x_field, y_field))?
        }
        Commands::Trend { x, y, group_by, history } => {
            let (x_field, y_field) = (RecordField::from_key(x), RecordField::from_key(y));
            if *history {
                to_json(&annotate_history(&records, y_field))?
            } else {
                match group_by.as_deref().map(RecordField::from_key) {
                    Some(group_by) => {
                        to_json(&trend_series_grouped(&records, x_field, y_field, group_by))?
                    }
                    None => to_json(&trend_series(&records, x_field, y_field, None))?,
                }
            }
        }
        Commands::Stats { metrics } => {
            let fields: Vec<RecordField> =
                metrics.iter().map(|key| RecordField::from_key(key)).collect();
            to_json(&aggregate(&records, &fields))?
        }
        Commands::Inventory => to_json(&Inventory {
            filters: FilterOptions::from_records(&records),
            servers: server_inventory(&records),
        })?,
    };

    match &cli.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, report)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Report saved to: {}", path.display());
        }
        None => println!("{}", report),
    }

    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize report")
}
