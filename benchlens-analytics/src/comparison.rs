//! Cross-host configuration comparison
//!
//! Two records are "the same test" when their workload parameters match,
//! whatever hardware ran them. Records are grouped by a workload fingerprint
//! and every group is scored by how much of the user's host selection it
//! covers.

use benchlens_common::{ComparisonConfig, Metric, TestRun, UNKNOWN};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::num::NonZeroUsize;
use tracing::debug;

/// Separator between fingerprint fields
pub const FINGERPRINT_SEPARATOR: &str = "|";

/// Workload identity of a record: the 8 parameters that must match for two
/// runs to be comparable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Configuration {
    pub block_size: String,
    pub read_write_pattern: String,
    pub queue_depth: u32,
    pub direct: u8,
    pub sync: u8,
    pub num_jobs: u32,
    pub test_size: String,
    /// Seconds
    pub duration: u64,
}

impl Configuration {
    /// Extract the workload parameters of a record, substituting defaults
    /// for absent optional fields.
    pub fn of(run: &TestRun) -> Self {
        Self {
            block_size: run.block_size.clone(),
            read_write_pattern: run.read_write_pattern.clone(),
            queue_depth: run.queue_depth,
            direct: run.direct.unwrap_or(0),
            sync: run.sync.unwrap_or(0),
            num_jobs: run.num_jobs.unwrap_or(1),
            test_size: run.test_size.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            duration: run.duration.unwrap_or(0),
        }
    }

    pub fn fingerprint(&self) -> String {
        [
            self.block_size.clone(),
            self.read_write_pattern.clone(),
            self.queue_depth.to_string(),
            self.direct.to_string(),
            self.sync.to_string(),
            self.num_jobs.to_string(),
            self.test_size.clone(),
            self.duration.to_string(),
        ]
        .join(FINGERPRINT_SEPARATOR)
    }

    /// Short human-readable description for comparison headers
    pub fn label(&self) -> String {
        format!(
            "{} {} QD{} (jobs={}, direct={}, sync={}, size={}, {}s)",
            self.block_size,
            self.read_write_pattern,
            self.queue_depth,
            self.num_jobs,
            self.direct,
            self.sync,
            self.test_size,
            self.duration
        )
    }
}

/// Deterministic workload fingerprint of a record. Never fails.
pub fn fingerprint(run: &TestRun) -> String {
    Configuration::of(run).fingerprint()
}

/// All records that share one configuration
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationGroup<'a> {
    pub key: String,
    pub configuration: Configuration,
    /// Distinct hostnames in encounter order
    pub hostnames: IndexSet<String>,
    pub records: Vec<&'a TestRun>,
}

impl<'a> ConfigurationGroup<'a> {
    pub fn host_count(&self) -> usize {
        self.hostnames.len()
    }
}

/// Group records by configuration fingerprint in a single pass.
///
/// Groups are ordered by descending distinct host count, so the most widely
/// run tests come first; equal counts keep encounter order.
pub fn group_by_configuration<'a, I>(records: I) -> Vec<ConfigurationGroup<'a>>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    let mut groups: IndexMap<String, ConfigurationGroup<'a>> = IndexMap::new();

    for run in records {
        let configuration = Configuration::of(run);
        let key = configuration.fingerprint();
        let group = groups.entry(key.clone()).or_insert_with(|| ConfigurationGroup {
            key,
            configuration,
            hostnames: IndexSet::new(),
            records: Vec::new(),
        });

        if !group.hostnames.contains(run.host()) {
            group.hostnames.insert(run.host().to_string());
        }
        group.records.push(run);
    }

    let mut groups: Vec<_> = groups.into_values().collect();
    groups.sort_by(|a, b| b.host_count().cmp(&a.host_count()));

    debug!("Grouped records into {} configurations", groups.len());
    groups
}

/// One row of a comparison: a single record's identity and metrics
#[derive(Debug, Clone, Serialize)]
pub struct HostComparisonData<'a> {
    pub hostname: String,
    pub drive_model: String,
    pub drive_type: String,
    pub protocol: String,
    pub iops: Option<f64>,
    pub bandwidth: Option<f64>,
    pub avg_latency: Option<f64>,
    pub p95_latency: Option<f64>,
    pub p99_latency: Option<f64>,
    pub record: &'a TestRun,
}

impl<'a> HostComparisonData<'a> {
    fn from_record(run: &'a TestRun) -> Self {
        let or_unknown =
            |value: &Option<String>| value.clone().unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            hostname: run.host().to_string(),
            drive_model: or_unknown(&run.drive_model),
            drive_type: or_unknown(&run.drive_type),
            protocol: or_unknown(&run.protocol),
            iops: run.iops,
            bandwidth: run.bandwidth,
            avg_latency: run.avg_latency,
            p95_latency: run.p95_latency,
            p99_latency: run.p99_latency,
            record: run,
        }
    }
}

/// A configuration group scored against the selected host set
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationComparison<'a> {
    pub key: String,
    pub configuration: Configuration,
    pub host_data: Vec<HostComparisonData<'a>>,
    /// Distinct hostnames among the rows
    pub distinct_hosts: usize,
    pub coverage: f64,
    pub has_all_hosts: bool,
}

impl<'a> ConfigurationComparison<'a> {
    /// Row with the highest value of `metric`
    pub fn best_host(&self, metric: Metric) -> Option<&HostComparisonData<'a>> {
        self.host_data
            .iter()
            .max_by(|a, b| metric.value(a.record).total_cmp(&metric.value(b.record)))
    }

    /// Each row's metric as a fraction of the best row, in row order. All
    /// zeros when no row has a positive value.
    pub fn relative_to_best(&self, metric: Metric) -> Vec<f64> {
        let best = self
            .host_data
            .iter()
            .map(|row| metric.value(row.record))
            .fold(0.0, f64::max);

        self.host_data
            .iter()
            .map(|row| if best > 0.0 { metric.value(row.record) / best } else { 0.0 })
            .collect()
    }
}

/// Score every configuration group against the selected host count.
///
/// Each record of a group becomes its own row, so a host that ran the same
/// workload on several drives contributes several rows. Groups with fewer
/// than two rows or with coverage below `min_coverage` are dropped. The
/// result is ordered by coverage, then row count, both descending.
pub fn compare<'a, I>(
    records: I,
    selected_host_count: NonZeroUsize,
    min_coverage: f64,
) -> Vec<ConfigurationComparison<'a>>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    let selected = selected_host_count.get();
    let mut comparisons = Vec::new();

    for group in group_by_configuration(records) {
        let host_data: Vec<_> = group
            .records
            .iter()
            .map(|&run| HostComparisonData::from_record(run))
            .collect();
        let rows = host_data.len();
        // Several drives per host can push rows past the selection, so the
        // ratio is clamped and has_all_hosts compares rows == selected instead.
        let coverage = (rows as f64 / selected as f64).min(1.0);

        if rows < 2 || coverage < min_coverage {
            continue;
        }

        comparisons.push(ConfigurationComparison {
            key: group.key,
            configuration: group.configuration,
            distinct_hosts: group.hostnames.len(),
            host_data,
            coverage,
            has_all_hosts: rows == selected,
        });
    }

    comparisons.sort_by(|a, b| {
        b.coverage
            .total_cmp(&a.coverage)
            .then_with(|| b.host_data.len().cmp(&a.host_data.len()))
    });

    debug!(
        "Found {} comparable configurations for {} selected hosts (min coverage {:.2})",
        comparisons.len(),
        selected,
        min_coverage
    );
    comparisons
}

/// Comparator bound to a configured coverage threshold
#[derive(Debug, Clone)]
pub struct ConfigurationComparator {
    min_coverage: f64,
}

impl ConfigurationComparator {
    pub fn new(config: &ComparisonConfig) -> Self {
        Self::with_min_coverage(config.min_coverage)
    }

    pub fn with_min_coverage(min_coverage: f64) -> Self {
        Self { min_coverage }
    }

    pub fn min_coverage(&self) -> f64 {
        self.min_coverage
    }

    pub fn compare<'a, I>(
        &self,
        records: I,
        selected_host_count: NonZeroUsize,
    ) -> Vec<ConfigurationComparison<'a>>
    where
        I: IntoIterator<Item = &'a TestRun>,
    {
        compare(records, selected_host_count, self.min_coverage)
    }

    /// Restrict records to the selected hostnames and compare against that
    /// selection. An empty selection yields no comparisons.
    pub fn compare_selected_hosts<'a, S>(
        &self,
        records: &'a [TestRun],
        hosts: &[S],
    ) -> Vec<ConfigurationComparison<'a>>
    where
        S: AsRef<str>,
    {
        let selected: IndexSet<&str> = hosts.iter().map(|h| h.as_ref()).collect();
        let Some(count) = NonZeroUsize::new(selected.len()) else {
            return Vec::new();
        };

        let filtered = records.iter().filter(|run| selected.contains(run.host()));
        compare(filtered, count, self.min_coverage)
    }
}

impl Default for ConfigurationComparator {
    fn default() -> Self {
        Self::new(&ComparisonConfig::default())
    }
}
