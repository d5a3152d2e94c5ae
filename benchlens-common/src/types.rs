//! Core record model and the closed sets of keys used to address record
//! fields.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used wherever an identifying attribute is absent.
pub const UNKNOWN: &str = "unknown";

/// Record identifier. Older datasets use integer row ids, newer ones UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// One executed benchmark workload on one host/drive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRun {
    pub id: Option<RecordId>,
    /// Execution timestamp as recorded by the importer
    pub timestamp: Option<String>,
    pub test_name: Option<String>,
    pub description: Option<String>,

    // Hardware identity
    pub hostname: Option<String>,
    pub drive_model: Option<String>,
    pub drive_type: Option<String>,
    pub protocol: Option<String>,

    // Workload parameters
    pub block_size: String,
    pub read_write_pattern: String,
    pub queue_depth: u32,
    pub direct: Option<u8>,
    pub sync: Option<u8>,
    pub num_jobs: Option<u32>,
    pub test_size: Option<String>,
    /// Test duration in seconds
    pub duration: Option<u64>,

    // Measured metrics
    pub iops: Option<f64>,
    /// MB/s
    pub bandwidth: Option<f64>,
    /// Milliseconds
    pub avg_latency: Option<f64>,
    pub p95_latency: Option<f64>,
    pub p99_latency: Option<f64>,

    pub is_latest: Option<u8>,
}

impl TestRun {
    /// Hardware identity of the record. Drive and protocol do not take part.
    pub fn host(&self) -> &str {
        self.hostname.as_deref().unwrap_or(UNKNOWN)
    }

    /// `1000 / avg_latency`, or 0 when latency is absent or not positive.
    pub fn responsiveness(&self) -> f64 {
        match self.avg_latency {
            Some(latency) if latency > 0.0 => 1000.0 / latency,
            _ => 0.0,
        }
    }

    /// Whether this is the most recent run of its workload on its hardware.
    /// Records without the flag count as latest.
    pub fn is_latest_run(&self) -> bool {
        self.is_latest.map_or(true, |flag| flag != 0)
    }

    /// Parse the timestamp, accepting RFC 3339 and the naive ISO forms the
    /// importer writes.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.timestamp.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    }
}

/// Metrics usable for heatmaps and relative color scales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Iops,
    Bandwidth,
    /// `1000 / avg_latency`, so that more is better like the other two
    Responsiveness,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Iops, Metric::Bandwidth, Metric::Responsiveness];

    /// Resolve a metric key. Unrecognized keys fall back to IOPS.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "bandwidth" => Metric::Bandwidth,
            "responsiveness" => Metric::Responsiveness,
            _ => Metric::Iops,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Metric::Iops => "iops",
            Metric::Bandwidth => "bandwidth",
            Metric::Responsiveness => "responsiveness",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Iops => "IOPS",
            Metric::Bandwidth => "Bandwidth",
            Metric::Responsiveness => "Responsiveness",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Iops => "IOPS",
            Metric::Bandwidth => "MB/s",
            Metric::Responsiveness => "1/s",
        }
    }

    /// Raw metric value of a record; absent metrics read as 0.
    pub fn value(&self, run: &TestRun) -> f64 {
        match self {
            Metric::Iops => run.iops.unwrap_or(0.0),
            Metric::Bandwidth => run.bandwidth.unwrap_or(0.0),
            Metric::Responsiveness => run.responsiveness(),
        }
    }
}

impl From<&str> for Metric {
    fn from(key: &str) -> Self {
        Metric::from_key(key)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Addressable record fields for chart axes, group keys and aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Timestamp,
    Hostname,
    Protocol,
    DriveModel,
    DriveType,
    BlockSize,
    #[serde(alias = "pattern")]
    ReadWritePattern,
    QueueDepth,
    NumJobs,
    #[default]
    Iops,
    Bandwidth,
    AvgLatency,
    P95Latency,
    P99Latency,
}

impl RecordField {
    /// Resolve a field key. Unrecognized keys fall back to IOPS.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "timestamp" => RecordField::Timestamp,
            "hostname" | "host" => RecordField::Hostname,
            "protocol" => RecordField::Protocol,
            "drive_model" => RecordField::DriveModel,
            "drive_type" => RecordField::DriveType,
            "block_size" => RecordField::BlockSize,
            "read_write_pattern" | "pattern" => RecordField::ReadWritePattern,
            "queue_depth" | "iodepth" => RecordField::QueueDepth,
            "num_jobs" => RecordField::NumJobs,
            "bandwidth" => RecordField::Bandwidth,
            "avg_latency" | "latency" => RecordField::AvgLatency,
            "p95_latency" => RecordField::P95Latency,
            "p99_latency" => RecordField::P99Latency,
            _ => RecordField::Iops,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            RecordField::Timestamp => "timestamp",
            RecordField::Hostname => "hostname",
            RecordField::Protocol => "protocol",
            RecordField::DriveModel => "drive_model",
            RecordField::DriveType => "drive_type",
            RecordField::BlockSize => "block_size",
            RecordField::ReadWritePattern => "read_write_pattern",
            RecordField::QueueDepth => "queue_depth",
            RecordField::NumJobs => "num_jobs",
            RecordField::Iops => "iops",
            RecordField::Bandwidth => "bandwidth",
            RecordField::AvgLatency => "avg_latency",
            RecordField::P95Latency => "p95_latency",
            RecordField::P99Latency => "p99_latency",
        }
    }

    /// Unit of a metric field, empty for descriptive fields.
    pub fn unit(&self) -> &'static str {
        match self {
            RecordField::Iops => "IOPS",
            RecordField::Bandwidth => "MB/s",
            RecordField::AvgLatency | RecordField::P95Latency | RecordField::P99Latency => "ms",
            _ => "",
        }
    }

    pub fn value(&self, run: &TestRun) -> FieldValue {
        let text = |value: &Option<String>| match value {
            Some(s) => FieldValue::Text(s.clone()),
            None => FieldValue::Missing,
        };
        let number = |value: Option<f64>| match value {
            Some(n) => FieldValue::Number(n),
            None => FieldValue::Missing,
        };

        match self {
            RecordField::Timestamp => text(&run.timestamp),
            RecordField::Hostname => text(&run.hostname),
            RecordField::Protocol => text(&run.protocol),
            RecordField::DriveModel => text(&run.drive_model),
            RecordField::DriveType => text(&run.drive_type),
            RecordField::BlockSize => FieldValue::Text(run.block_size.clone()),
            RecordField::ReadWritePattern => FieldValue::Text(run.read_write_pattern.clone()),
            RecordField::QueueDepth => FieldValue::Number(f64::from(run.queue_depth)),
            RecordField::NumJobs => number(run.num_jobs.map(f64::from)),
            RecordField::Iops => number(run.iops),
            RecordField::Bandwidth => number(run.bandwidth),
            RecordField::AvgLatency => number(run.avg_latency),
            RecordField::P95Latency => number(run.p95_latency),
            RecordField::P99Latency => number(run.p99_latency),
        }
    }

    /// Numeric reading of the field, `None` for absent or descriptive values.
    pub fn numeric(&self, run: &TestRun) -> Option<f64> {
        self.value(run).as_f64()
    }
}

impl From<&str> for RecordField {
    fn from(key: &str) -> Self {
        RecordField::from_key(key)
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Value read from a record through a [`RecordField`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Missing,
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Missing => f.write_str(UNKNOWN),
        }
    }
}
