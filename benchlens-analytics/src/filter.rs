//! Record selection by hardware and workload attributes

use benchlens_common::TestRun;
use serde::Serialize;
use tracing::debug;

/// Selected filter values. An empty list places no restriction on its
/// attribute; a non-empty list only admits records whose value is listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordFilter {
    pub hostnames: Vec<String>,
    pub drive_types: Vec<String>,
    pub protocols: Vec<String>,
    pub patterns: Vec<String>,
    pub block_sizes: Vec<String>,
    /// Skip runs superseded by a newer run of the same workload
    pub latest_only: bool,
}

fn admits(selected: &[String], value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    match value {
        Some(value) => selected.iter().any(|s| s.trim() == value),
        None => false,
    }
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_only(mut self, latest_only: bool) -> Self {
        self.latest_only = latest_only;
        self
    }

    /// True when the filter admits every record
    pub fn is_empty(&self) -> bool {
        !self.latest_only
            && self.hostnames.is_empty()
            && self.drive_types.is_empty()
            && self.protocols.is_empty()
            && self.patterns.is_empty()
            && self.block_sizes.is_empty()
    }

    pub fn matches(&self, run: &TestRun) -> bool {
        (!self.latest_only || run.is_latest_run())
            && admits(&self.hostnames, run.hostname.as_deref())
            && admits(&self.drive_types, run.drive_type.as_deref())
            && admits(&self.protocols, run.protocol.as_deref())
            && admits(&self.patterns, Some(run.read_write_pattern.as_str()))
            && admits(&self.block_sizes, Some(run.block_size.as_str()))
    }

    /// Matching records in input order
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a TestRun>
    where
        I: IntoIterator<Item = &'a TestRun>,
    {
        let matched: Vec<&'a TestRun> = records
            .into_iter()
            .filter(|run| self.matches(run))
            .collect();
        debug!("Filter kept {} records", matched.len());
        matched
    }

    /// Drop non-matching records from an owned set
    pub fn retain(&self, records: &mut Vec<TestRun>) {
        let before = records.len();
        records.retain(|run| self.matches(run));
        debug!("Filter kept {} of {} records", records.len(), before);
    }
}
