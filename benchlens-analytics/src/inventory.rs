//! What the loaded dataset contains: filter choices and tested servers

use benchlens_common::TestRun;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Distinct values available for filtering, each sorted ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub hostnames: Vec<String>,
    pub protocols: Vec<String>,
    pub drive_types: Vec<String>,
    pub drive_models: Vec<String>,
    /// Ordered by size, so `4K` precedes `64K` and `1M`
    pub block_sizes: Vec<String>,
    pub patterns: Vec<String>,
    pub queue_depths: Vec<u32>,
}

impl FilterOptions {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TestRun>,
    {
        let mut hostnames = BTreeSet::new();
        let mut protocols = BTreeSet::new();
        let mut drive_types = BTreeSet::new();
        let mut drive_models = BTreeSet::new();
        let mut block_sizes = BTreeSet::new();
        let mut patterns = BTreeSet::new();
        let mut queue_depths = BTreeSet::new();

        for run in records {
            hostnames.extend(run.hostname.clone());
            protocols.extend(run.protocol.clone());
            drive_types.extend(run.drive_type.clone());
            drive_models.extend(run.drive_model.clone());
            if !run.block_size.is_empty() {
                block_sizes.insert(run.block_size.clone());
            }
            if !run.read_write_pattern.is_empty() {
                patterns.insert(run.read_write_pattern.clone());
            }
            queue_depths.insert(run.queue_depth);
        }

        let mut block_sizes: Vec<String> = block_sizes.into_iter().collect();
        block_sizes.sort_by_key(|size| (block_size_bytes(size).unwrap_or(u64::MAX), size.clone()));

        Self {
            hostnames: hostnames.into_iter().collect(),
            protocols: protocols.into_iter().collect(),
            drive_types: drive_types.into_iter().collect(),
            drive_models: drive_models.into_iter().collect(),
            block_sizes,
            patterns: patterns.into_iter().collect(),
            queue_depths: queue_depths.into_iter().collect(),
        }
    }
}

/// Parse block size labels such as `4K`, `128k`, `1M`, `512` or `64KiB`.
pub fn block_size_bytes(label: &str) -> Option<u64> {
    let label = label.trim();
    let split = label.find(|c: char| !c.is_ascii_digit()).unwrap_or(label.len());
    let (digits, suffix) = label.split_at(split);
    let value: u64 = digits.parse().ok()?;

    let multiplier = match suffix.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1 << 10,
        "M" | "MB" | "MIB" => 1 << 20,
        "G" | "GB" | "GIB" => 1 << 30,
        _ => return None,
    };
    value.checked_mul(multiplier)
}

/// One tested (hostname, protocol, drive model) combination
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerInfo {
    pub hostname: String,
    pub protocol: String,
    pub drive_model: Option<String>,
    pub test_count: usize,
    pub first_test_time: Option<String>,
    pub last_test_time: Option<String>,
}

type TimeKey = (Option<NaiveDateTime>, String);
type ServerKey<'a> = (&'a str, &'a str, Option<&'a str>);

fn time_key(run: &TestRun) -> Option<TimeKey> {
    let raw = run.timestamp.clone()?;
    Some((run.parsed_timestamp(), raw))
}

/// Servers seen in the records, most recently tested first. Records
/// without hostname or protocol are not attributed to any server.
pub fn server_inventory<'a, I>(records: I) -> Vec<ServerInfo>
where
    I: IntoIterator<Item = &'a TestRun>,
{
    // (hostname, protocol, drive model) -> (count, first seen, last seen)
    let mut servers: IndexMap<ServerKey<'a>, (usize, Option<TimeKey>, Option<TimeKey>)> =
        IndexMap::new();

    for run in records {
        let (Some(hostname), Some(protocol)) = (run.hostname.as_deref(), run.protocol.as_deref())
        else {
            continue;
        };

        let (count, first, last) = servers
            .entry((hostname, protocol, run.drive_model.as_deref()))
            .or_insert((0, None, None));
        *count += 1;

        if let Some(key) = time_key(run) {
            if first.as_ref().map_or(true, |current| key < *current) {
                *first = Some(key.clone());
            }
            if last.as_ref().map_or(true, |current| key > *current) {
                *last = Some(key);
            }
        }
    }

    let mut entries: Vec<_> = servers.into_iter().collect();
    // stable: ties keep first-seen order, servers without timestamps go last
    entries.sort_by(|(_, (_, _, a)), (_, (_, _, b))| b.cmp(a));

    let inventory: Vec<ServerInfo> = entries
        .into_iter()
        .map(|((hostname, protocol, drive_model), (test_count, first, last))| ServerInfo {
            hostname: hostname.to_string(),
            protocol: protocol.to_string(),
            drive_model: drive_model.map(str::to_string),
            test_count,
            first_test_time: first.map(|(_, raw)| raw),
            last_test_time: last.map(|(_, raw)| raw),
        })
        .collect();

    debug!("Found {} servers", inventory.len());
    inventory
}
