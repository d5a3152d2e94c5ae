//! Stratified sampling by host
//!
//! Large result sets are cut down per host rather than globally, so a host
//! with few records is never starved by hosts with many.

use benchlens_common::{SamplingConfig, TestRun};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Sampling thresholds for heatmap input
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOptions {
    /// Inputs larger than this are sampled
    pub threshold: usize,
    pub sample_size: usize,
    pub seed: Option<u64>,
}

impl SampleOptions {
    /// Random source for sampling: seeded when a seed is configured.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self::from(&SamplingConfig::default())
    }
}

impl From<&SamplingConfig> for SampleOptions {
    fn from(config: &SamplingConfig) -> Self {
        Self {
            threshold: config.threshold,
            sample_size: config.sample_size,
            seed: config.seed,
        }
    }
}

/// Record indices of one host, drawn by a partial Fisher-Yates shuffle.
/// Positions before `drawn` have already been taken.
#[derive(Default)]
struct HostPool {
    indices: Vec<usize>,
    drawn: usize,
}

impl HostPool {
    fn draw<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R, out: &mut Vec<usize>) -> usize {
        let end = (self.drawn + count).min(self.indices.len());
        for i in self.drawn..end {
            let j = rng.gen_range(i..self.indices.len());
            self.indices.swap(i, j);
            out.push(self.indices[i]);
        }
        let taken = end - self.drawn;
        self.drawn = end;
        taken
    }

    fn remaining(&self) -> usize {
        self.indices.len() - self.drawn
    }
}

/// Draw `sample_size` records, spread evenly over hosts.
///
/// Inputs no larger than `sample_size` come back unchanged. Otherwise every
/// host gets `sample_size / hosts` slots, the first `sample_size % hosts`
/// hosts (in order of first appearance) one more, and records are drawn
/// without replacement. Slots a host cannot fill go round-robin to hosts
/// that still have records. The input is only borrowed.
pub fn stratified_sample<'a, I, R>(records: I, sample_size: usize, rng: &mut R) -> Vec<&'a TestRun>
where
    I: IntoIterator<Item = &'a TestRun>,
    R: Rng + ?Sized,
{
    let records: Vec<&'a TestRun> = records.into_iter().collect();
    if records.len() <= sample_size {
        return records;
    }

    let mut pools: IndexMap<&'a str, HostPool> = IndexMap::new();
    for (index, &run) in records.iter().enumerate() {
        pools.entry(run.host()).or_default().indices.push(index);
    }

    let host_count = pools.len();
    let base = sample_size / host_count;
    let extra = sample_size % host_count;

    let mut picked = Vec::with_capacity(sample_size);
    for (position, pool) in pools.values_mut().enumerate() {
        let quota = base + usize::from(position < extra);
        pool.draw(quota, rng, &mut picked);
    }

    let mut shortfall = sample_size - picked.len();
    while shortfall > 0 {
        let mut progressed = false;
        for pool in pools.values_mut().filter(|pool| pool.remaining() > 0) {
            if shortfall == 0 {
                break;
            }
            shortfall -= pool.draw(1, rng, &mut picked);
            progressed = true;
        }
        if !progressed {
            break;
        }
    }

    debug!(
        "Sampled {} of {} records across {} hosts",
        picked.len(),
        records.len(),
        host_count
    );
    picked.into_iter().map(|index| records[index]).collect()
}
