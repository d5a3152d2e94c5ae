//! Configuration management for the analytics engine

use crate::error::{BenchLensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings for cross-host configuration comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Minimum fraction of the selected hosts a comparison must cover
    pub min_coverage: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self { min_coverage: 0.5 }
    }
}

/// Settings for stratified sampling of large datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Record count above which heatmap input is sampled
    pub threshold: usize,
    /// Number of records kept by a sample
    pub sample_size: usize,
    /// Fixed seed for reproducible samples
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            threshold: 1000,
            sample_size: 500,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub color_cache_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { color_cache_capacity: 1024 }
    }
}

/// Complete analytics configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub comparison: ComparisonConfig,
    pub sampling: SamplingConfig,
    pub cache: CacheConfig,
}

impl AnalyticsConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `BENCHLENS_*` environment overrides. Unparseable values keep
    /// the current setting.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("BENCHLENS_MIN_COVERAGE") {
            self.comparison.min_coverage = value.parse().unwrap_or(self.comparison.min_coverage);
        }

        if let Some(value) = lookup("BENCHLENS_SAMPLE_SIZE") {
            self.sampling.sample_size = value.parse().unwrap_or(self.sampling.sample_size);
        }

        if let Some(value) = lookup("BENCHLENS_SAMPLE_THRESHOLD") {
            self.sampling.threshold = value.parse().unwrap_or(self.sampling.threshold);
        }

        if let Some(value) = lookup("BENCHLENS_SAMPLE_SEED") {
            if let Ok(seed) = value.parse() {
                self.sampling.seed = Some(seed);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let coverage = self.comparison.min_coverage;
        if !(0.0..=1.0).contains(&coverage) {
            return Err(BenchLensError::Config(format!(
                "min_coverage must be within [0, 1], got {}",
                coverage
            )));
        }

        if self.sampling.sample_size == 0 {
            return Err(BenchLensError::Config("sample_size must be greater than zero".to_string()));
        }

        if self.cache.color_cache_capacity == 0 {
            return Err(BenchLensError::Config(
                "color_cache_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration source for loading analytics settings
pub enum ConfigSource {
    File(PathBuf),
    Default,
    Environment,
}

/// Load analytics configuration from the given source
pub fn load_config(source: ConfigSource) -> Result<AnalyticsConfig> {
    let config = match source {
        ConfigSource::File(path) => {
            debug!("Loading analytics configuration from {}", path.display());
            AnalyticsConfig::from_file(&path)?
        }
        ConfigSource::Default => AnalyticsConfig::default(),
        ConfigSource::Environment => {
            let mut config = AnalyticsConfig::default();
            config.apply_env_overrides();
            config
        }
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.comparison.min_coverage, 0.5);
        assert_eq!(config.sampling.threshold, 1000);
        assert_eq!(config.sampling.sample_size, 500);
        assert!(config.sampling.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_operations() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("analytics.toml");

        let mut config = AnalyticsConfig::default();
        config.sampling.seed = Some(42);
        config.comparison.min_coverage = 0.75;
        config.to_file(&config_path).unwrap();

        let loaded = AnalyticsConfig::from_file(&config_path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("partial.toml");
        std::fs::write(&config_path, "[sampling]\nsample_size = 200\n").unwrap();

        let config = load_config(ConfigSource::File(config_path)).unwrap();
        assert_eq!(config.sampling.sample_size, 200);
        assert_eq!(config.sampling.threshold, 1000);
        assert_eq!(config.comparison.min_coverage, 0.5);
    }

    #[test]
    fn test_invalid_coverage_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("bad.toml");
        std::fs::write(&config_path, "[comparison]\nmin_coverage = 1.5\n").unwrap();

        let err = AnalyticsConfig::from_file(&config_path).unwrap_err();
        assert!(matches!(err, BenchLensError::Config(_)));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let mut config = AnalyticsConfig::default();
        config.sampling.sample_size = 0;
        assert!(config.validate().is_err());

        let mut config = AnalyticsConfig::default();
        config.cache.color_cache_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BENCHLENS_MIN_COVERAGE", "0.8"),
            ("BENCHLENS_SAMPLE_SIZE", "not-a-number"),
            ("BENCHLENS_SAMPLE_SEED", "7"),
        ]
        .into_iter()
        .collect();

        let mut config = AnalyticsConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.comparison.min_coverage, 0.8);
        assert_eq!(config.sampling.sample_size, 500);
        assert_eq!(config.sampling.seed, Some(7));
    }
}
