//! LRU memo for value-to-color lookups
//!
//! Color lookups are pure, so the cache only saves work when the same cell
//! values are redrawn under the same scale. It is owned by the caller and
//! never shared between threads.

use crate::visualization::{color_for_value, ColorScale};
use benchlens_common::{BenchLensError, CacheConfig, Result};
use lru::LruCache;
use std::num::NonZeroUsize;
use tracing::debug;

/// value bits, min bits, max bits, palette length
type ColorKey = (u64, u64, u64, usize);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub current_size: usize,
    pub max_size: usize,
}

impl ColorCacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct ColorCache {
    entries: LruCache<ColorKey, &'static str>,
    hits: u64,
    misses: u64,
}

impl ColorCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.color_cache_capacity).ok_or_else(|| {
            BenchLensError::Config("color_cache_capacity must be greater than 0".to_string())
        })?;
        debug!("Created color cache with capacity={}", capacity);
        Ok(Self::new(capacity))
    }

    /// Same result as [`color_for_value`], memoized per value and scale.
    pub fn color_for(&mut self, value: f64, scale: &ColorScale) -> &'static str {
        let key = (value.to_bits(), scale.min.to_bits(), scale.max.to_bits(), scale.colors.len());
        if let Some(&color) = self.entries.get(&key) {
            self.hits += 1;
            return color;
        }

        self.misses += 1;
        let color = color_for_value(value, scale);
        self.entries.put(key, color);
        color
    }

    pub fn stats(&self) -> ColorCacheStats {
        ColorCacheStats {
            hits: self.hits,
            misses: self.misses,
            current_size: self.entries.len(),
            max_size: self.entries.cap().get(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
