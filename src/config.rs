//! Engine configuration, loaded from YAML.
//!
//! ```yaml
//! cache-max-entries: 100
//! cache-max-age-secs: 600
//! cache-retain-ratio: 0.8
//! large-content-bytes: 10240
//! spelling: sharp
//! ```
//!
//! Every key is optional; missing keys take the defaults above.

use crate::error::ConfigError;
use crate::vocabulary::Spelling;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 100;
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(600);
pub const DEFAULT_CACHE_RETAIN_RATIO: f64 = 0.8;

/// Content above this size is worth processing off the UI thread.
/// Advisory only: nothing in the engine refuses or splits large input.
pub const DEFAULT_LARGE_CONTENT_BYTES: usize = 10 * 1024;

/// Raw configuration for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawEngineConfig {
    cache_max_entries: Option<usize>,
    cache_max_age_secs: Option<u64>,
    cache_retain_ratio: Option<f64>,
    large_content_bytes: Option<usize>,
    spelling: Option<String>,
}

/// Bounds of the [`ResultCache`](crate::cache::ResultCache)
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub max_age: Duration,
    /// Share of `max_entries` kept by a cleanup
    pub retain_ratio: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            max_age: DEFAULT_CACHE_MAX_AGE,
            retain_ratio: DEFAULT_CACHE_RETAIN_RATIO,
        }
    }
}

impl CacheConfig {
    /// Entries left after a cleanup: `floor(max_entries * retain_ratio)`, at least 1
    pub fn retain_count(&self) -> usize {
        ((self.max_entries as f64 * self.retain_ratio).floor() as usize).max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub large_content_bytes: usize,
    /// Spelling of computed (transposed) keys and chords
    pub spelling: Spelling,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            large_content_bytes: DEFAULT_LARGE_CONTENT_BYTES,
            spelling: Spelling::Sharp,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: RawEngineConfig =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Yaml(e.to_string()))?;

        let max_entries = raw.cache_max_entries.unwrap_or(DEFAULT_CACHE_MAX_ENTRIES);
        if max_entries == 0 {
            return Err(ConfigError::Invalid(
                "cache-max-entries must be at least 1".to_string(),
            ));
        }

        let max_age = match raw.cache_max_age_secs {
            Some(0) => {
                return Err(ConfigError::Invalid(
                    "cache-max-age-secs must be at least 1".to_string(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_CACHE_MAX_AGE,
        };

        let retain_ratio = raw.cache_retain_ratio.unwrap_or(DEFAULT_CACHE_RETAIN_RATIO);
        if !(retain_ratio > 0.0 && retain_ratio <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "cache-retain-ratio must be in (0, 1], got {}",
                retain_ratio
            )));
        }

        let spelling = match raw.spelling.as_deref().map(str::trim) {
            None => Spelling::Sharp,
            Some(s) if s.eq_ignore_ascii_case("sharp") => Spelling::Sharp,
            Some(s) if s.eq_ignore_ascii_case("flat") => Spelling::Flat,
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "spelling must be 'sharp' or 'flat', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            cache: CacheConfig {
                max_entries,
                max_age,
                retain_ratio,
            },
            large_content_bytes: raw.large_content_bytes.unwrap_or(DEFAULT_LARGE_CONTENT_BYTES),
            spelling,
        })
    }

    pub fn is_large(&self, raw: &str) -> bool {
        raw.len() > self.large_content_bytes
    }
}
