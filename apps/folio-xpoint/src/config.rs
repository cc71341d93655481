//! Configuration management for position indexing

use std::env;
use std::time::Duration;

use crate::index::IndexLimits;
use crate::resolver::OmittedFragmentPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub indexing: IndexingConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone)]
pub struct IndexingConfig {
    /// Wall-clock bound for one book build, in seconds
    pub timeout_secs: u64,
    pub max_spine_units: usize,
    pub max_unit_bytes: usize,
    pub max_elements: usize,
    /// Walk content units on the rayon pool
    pub parallel: bool,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub omitted_fragment: OmittedFragmentPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indexing: IndexingConfig::default(),
            resolver: ResolverConfig {
                omitted_fragment: OmittedFragmentPolicy::AssumeFirst,
            },
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        IndexingConfig {
            timeout_secs: 120,
            max_spine_units: 10_000,
            max_unit_bytes: 32 * 1024 * 1024,
            max_elements: 5_000_000,
            parallel: true,
        }
    }
}

impl IndexingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn limits(&self) -> IndexLimits {
        IndexLimits {
            max_units: self.max_spine_units,
            max_unit_bytes: self.max_unit_bytes,
            max_elements: self.max_elements,
            timeout: Some(self.timeout()),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, value);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from `XPOINT_*` environment variables
    ///
    /// Unset or unparseable variables fall back to [`Config::default`].
    pub fn from_env() -> Self {
        let defaults = IndexingConfig::default();

        Config {
            indexing: IndexingConfig {
                timeout_secs: env_or("XPOINT_INDEX_TIMEOUT_SECS", defaults.timeout_secs),
                max_spine_units: env_or("XPOINT_MAX_SPINE_UNITS", defaults.max_spine_units),
                max_unit_bytes: env_or("XPOINT_MAX_UNIT_BYTES", defaults.max_unit_bytes),
                max_elements: env_or("XPOINT_MAX_ELEMENTS", defaults.max_elements),
                parallel: env_or("XPOINT_PARALLEL", defaults.parallel),
            },
            resolver: ResolverConfig {
                omitted_fragment: env_or(
                    "XPOINT_OMITTED_FRAGMENT",
                    OmittedFragmentPolicy::default(),
                ),
            },
        }
    }
}
