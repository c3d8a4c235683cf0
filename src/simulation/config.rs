/*!
 * Simulation Configuration
 * Heap layout, split overhead, pacing and allocation modes
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{DEFAULT_BLOCK_SIZES, DEFAULT_SPLIT_OVERHEAD, DEFAULT_STEP_INTERVAL_MS};
use crate::core::types::{Lifetime, Size};
use crate::memory::AllocationStrategy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Simulation configuration
///
/// Environment variables (all optional):
/// - SIM_BLOCK_SIZES: comma-separated block sizes, declaration order
/// - SIM_SPLIT_OVERHEAD: units charged per split
/// - SIM_STEP_INTERVAL_MS: milliseconds between steps
/// - SIM_STRATEGY: first-fit | best-fit
/// - SIM_FRAGMENTATION: grant whole blocks instead of splitting
/// - SIM_COMPACTION: compact after a failed allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SimulationConfig {
    pub block_sizes: Vec<Size>,
    pub split_overhead: Size,
    pub step_interval_ms: u64,
    pub strategy: AllocationStrategy,
    pub fragmentation: bool,
    pub compaction: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            block_sizes: DEFAULT_BLOCK_SIZES.to_vec(),
            split_overhead: DEFAULT_SPLIT_OVERHEAD,
            step_interval_ms: DEFAULT_STEP_INTERVAL_MS,
            strategy: AllocationStrategy::default(),
            fragmentation: false,
            compaction: false,
        }
    }
}

impl SimulationConfig {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn with_block_sizes(mut self, block_sizes: Vec<Size>) -> Self {
        self.block_sizes = block_sizes;
        self
    }

    pub fn with_split_overhead(mut self, overhead: Size) -> Self {
        self.split_overhead = overhead;
        self
    }

    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_fragmentation(mut self, enabled: bool) -> Self {
        self.fragmentation = enabled;
        self
    }

    pub fn with_compaction(mut self, enabled: bool) -> Self {
        self.compaction = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_sizes.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }
        if let Some(index) = self.block_sizes.iter().position(|&s| s == 0) {
            return Err(ConfigError::ZeroSizedBlock { index });
        }
        if self.step_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Parse and validate a JSON document; missing keys take defaults
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `SIM_*` overrides from `lookup`, then validate
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("SIM_BLOCK_SIZES") {
            self.block_sizes = parse_sizes("SIM_BLOCK_SIZES", &raw)?;
        }
        if let Some(raw) = lookup("SIM_SPLIT_OVERHEAD") {
            self.split_overhead = parse_number("SIM_SPLIT_OVERHEAD", &raw)?;
        }
        if let Some(raw) = lookup("SIM_STEP_INTERVAL_MS") {
            self.step_interval_ms = parse_number("SIM_STEP_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("SIM_STRATEGY") {
            self.strategy = raw
                .parse()
                .map_err(|reason: String| ConfigError::invalid("SIM_STRATEGY", &raw, reason))?;
        }
        if let Some(raw) = lookup("SIM_FRAGMENTATION") {
            self.fragmentation = parse_flag("SIM_FRAGMENTATION", &raw)?;
        }
        if let Some(raw) = lookup("SIM_COMPACTION") {
            self.compaction = parse_flag("SIM_COMPACTION", &raw)?;
        }
        self.validate()?;
        Ok(self)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, raw, "expected a non-negative integer"))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw, "expected true or false")),
    }
}

fn parse_sizes(key: &str, raw: &str) -> Result<Vec<Size>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_number(key, s))
        .collect()
}

/// Parse a `size:lifetime,size:lifetime` workload list
pub fn parse_workload(raw: &str) -> Result<Vec<(Size, Lifetime)>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (size, lifetime) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::invalid("SIM_WORKLOAD", entry, "expected size:lifetime"))?;
            let size = parse_number("SIM_WORKLOAD", size)?;
            let lifetime = lifetime
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("SIM_WORKLOAD", entry, "lifetime must be an integer"))?;
            Ok((size, lifetime))
        })
        .collect()
}
