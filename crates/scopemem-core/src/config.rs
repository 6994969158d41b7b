//! Tunable parameters for retention and recall.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//! Environment variables override file values:
//!
//! | Variable                   | Field                        |
//! |----------------------------|------------------------------|
//! | `SCOPEMEM_DECAY_RATE`      | `decay.rate_per_unit`        |
//! | `SCOPEMEM_TIMEOUT_MS`      | `router.timeout_ms`          |
//! | `SCOPEMEM_MAX_RESULTS`     | `router.max_results`         |
//! | `SCOPEMEM_MIN_SCORE`       | `router.min_score`           |
//! | `SCOPEMEM_PRUNE_THRESHOLD` | `retention.prune_threshold`  |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::activation::MemoryType;
use crate::error::{MemoryError, MemoryResult};
use crate::query::SearchType;

/// Milliseconds in one day; the default decay time unit.
pub const DAY_MS: i64 = 86_400_000;

/// Multiplier applied to a decay score per memory type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeWeights {
    pub semantic: f64,
    pub procedural: f64,
    pub episodic: f64,
}

impl Default for TypeWeights {
    fn default() -> Self {
        Self {
            semantic: 1.2,
            procedural: 1.0,
            episodic: 0.8,
        }
    }
}

impl TypeWeights {
    /// Weight for `memory_type`. Vault memories never reach the weighting
    /// step, so they get a neutral 1.0.
    pub fn weight(&self, memory_type: MemoryType) -> f64 {
        match memory_type {
            MemoryType::Semantic => self.semantic,
            MemoryType::Procedural => self.procedural,
            MemoryType::Episodic => self.episodic,
            MemoryType::Vault => 1.0,
        }
    }
}

/// Parameters of the exponential decay curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Decay rate per time unit. 0.03/day is a half-life of roughly 23 days.
    pub rate_per_unit: f64,
    /// Length of one time unit in milliseconds.
    pub time_unit_ms: i64,
    pub type_weights: TypeWeights,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            rate_per_unit: 0.03,
            time_unit_ms: DAY_MS,
            type_weights: TypeWeights::default(),
        }
    }
}

impl DecayConfig {
    pub fn with_rate(mut self, rate_per_unit: f64) -> Self {
        self.rate_per_unit = rate_per_unit;
        self
    }

    pub fn with_type_weights(mut self, type_weights: TypeWeights) -> Self {
        self.type_weights = type_weights;
        self
    }

    /// Half-life expressed in time units.
    pub fn half_life_units(&self) -> f64 {
        std::f64::consts::LN_2 / self.rate_per_unit
    }
}

/// Defaults for scoped queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub search_type: SearchType,
    pub max_tokens: u32,
    pub max_results: usize,
    pub min_score: f64,
    pub timeout_ms: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            search_type: SearchType::GraphCompletion,
            max_tokens: 4096,
            max_results: 10,
            min_score: 0.0,
            timeout_ms: 30_000,
        }
    }
}

impl RouterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Maintenance-pass parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Entries scoring below this are pruned.
    pub prune_threshold: f64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            prune_threshold: 0.02,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub decay: DecayConfig,
    pub router: RouterConfig,
    pub retention: RetentionConfig,
}

impl MemoryConfig {
    pub fn from_toml_str(s: &str) -> MemoryResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> MemoryResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> MemoryResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Overlay `SCOPEMEM_*` environment variables onto this config.
    pub fn apply_env(&mut self) -> MemoryResult<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> MemoryResult<()> {
        if let Some(v) = lookup("SCOPEMEM_DECAY_RATE") {
            self.decay.rate_per_unit = parse_var("SCOPEMEM_DECAY_RATE", &v)?;
        }
        if let Some(v) = lookup("SCOPEMEM_TIMEOUT_MS") {
            self.router.timeout_ms = parse_var("SCOPEMEM_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("SCOPEMEM_MAX_RESULTS") {
            self.router.max_results = parse_var("SCOPEMEM_MAX_RESULTS", &v)?;
        }
        if let Some(v) = lookup("SCOPEMEM_MIN_SCORE") {
            self.router.min_score = parse_var("SCOPEMEM_MIN_SCORE", &v)?;
        }
        if let Some(v) = lookup("SCOPEMEM_PRUNE_THRESHOLD") {
            self.retention.prune_threshold = parse_var("SCOPEMEM_PRUNE_THRESHOLD", &v)?;
        }
        self.validate()
    }

    fn validate(&self) -> MemoryResult<()> {
        if !(self.decay.rate_per_unit > 0.0 && self.decay.rate_per_unit.is_finite()) {
            return Err(MemoryError::Config(format!(
                "decay.rate_per_unit must be positive and finite, got {}",
                self.decay.rate_per_unit
            )));
        }
        if self.decay.time_unit_ms <= 0 {
            return Err(MemoryError::Config(format!(
                "decay.time_unit_ms must be positive, got {}",
                self.decay.time_unit_ms
            )));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> MemoryResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MemoryError::Config(format!("{key}: cannot parse {value:?}")))
}
