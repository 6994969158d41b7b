//! Decay scoring and retention tiers.
//!
//! `score = e^(-rate * age) * log2(access_count + 2) * type_weight`
//!
//! where `age` is time since last access in configured units (days by
//! default). Pinned and vault entries score `+inf`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::ActivationEntry;
use crate::config::DecayConfig;

/// Scores at or above this are active.
pub const ACTIVE_THRESHOLD: f64 = 0.5;
/// Scores at or above this (and below active) are fading.
pub const FADING_THRESHOLD: f64 = 0.15;
/// Scores at or above this (and below fading) are dormant. Below is archived.
pub const DORMANT_THRESHOLD: f64 = 0.02;

/// Retention tier derived from a decay score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayTier {
    Active,
    Fading,
    Dormant,
    Archived,
}

impl std::fmt::Display for DecayTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Fading => write!(f, "fading"),
            Self::Dormant => write!(f, "dormant"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

/// Age of `entry` since last access, in `config.time_unit_ms` units.
///
/// Clock skew that puts the last access in the future counts as age zero.
pub fn age_in_units(entry: &ActivationEntry, now: DateTime<Utc>, config: &DecayConfig) -> f64 {
    let elapsed_ms = now
        .signed_duration_since(entry.last_accessed_at)
        .num_milliseconds()
        .max(0);
    elapsed_ms as f64 / config.time_unit_ms as f64
}

/// Decay score of `entry` at `now`. Returns `f64::INFINITY` for pinned or
/// vault entries.
pub fn compute_decay_score(entry: &ActivationEntry, now: DateTime<Utc>, config: &DecayConfig) -> f64 {
    if entry.is_protected() {
        return f64::INFINITY;
    }

    let age = age_in_units(entry, now, config);
    let recency = (-config.rate_per_unit * age).exp();
    let frequency = (entry.access_count as f64 + 2.0).log2();
    let weight = config.type_weights.weight(entry.memory_type);

    recency * frequency * weight
}

/// Map a decay score to its retention tier.
pub fn classify_decay_tier(score: f64) -> DecayTier {
    if score >= ACTIVE_THRESHOLD {
        DecayTier::Active
    } else if score >= FADING_THRESHOLD {
        DecayTier::Fading
    } else if score >= DORMANT_THRESHOLD {
        DecayTier::Dormant
    } else {
        DecayTier::Archived
    }
}
