//! Index mutations and the retention (prune) pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::decay::{classify_decay_tier, compute_decay_score, DecayTier};
use super::entry::{ActivationEntry, ActivationIndex, MemoryType, RegisterMetadata};
use crate::config::DecayConfig;
use crate::metrics::METRICS;
use crate::obs::emit_retention_pruned;

/// Record one access of `memory_id` at `now`.
///
/// Existing entries get `access_count + 1` and a fresh `last_accessed_at`;
/// type and pin state are untouched. Unknown ids are created with
/// `access_count = 1`, unpinned, typed `memory_type` (semantic if `None`).
pub fn record_access(
    index: &mut ActivationIndex,
    memory_id: &str,
    memory_type: Option<MemoryType>,
    now: DateTime<Utc>,
) {
    index
        .entries_mut()
        .entry(memory_id.to_string())
        .and_modify(|e| {
            e.access_count = e.access_count.saturating_add(1);
            e.last_accessed_at = now;
        })
        .or_insert_with(|| ActivationEntry {
            memory_id: memory_id.to_string(),
            memory_type: memory_type.unwrap_or(MemoryType::Semantic),
            created_at: now,
            last_accessed_at: now,
            access_count: 1,
            pinned: false,
            label: None,
            dataset_name: None,
        });
}

/// Register a memory created by the system, with `access_count = 0`.
///
/// `pinned` defaults to `memory_type == Vault`; an explicit
/// `metadata.pinned` wins. Replaces any existing entry for `memory_id`.
pub fn register_memory(
    index: &mut ActivationIndex,
    memory_id: &str,
    memory_type: MemoryType,
    metadata: Option<RegisterMetadata>,
    now: DateTime<Utc>,
) {
    let metadata = metadata.unwrap_or_default();
    let entry = ActivationEntry {
        memory_id: memory_id.to_string(),
        memory_type,
        created_at: now,
        last_accessed_at: now,
        access_count: 0,
        pinned: metadata
            .pinned
            .unwrap_or(memory_type == MemoryType::Vault),
        label: metadata.label,
        dataset_name: metadata.dataset_name,
    };
    if index
        .entries_mut()
        .insert(memory_id.to_string(), entry)
        .is_some()
    {
        debug!(memory_id = %memory_id, "re-registered memory, activation history reset");
    }
}

/// Ids of entries eligible for pruning: not vault, not pinned, and scoring
/// below `threshold`. Ordered lowest score first, then by id.
pub fn identify_prune_candidates(
    index: &ActivationIndex,
    threshold: f64,
    now: DateTime<Utc>,
    config: &DecayConfig,
) -> Vec<String> {
    let mut candidates: Vec<(f64, &str)> = index
        .entries()
        .filter(|e| e.memory_type != MemoryType::Vault && !e.pinned)
        .map(|e| (compute_decay_score(e, now, config), e.memory_id.as_str()))
        .filter(|(score, _)| *score < threshold)
        .collect();
    candidates.sort_by(|(sa, ia), (sb, ib)| sa.total_cmp(sb).then_with(|| ia.cmp(ib)));
    candidates.into_iter().map(|(_, id)| id.to_string()).collect()
}

/// Delete the listed entries. Unknown ids are ignored. Returns how many
/// entries were actually removed.
pub fn remove_entries<S: AsRef<str>>(index: &mut ActivationIndex, memory_ids: &[S]) -> usize {
    let mut removed = 0;
    for id in memory_ids {
        let id: &str = id.as_ref();
        if index.entries_mut().remove(id).is_some() {
            removed += 1;
        }
    }
    removed
}

/// Outcome of a maintenance pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruneReport {
    pub removed_ids: Vec<String>,
    pub remaining_count: usize,
    pub threshold: f64,
}

/// Identify prune candidates and remove them in one pass.
pub fn run_maintenance(
    index: &mut ActivationIndex,
    threshold: f64,
    now: DateTime<Utc>,
    config: &DecayConfig,
) -> PruneReport {
    let removed_ids = identify_prune_candidates(index, threshold, now, config);
    remove_entries(index, &removed_ids);

    METRICS.add_memories_pruned(removed_ids.len() as u64);
    emit_retention_pruned(removed_ids.len(), index.len(), threshold);

    PruneReport {
        removed_ids,
        remaining_count: index.len(),
        threshold,
    }
}

/// Score and tier of a single entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDecay {
    pub memory_id: String,
    pub memory_type: MemoryType,
    /// `None` when the entry is protected (infinite score).
    pub score: Option<f64>,
    pub tier: DecayTier,
}

pub fn describe_entry(entry: &ActivationEntry, now: DateTime<Utc>, config: &DecayConfig) -> EntryDecay {
    let score = compute_decay_score(entry, now, config);
    EntryDecay {
        memory_id: entry.memory_id.clone(),
        memory_type: entry.memory_type,
        score: score.is_finite().then_some(score),
        tier: classify_decay_tier(score),
    }
}

/// Entry counts per retention tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayReport {
    pub active: usize,
    pub fading: usize,
    pub dormant: usize,
    pub archived: usize,
    /// Pinned or vault entries; also counted as active.
    pub pinned: usize,
}

impl DecayReport {
    pub fn total(&self) -> usize {
        self.active + self.fading + self.dormant + self.archived
    }
}

pub fn decay_report(index: &ActivationIndex, now: DateTime<Utc>, config: &DecayConfig) -> DecayReport {
    let mut report = DecayReport::default();
    for entry in index.entries() {
        if entry.is_protected() {
            report.pinned += 1;
        }
        match classify_decay_tier(compute_decay_score(entry, now, config)) {
            DecayTier::Active => report.active += 1,
            DecayTier::Fading => report.fading += 1,
            DecayTier::Dormant => report.dormant += 1,
            DecayTier::Archived => report.archived += 1,
        }
    }
    report
}
