//! End-to-end tests for activation tracking and decay-based pruning.

use chrono::{DateTime, Duration, TimeZone, Utc};

use scopemem_core::activation::{
    classify_decay_tier, compute_decay_score, decay_report, describe_entry, detect_memory_type,
    identify_prune_candidates, record_access, register_memory, remove_entries, run_maintenance,
    ActivationIndex, ActivationTracker, DecayTier, MemoryHints, MemoryType, RegisterMetadata,
};
use scopemem_core::config::{DecayConfig, RetentionConfig};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn days(n: i64) -> DateTime<Utc> {
    t0() + Duration::days(n)
}

/// Index with a mix of fresh, stale, and protected memories, all created at `t0`.
fn seeded() -> ActivationIndex {
    let mut idx = ActivationIndex::new();
    register_memory(&mut idx, "fact-old", MemoryType::Semantic, None, t0());
    register_memory(&mut idx, "chat-old", MemoryType::Episodic, None, t0());
    register_memory(&mut idx, "howto", MemoryType::Procedural, None, t0());
    register_memory(&mut idx, "secret", MemoryType::Vault, None, t0());
    register_memory(
        &mut idx,
        "pinned-fact",
        MemoryType::Semantic,
        Some(RegisterMetadata::pinned(true).with_label("deploy key location")),
        t0(),
    );
    idx
}

#[test]
fn test_exact_scores_at_creation() {
    let cfg = DecayConfig::default();
    let mut idx = ActivationIndex::new();
    register_memory(&mut idx, "fresh", MemoryType::Semantic, None, t0());
    let score = compute_decay_score(idx.get("fresh").unwrap(), t0(), &cfg);
    assert!((score - 1.2).abs() < 1e-9);

    record_access(&mut idx, "fresh", None, t0());
    let score = compute_decay_score(idx.get("fresh").unwrap(), t0(), &cfg);
    assert!((score - 1.902).abs() < 1e-3);
}

#[test]
fn test_maintenance_prunes_stale_and_keeps_protected() {
    let cfg = DecayConfig::default();
    let threshold = RetentionConfig::default().prune_threshold;
    let mut idx = seeded();

    // Keep the procedure warm.
    record_access(&mut idx, "howto", None, days(170));

    let report = run_maintenance(&mut idx, threshold, days(200), &cfg);
    assert_eq!(report.removed_ids, vec!["chat-old", "fact-old"]);
    assert_eq!(report.remaining_count, 3);
    assert!(idx.contains("howto"));
    assert!(idx.contains("secret"));
    assert!(idx.contains("pinned-fact"));
    assert!(!idx.contains("fact-old"));
    assert!(!idx.contains("chat-old"));
}

#[test]
fn test_candidates_ordered_weakest_first() {
    let cfg = DecayConfig::default();
    let idx = seeded();
    // Equal age and access count: episodic < procedural < semantic.
    let candidates = identify_prune_candidates(&idx, 0.02, days(200), &cfg);
    assert_eq!(candidates, vec!["chat-old", "howto", "fact-old"]);
}

#[test]
fn test_protected_survive_any_threshold() {
    let cfg = DecayConfig::default();
    let idx = seeded();
    let candidates = identify_prune_candidates(&idx, f64::MAX, days(10_000), &cfg);
    assert!(!candidates.iter().any(|id| id == "secret" || id == "pinned-fact"));
    assert_eq!(candidates.len(), 3);
}

#[test]
fn test_vault_registration_pins_by_default() {
    let mut idx = ActivationIndex::new();
    register_memory(&mut idx, "v", MemoryType::Vault, None, t0());
    register_memory(
        &mut idx,
        "v-unpinned",
        MemoryType::Vault,
        Some(RegisterMetadata::pinned(false)),
        t0(),
    );
    assert!(idx.get("v").unwrap().pinned);
    // Vault type alone still protects it.
    let cfg = DecayConfig::default();
    let score = compute_decay_score(idx.get("v-unpinned").unwrap(), days(5_000), &cfg);
    assert!(score.is_infinite());
    assert_eq!(classify_decay_tier(score), DecayTier::Active);
}

#[test]
fn test_tier_progression_over_time() {
    let cfg = DecayConfig::default();
    let mut idx = ActivationIndex::new();
    register_memory(&mut idx, "m", MemoryType::Semantic, None, t0());
    let entry = idx.get("m").unwrap().clone();

    let tiers: Vec<DecayTier> = [0, 30, 100, 200]
        .iter()
        .map(|d| describe_entry(&entry, days(*d), &cfg).tier)
        .collect();
    assert_eq!(
        tiers,
        vec![
            DecayTier::Active,
            DecayTier::Fading,
            DecayTier::Dormant,
            DecayTier::Archived
        ]
    );
}

#[test]
fn test_decay_report_counts() {
    let cfg = DecayConfig::default();
    let idx = seeded();
    let report = decay_report(&idx, t0(), &cfg);
    assert_eq!(report.pinned, 2);
    assert_eq!(report.active, 5);
    assert_eq!(report.total(), 5);

    let later = decay_report(&idx, days(200), &cfg);
    assert_eq!(later.archived, 3);
    assert_eq!(later.active, 2);
}

#[test]
fn test_remove_entries_idempotent() {
    let mut idx = seeded();
    assert_eq!(remove_entries(&mut idx, &["fact-old", "missing"]), 1);
    assert_eq!(remove_entries(&mut idx, &["fact-old"]), 0);
    assert_eq!(idx.len(), 4);
}

#[test]
fn test_detected_type_feeds_registration() {
    let mut idx = ActivationIndex::new();
    let inputs = [
        ("a", "How to rotate the API keys: step 1, run the script", None),
        ("b", "We decided in yesterday's meeting to ship Friday", None),
        ("c", "The staging cluster runs in eu-west-1", None),
        ("d", "root password hint", Some(MemoryHints { pinned: false, vault: true })),
    ];
    for (id, text, hints) in inputs {
        let kind = detect_memory_type(text, hints.as_ref());
        register_memory(&mut idx, id, kind, None, t0());
    }
    assert_eq!(idx.get("a").unwrap().memory_type, MemoryType::Procedural);
    assert_eq!(idx.get("b").unwrap().memory_type, MemoryType::Episodic);
    assert_eq!(idx.get("c").unwrap().memory_type, MemoryType::Semantic);
    assert_eq!(idx.get("d").unwrap().memory_type, MemoryType::Vault);
    assert!(idx.get("d").unwrap().pinned);
}

#[tokio::test]
async fn test_tracker_serializes_concurrent_writers() {
    let tracker = ActivationTracker::new(ActivationIndex::new(), DecayConfig::default());
    tracker
        .register_memory("shared", MemoryType::Semantic, None)
        .await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let tracker = tracker.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..25 {
                tracker.record_access("shared", None).await;
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    assert_eq!(tracker.get("shared").await.unwrap().access_count, 200);
    let report = tracker.prune(0.02).await;
    assert!(report.removed_ids.is_empty());
    assert_eq!(report.remaining_count, 1);
}
