//! Activation tracking and decay-based retention.
//!
//! Every read or write of a memory updates its activation entry. A periodic
//! maintenance pass scores entries by recency, frequency, and type, and
//! prunes those that fell below a threshold. Pinned and vault memories are
//! never pruned.

pub mod decay;
pub mod detect;
pub mod engine;
pub mod entry;
pub mod store;
pub mod tracker;

pub use decay::{classify_decay_tier, compute_decay_score, DecayTier};
pub use detect::{detect_memory_type, MemoryHints};
pub use engine::{
    decay_report, describe_entry, identify_prune_candidates, record_access, register_memory,
    remove_entries, run_maintenance, DecayReport, EntryDecay, PruneReport,
};
pub use entry::{
    ActivationEntry, ActivationIndex, MemoryType, RegisterMetadata, ACTIVATION_INDEX_VERSION,
};
pub use store::{ActivationStore, FsActivationStore, MemoryActivationStore};
pub use tracker::ActivationTracker;
