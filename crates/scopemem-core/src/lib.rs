//! scopemem core library
//!
//! Decay-based retention and scope-aware recall for a multi-tenant agent
//! memory. See [`scope`] for dataset resolution, [`activation`] for the
//! retention engine, and [`query`] for the parallel router.

pub mod activation;
pub mod config;
pub mod error;
pub mod metrics;
pub mod obs;
pub mod query;
pub mod scope;
pub mod telemetry;

pub use activation::{
    classify_decay_tier, compute_decay_score, decay_report, describe_entry, detect_memory_type,
    identify_prune_candidates, record_access, register_memory, remove_entries, run_maintenance,
    ActivationEntry, ActivationIndex, ActivationStore, ActivationTracker, DecayReport, DecayTier,
    EntryDecay, FsActivationStore, MemoryActivationStore, MemoryHints, MemoryType, PruneReport,
    RegisterMetadata, ACTIVATION_INDEX_VERSION,
};
pub use config::{DecayConfig, MemoryConfig, RetentionConfig, RouterConfig, TypeWeights, DAY_MS};
pub use error::{MemoryError, MemoryResult, SearchError};
pub use metrics::METRICS;
pub use query::{
    filter_private_results, query_scoped_knowledge, CancellationSignal, DatasetIdMap,
    HttpExecutorConfig, HttpSearchExecutor, QueryOptions, ScopedQueryResult, ScopedSearchResult,
    SearchExecutor, SearchHit, SearchRequest, SearchType,
};
pub use scope::{
    classify_dataset, resolve_recall_datasets, resolve_scope, resolve_write_dataset,
    DatasetClass, InMemoryScopeOverrides, ProjectRef, ScopeContext, ScopeOverride,
    ScopeOverrideStore, ScopeTier,
};
pub use telemetry::init_tracing;

/// Crate version, for CLI banners and user agents.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
