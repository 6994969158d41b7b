//! Scope tiers and dataset resolution.
//!
//! A request arrives with a [`ScopeContext`]; the functions here decide which
//! datasets a read may search, where a write lands, and how privacy-sensitive
//! any dataset name is.
//!
//! # Module layout
//!
//! - [`context`]: `ScopeTier`, `ProjectRef`, `ScopeContext`
//! - [`datasets`]: dataset naming, `resolve_recall_datasets`, `resolve_write_dataset`, `classify_dataset`
//! - [`overrides`]: session-keyed `ScopeOverrideStore` and `resolve_scope`

pub mod context;
pub mod datasets;
pub mod overrides;

pub use context::{ProjectRef, ScopeContext, ScopeTier};
pub use datasets::{
    classify_dataset, private_dataset, profile_dataset, project_dataset, resolve_recall_datasets,
    resolve_write_dataset, DatasetClass, TEAM_PROPOSED_DATASET, TEAM_SHARED_DATASET,
};
pub use overrides::{resolve_scope, InMemoryScopeOverrides, ScopeOverride, ScopeOverrideStore};
