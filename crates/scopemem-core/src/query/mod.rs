//! Scope-aware recall across datasets.
//!
//! [`query_scoped_knowledge`] resolves the datasets visible to a scope,
//! searches them in parallel under one deadline, strips private results
//! from group sessions, then ranks and deduplicates.

pub mod executor;
pub mod http;
pub mod privacy;
pub mod router;
pub mod types;

pub use executor::{CancellationSignal, CancellationTrigger, SearchExecutor, SearchRequest};
pub use http::{HttpExecutorConfig, HttpSearchExecutor, DEFAULT_SEARCH_PATH};
pub use privacy::{filter_private_results, PrivacyFiltered, ResultKey};
pub use router::{query_scoped_knowledge, rank_results};
pub use types::{
    DatasetIdMap, QueryOptions, ScopedQueryResult, ScopedSearchResult, SearchHit, SearchType,
};
