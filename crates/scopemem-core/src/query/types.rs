//! Result and option types for scoped recall.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::RouterConfig;
use crate::scope::ScopeTier;

/// Read-only `dataset name -> backend dataset id` lookup, owned by the
/// caller and populated by the dataset sync pipeline.
pub type DatasetIdMap = HashMap<String, String>;

/// Retrieval mode requested from the search backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchType {
    GraphCompletion,
    Chunks,
    Summaries,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphCompletion => write!(f, "GRAPH_COMPLETION"),
            Self::Chunks => write!(f, "CHUNKS"),
            Self::Summaries => write!(f, "SUMMARIES"),
        }
    }
}

impl std::str::FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "GRAPH_COMPLETION" => Ok(Self::GraphCompletion),
            "CHUNKS" => Ok(Self::Chunks),
            "SUMMARIES" => Ok(Self::Summaries),
            other => Err(format!("unknown search type: {other}")),
        }
    }
}

/// A raw hit as returned by the search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub score: f64,
}

impl SearchHit {
    pub fn new(id: &str, text: &str, score: f64) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
            score,
        }
    }
}

/// A hit annotated with the dataset and tier it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedSearchResult {
    pub id: String,
    pub text: String,
    pub score: f64,
    /// Dataset name (not the backend id).
    pub source_dataset: String,
    pub source_tier: ScopeTier,
}

/// Outcome of a scoped query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedQueryResult {
    pub results: Vec<ScopedSearchResult>,
    /// Datasets that had a backend id and were searched, successful or not.
    pub datasets_queried: usize,
    /// Annotated results before privacy filtering, score floor, and dedup.
    pub total_before_filter: usize,
}

/// Per-query knobs for [`crate::query::query_scoped_knowledge`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub search_type: SearchType,
    pub max_tokens: u32,
    pub max_results: usize,
    pub min_score: f64,
    /// Shared deadline for the whole fan-out.
    pub timeout: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::from(&RouterConfig::default())
    }
}

impl From<&RouterConfig> for QueryOptions {
    fn from(cfg: &RouterConfig) -> Self {
        Self {
            search_type: cfg.search_type,
            max_tokens: cfg.max_tokens,
            max_results: cfg.max_results,
            min_score: cfg.min_score,
            timeout: cfg.timeout(),
        }
    }
}

impl QueryOptions {
    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&SearchType::GraphCompletion).unwrap(),
            "\"GRAPH_COMPLETION\""
        );
        assert_eq!("chunks".parse::<SearchType>().unwrap(), SearchType::Chunks);
        assert_eq!(
            "graph-completion".parse::<SearchType>().unwrap(),
            SearchType::GraphCompletion
        );
    }

    #[test]
    fn test_default_options() {
        let opts = QueryOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(30));
        assert_eq!(opts.search_type, SearchType::GraphCompletion);
        assert_eq!(opts.min_score, 0.0);
    }
}
