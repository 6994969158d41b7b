//! `reqwest`-backed search executor for a remote knowledge-graph service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::executor::{SearchExecutor, SearchRequest};
use super::types::{SearchHit, SearchType};
use crate::error::{MemoryError, MemoryResult, SearchError};

pub const DEFAULT_SEARCH_PATH: &str = "/api/v1/search";

/// Connection settings for [`HttpSearchExecutor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpExecutorConfig {
    pub base_url: String,
    /// Bearer token; omitted for unauthenticated backends.
    pub token: Option<String>,
    pub search_path: String,
}

impl HttpExecutorConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            search_path: DEFAULT_SEARCH_PATH.to_string(),
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_search_path(mut self, path: &str) -> Self {
        self.search_path = path.to_string();
        self
    }

    /// Read `SCOPEMEM_BACKEND_URL` (required) and `SCOPEMEM_BACKEND_TOKEN`.
    pub fn from_env() -> MemoryResult<Self> {
        let base_url = std::env::var("SCOPEMEM_BACKEND_URL")
            .map_err(|_| MemoryError::Config("SCOPEMEM_BACKEND_URL is not set".to_string()))?;
        let mut config = Self::new(&base_url);
        config.token = std::env::var("SCOPEMEM_BACKEND_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        Ok(config)
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, self.search_path)
    }
}

#[derive(Debug, Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    search_type: SearchType,
    dataset_ids: &'a [String],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Hits(Vec<SearchHit>),
    Wrapped { results: Vec<SearchHit> },
}

impl SearchResponse {
    fn into_hits(self) -> Vec<SearchHit> {
        match self {
            Self::Hits(hits) | Self::Wrapped { results: hits } => hits,
        }
    }
}

/// Issues one `POST` per search request.
pub struct HttpSearchExecutor {
    config: HttpExecutorConfig,
    http_client: reqwest::Client,
}

impl HttpSearchExecutor {
    pub fn new(config: HttpExecutorConfig) -> MemoryResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("scopemem/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MemoryError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn from_env() -> MemoryResult<Self> {
        Self::new(HttpExecutorConfig::from_env()?)
    }

    pub fn config(&self) -> &HttpExecutorConfig {
        &self.config
    }

    async fn post_search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
        let body = SearchBody {
            query: &request.query_text,
            search_type: request.search_type,
            dataset_ids: &request.dataset_ids,
            max_tokens: request.max_tokens,
        };

        let mut builder = self.http_client.post(self.config.search_url()).json(&body);
        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        let parsed: SearchResponse =
            serde_json::from_slice(&bytes).map_err(|e| SearchError::Decode(e.to_string()))?;
        Ok(parsed.into_hits())
    }
}

#[async_trait]
impl SearchExecutor for HttpSearchExecutor {
    async fn search(&self, request: SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
        debug!(datasets = ?request.dataset_ids, search_type = %request.search_type, "posting search");
        let cancel = request.cancel.clone();
        tokio::select! {
            outcome = self.post_search(&request) => outcome,
            _ = cancel.cancelled() => Err(SearchError::Cancelled),
        }
    }
}
