//! Lock-guarded owner of an activation index.
//!
//! The free functions in [`super::engine`] mutate an index in place and
//! assume a single writer. `ActivationTracker` holds the index behind a
//! `tokio::sync::Mutex` so concurrent tasks can share one index without
//! losing updates.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use super::engine::{self, DecayReport, PruneReport};
use super::entry::{ActivationEntry, ActivationIndex, MemoryType, RegisterMetadata};
use super::store::ActivationStore;
use crate::config::DecayConfig;
use crate::error::MemoryResult;

/// Shared, serialized access to one [`ActivationIndex`].
#[derive(Debug, Clone)]
pub struct ActivationTracker {
    index: Arc<Mutex<ActivationIndex>>,
    config: DecayConfig,
}

impl ActivationTracker {
    pub fn new(index: ActivationIndex, config: DecayConfig) -> Self {
        Self {
            index: Arc::new(Mutex::new(index)),
            config,
        }
    }

    /// Load the index from `store`.
    pub fn load(store: &dyn ActivationStore, config: DecayConfig) -> MemoryResult<Self> {
        Ok(Self::new(store.load()?, config))
    }

    /// Persist a consistent snapshot to `store`.
    pub async fn persist(&self, store: &dyn ActivationStore) -> MemoryResult<()> {
        let snapshot = self.snapshot().await;
        store.save(&snapshot)
    }

    pub fn config(&self) -> &DecayConfig {
        &self.config
    }

    pub async fn record_access(&self, memory_id: &str, memory_type: Option<MemoryType>) {
        let mut index = self.index.lock().await;
        engine::record_access(&mut index, memory_id, memory_type, Utc::now());
    }

    pub async fn register_memory(
        &self,
        memory_id: &str,
        memory_type: MemoryType,
        metadata: Option<RegisterMetadata>,
    ) {
        let mut index = self.index.lock().await;
        engine::register_memory(&mut index, memory_id, memory_type, metadata, Utc::now());
    }

    pub async fn get(&self, memory_id: &str) -> Option<ActivationEntry> {
        self.index.lock().await.get(memory_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.index.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.lock().await.is_empty()
    }

    /// Clone of the current index.
    pub async fn snapshot(&self) -> ActivationIndex {
        self.index.lock().await.clone()
    }

    /// Run a maintenance pass under the lock.
    pub async fn prune(&self, threshold: f64) -> PruneReport {
        let mut index = self.index.lock().await;
        engine::run_maintenance(&mut index, threshold, Utc::now(), &self.config)
    }

    pub async fn decay_report(&self) -> DecayReport {
        let index = self.index.lock().await;
        engine::decay_report(&index, Utc::now(), &self.config)
    }
}
