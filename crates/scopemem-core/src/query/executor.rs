//! Search backend seam and the shared cancellation signal.

use async_trait::async_trait;
use tokio::sync::watch;

use super::types::{SearchHit, SearchType};
use crate::error::SearchError;

/// Fires once; every clone of the paired [`CancellationSignal`] observes it.
#[derive(Debug)]
pub struct CancellationTrigger {
    tx: watch::Sender<bool>,
}

impl CancellationTrigger {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Cloneable, read-only view of a cancellation trigger.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    rx: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// A connected trigger/signal pair.
    pub fn pair() -> (CancellationTrigger, CancellationSignal) {
        let (tx, rx) = watch::channel(false);
        (CancellationTrigger { tx }, CancellationSignal { rx })
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        let (trigger, signal) = Self::pair();
        // Dropping the trigger closes the channel without firing.
        drop(trigger);
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the trigger fires. Pends forever if the trigger is
    /// dropped without firing.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                if *rx.borrow() {
                    return;
                }
                std::future::pending::<()>().await;
            }
        }
    }
}

/// One search against one or more backend datasets.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query_text: String,
    pub search_type: SearchType,
    pub dataset_ids: Vec<String>,
    pub max_tokens: u32,
    pub cancel: CancellationSignal,
}

/// Remote knowledge-graph/search service.
///
/// Implementations may fail freely; the router treats any error as an
/// empty result for that dataset. Long-running implementations should
/// observe `request.cancel`.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    async fn search(&self, request: SearchRequest) -> Result<Vec<SearchHit>, SearchError>;
}
