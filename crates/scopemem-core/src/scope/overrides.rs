//! Session-keyed scope overrides.
//!
//! A chat session can pin itself to a different tier (for example "answer
//! from the team knowledge base for the rest of this thread"). Overrides live
//! in an injected [`ScopeOverrideStore`]; there is no process-wide registry.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::context::{ProjectRef, ScopeContext, ScopeTier};

/// Replacement tier (and optionally project) for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeOverride {
    pub tier: ScopeTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
}

/// Storage for per-session scope overrides.
pub trait ScopeOverrideStore: Send + Sync {
    fn get(&self, session_key: &str) -> Option<ScopeOverride>;

    /// Set or replace the override for a session.
    fn set(&self, session_key: &str, scope: ScopeOverride);

    /// Remove one override. Returns whether one was present.
    fn clear(&self, session_key: &str) -> bool;

    /// Remove every override. Returns how many were removed.
    fn clear_all(&self) -> usize;
}

/// In-process override store.
#[derive(Debug, Default)]
pub struct InMemoryScopeOverrides {
    overrides: RwLock<HashMap<String, ScopeOverride>>,
}

impl InMemoryScopeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.overrides
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ScopeOverrideStore for InMemoryScopeOverrides {
    fn get(&self, session_key: &str) -> Option<ScopeOverride> {
        self.overrides
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_key)
            .cloned()
    }

    fn set(&self, session_key: &str, scope: ScopeOverride) {
        self.overrides
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session_key.to_string(), scope);
    }

    fn clear(&self, session_key: &str) -> bool {
        self.overrides
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(session_key)
            .is_some()
    }

    fn clear_all(&self) -> usize {
        let mut guard = self.overrides.write().unwrap_or_else(|e| e.into_inner());
        let n = guard.len();
        guard.clear();
        n
    }
}

/// Apply any stored override for `session_key` on top of `base`.
///
/// An override swaps the tier, and the project when it names one. The user
/// and the group-session flag always come from `base`, so an override can
/// never re-enable private datasets inside a group session.
pub fn resolve_scope(
    session_key: &str,
    base: ScopeContext,
    store: &dyn ScopeOverrideStore,
) -> ScopeContext {
    match store.get(session_key) {
        Some(ov) => ScopeContext {
            tier: ov.tier,
            project: ov.project.or(base.project),
            ..base
        },
        None => base,
    }
}
