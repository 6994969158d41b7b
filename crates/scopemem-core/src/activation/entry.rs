//! Activation metadata tracked per stored memory.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Highest activation index layout this build reads and writes.
pub const ACTIVATION_INDEX_VERSION: u32 = 1;

/// Semantic kind of a memory. Drives the decay weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    Semantic,
    Episodic,
    Procedural,
    /// Never decays, never pruned.
    Vault,
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Episodic => write!(f, "episodic"),
            Self::Procedural => write!(f, "procedural"),
            Self::Vault => write!(f, "vault"),
        }
    }
}

impl std::str::FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "episodic" => Ok(Self::Episodic),
            "procedural" => Ok(Self::Procedural),
            "vault" => Ok(Self::Vault),
            other => Err(format!("unknown memory type: {other}")),
        }
    }
}

/// Access history of one memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationEntry {
    pub memory_id: String,
    pub memory_type: MemoryType,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    pub pinned: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
}

impl ActivationEntry {
    /// Whether the entry is exempt from decay and pruning.
    pub fn is_protected(&self) -> bool {
        self.pinned || self.memory_type == MemoryType::Vault
    }
}

/// Optional attributes supplied when registering a memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMetadata {
    /// Explicit pin flag. When absent, vault memories are pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
}

impl RegisterMetadata {
    pub fn pinned(pinned: bool) -> Self {
        Self {
            pinned: Some(pinned),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_dataset(mut self, dataset_name: &str) -> Self {
        self.dataset_name = Some(dataset_name.to_string());
        self
    }
}

/// Activation metadata for every tracked memory, keyed by memory id.
///
/// No internal locking: callers must serialize mutations (see
/// [`crate::activation::ActivationTracker`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivationIndex {
    pub version: u32,
    #[serde(default)]
    entries: BTreeMap<String, ActivationEntry>,
}

impl ActivationIndex {
    pub fn new() -> Self {
        Self {
            version: ACTIVATION_INDEX_VERSION,
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, memory_id: &str) -> Option<&ActivationEntry> {
        self.entries.get(memory_id)
    }

    pub fn contains(&self, memory_id: &str) -> bool {
        self.entries.contains_key(memory_id)
    }

    /// Entries in memory-id order.
    pub fn entries(&self) -> impl Iterator<Item = &ActivationEntry> {
        self.entries.values()
    }

    /// Mutable access to the entry map (used by the retention engine).
    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<String, ActivationEntry> {
        &mut self.entries
    }
}

impl Default for ActivationIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_type_parsing() {
        assert_eq!("Vault".parse::<MemoryType>().unwrap(), MemoryType::Vault);
        assert_eq!("episodic".parse::<MemoryType>().unwrap(), MemoryType::Episodic);
        assert!("working".parse::<MemoryType>().is_err());
    }

    #[test]
    fn test_entry_serde_field_names() {
        let now = Utc::now();
        let entry = ActivationEntry {
            memory_id: "m1".into(),
            memory_type: MemoryType::Procedural,
            created_at: now,
            last_accessed_at: now,
            access_count: 3,
            pinned: false,
            label: Some("deploy steps".into()),
            dataset_name: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["memoryId"], "m1");
        assert_eq!(json["memoryType"], "procedural");
        assert_eq!(json["accessCount"], 3);
        assert!(json.get("datasetName").is_none());
    }

    #[test]
    fn test_new_index_is_current_version() {
        let idx = ActivationIndex::new();
        assert_eq!(idx.version, ACTIVATION_INDEX_VERSION);
        assert!(idx.is_empty());
    }
}
