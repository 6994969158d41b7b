//! Persistence for the activation index.
//!
//! The on-disk form is the JSON encoding of [`ActivationIndex`]:
//! `{ "version": 1, "entries": { "<memoryId>": { ... } } }`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::debug;

use super::entry::{ActivationIndex, ACTIVATION_INDEX_VERSION};
use crate::error::{MemoryError, MemoryResult};

/// Load/save interface for an activation index.
///
/// Guarantees:
/// - `load` on a store that was never saved returns an empty index.
/// - `save` followed by `load` returns an index equal to the one saved.
pub trait ActivationStore: Send + Sync {
    fn load(&self) -> MemoryResult<ActivationIndex>;

    fn save(&self, index: &ActivationIndex) -> MemoryResult<()>;
}

fn check_version(index: &ActivationIndex) -> MemoryResult<()> {
    if index.version > ACTIVATION_INDEX_VERSION {
        return Err(MemoryError::UnsupportedVersion {
            found: index.version,
            supported: ACTIVATION_INDEX_VERSION,
        });
    }
    Ok(())
}

/// JSON file store with atomic replace-on-save.
#[derive(Debug, Clone)]
pub struct FsActivationStore {
    path: PathBuf,
}

impl FsActivationStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActivationStore for FsActivationStore {
    fn load(&self) -> MemoryResult<ActivationIndex> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no activation index on disk, starting empty");
                return Ok(ActivationIndex::new());
            }
            Err(e) => return Err(e.into()),
        };
        let index: ActivationIndex = serde_json::from_slice(&raw)?;
        check_version(&index)?;
        Ok(index)
    }

    fn save(&self, index: &ActivationIndex) -> MemoryResult<()> {
        check_version(index)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Atomic write: temp file in the same directory, then rename over.
        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, index)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), entries = index.len(), "activation index saved");
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryActivationStore {
    saved: Mutex<Option<ActivationIndex>>,
}

impl MemoryActivationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActivationStore for MemoryActivationStore {
    fn load(&self) -> MemoryResult<ActivationIndex> {
        let saved = self.saved.lock().unwrap_or_else(|e| e.into_inner());
        Ok(saved.clone().unwrap_or_default())
    }

    fn save(&self, index: &ActivationIndex) -> MemoryResult<()> {
        check_version(index)?;
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(index.clone());
        Ok(())
    }
}
