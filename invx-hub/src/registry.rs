//! Connection registry
//!
//! Process-lifetime set of live dashboard viewers. Mutated by connection
//! lifecycle events and by the dispatcher's eviction path; iterated through
//! point-in-time snapshots so a broadcast never sees a half-updated set.

use invx_common::time::now_millis;
use invx_common::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// A live subscriber to broadcast summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewerHandle {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub connected_at: i64,
}

impl ViewerHandle {
    /// Handle for a viewer connecting now
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            connected_at: now_millis(),
        }
    }
}

/// Registry of connected viewers, keyed by viewer id
///
/// Uses a std RwLock: critical sections never await. A poisoned lock
/// surfaces as `Error::RegistryUnavailable`.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    handles: RwLock<HashMap<String, ViewerHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, ViewerHandle>>> {
        self.handles
            .read()
            .map_err(|_| Error::RegistryUnavailable("registry lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, ViewerHandle>>> {
        self.handles
            .write()
            .map_err(|_| Error::RegistryUnavailable("registry lock poisoned".to_string()))
    }

    /// Add a viewer; an existing handle with the same id is replaced
    pub fn register(&self, handle: ViewerHandle) -> Result<()> {
        let mut handles = self.write()?;
        if handles.insert(handle.id.clone(), handle).is_some() {
            debug!("Viewer id re-registered, previous handle replaced");
        }
        Ok(())
    }

    /// Remove a viewer if present
    ///
    /// Returns whether a handle was removed. Unknown ids are a no-op so a
    /// disconnect arriving after eviction succeeds.
    pub fn unregister(&self, id: &str) -> Result<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    /// Copy of the current handle set, oldest connection first
    pub fn snapshot(&self) -> Result<Vec<ViewerHandle>> {
        let mut handles: Vec<ViewerHandle> = self.read()?.values().cloned().collect();
        handles.sort_by(|a, b| a.connected_at.cmp(&b.connected_at).then_with(|| a.id.cmp(&b.id)));
        Ok(handles)
    }

    /// Registered handle for `id`, if any
    pub fn get(&self, id: &str) -> Result<Option<ViewerHandle>> {
        Ok(self.read()?.get(id).cloned())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }
}
