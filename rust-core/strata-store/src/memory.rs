// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory storage backend.
//
// A `BTreeMap` behind a `parking_lot::RwLock`: ordered, thread-safe, and
// gone when the process exits. This is the fallback of last resort in a
// candidate list (it always passes the liveness probe) and doubles as the
// session-scoped tier (process-lifetime storage) in environments where
// nothing durable is available.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::backend::Backend;
use crate::error::BackendError;

/// An in-memory storage backend backed by a sorted `BTreeMap`.
///
/// Cloning is cheap and shares state: clones are views of the same map,
/// which is what lets several namespaced facades share one physical
/// backend.
///
/// # Example
///
/// ```rust
/// use strata_store::memory::MemoryBackend;
/// use strata_store::backend::Backend;
///
/// let backend = MemoryBackend::new();
/// backend.write(&[("hello", "world")]).unwrap();
/// assert_eq!(backend.read("hello").unwrap(), Some("world".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True when the backend holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Backend for MemoryBackend {
    fn write(&self, entries: &[(&str, &str)]) -> Result<(), BackendError> {
        let mut map = self.data.write();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.data.write().remove(key);
        Ok(())
    }

    fn each(&self, visit: &mut dyn FnMut(&str, &str)) -> Result<(), BackendError> {
        // Snapshot under the read lock so the visitor may call back into
        // the same backend without deadlocking.
        let snapshot: Vec<(String, String)> = self
            .data
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, value) in &snapshot {
            visit(key, value);
        }
        Ok(())
    }

    fn clear_all(&self) -> Result<(), BackendError> {
        self.data.write().clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
