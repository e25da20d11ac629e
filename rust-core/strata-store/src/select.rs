// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend liveness probe and first-success-wins selection.
//
// Storage availability is environment-dependent: a restricted context can
// throw on first access (quota, permission denial). The probe converts
// "unknown availability" into a deterministic decision made exactly once,
// at construction. This is the single place in the crate where backend
// errors are intentionally swallowed: a throwing candidate is evidence of
// unavailability, not a reportable fault.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::BackendError;

/// Reserved key (and value) written during the liveness self-test.
pub const PROBE_KEY: &str = "__store__test__";

/// Probe a candidate backend with a write/read-back/remove self-test.
///
/// The candidate is live iff every step succeeds and the read-back equals
/// the written value exactly. The reserved key is removed on the way out,
/// so a passing probe leaves no residue.
pub fn probe(backend: &dyn Backend) -> bool {
    let attempt = || -> Result<bool, BackendError> {
        backend.write(&[(PROBE_KEY, PROBE_KEY)])?;
        let echoed = backend.read(PROBE_KEY)?;
        backend.remove(PROBE_KEY)?;
        Ok(echoed.as_deref() == Some(PROBE_KEY))
    };
    match attempt() {
        Ok(true) => {
            debug!(backend = backend.name(), "probe passed");
            true
        }
        Ok(false) => {
            debug!(backend = backend.name(), "probe read back a different value");
            false
        }
        Err(err) => {
            debug!(backend = backend.name(), error = %err, "probe failed");
            false
        }
    }
}

/// Walk an ordered candidate list and commit to the first live backend.
///
/// Candidates after the first success are never probed; there is no
/// quality ranking beyond list order. Returns `None` when no candidate
/// passes; the caller represents that as an explicitly disabled store
/// rather than a null backend.
pub fn select_first_live(candidates: Vec<Arc<dyn Backend>>) -> Option<Arc<dyn Backend>> {
    for candidate in candidates {
        if probe(candidate.as_ref()) {
            info!(backend = candidate.name(), "selected live backend");
            return Some(candidate);
        }
    }
    warn!("no live backend among candidates");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;

    #[test]
    fn test_probe_passes_on_memory_backend() {
        let backend = MemoryBackend::new();
        assert!(probe(&backend));
        // No residue: the reserved key was removed.
        assert_eq!(backend.read(PROBE_KEY).unwrap(), None);
        assert!(backend.is_empty());
    }

    #[test]
    fn test_probe_does_not_disturb_existing_entries() {
        let backend = MemoryBackend::new();
        backend.write(&[("keep", "me")]).unwrap();
        assert!(probe(&backend));
        assert_eq!(backend.read("keep").unwrap(), Some("me".to_string()));
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_select_first_live_commits_to_first_passing() {
        let a: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let b: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let selected = select_first_live(vec![a.clone(), b]).unwrap();
        assert!(Arc::ptr_eq(&selected, &a));
    }

    #[test]
    fn test_select_first_live_empty_list() {
        assert!(select_first_live(Vec::new()).is_none());
    }
}
