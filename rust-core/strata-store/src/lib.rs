// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Strata: a fallback-aware, namespaced key-value store facade.
//
// Strata sits in front of an ordered list of heterogeneous, possibly
// unavailable storage backends (durable local storage, an ephemeral
// in-memory tier, anything implementing the five-method contract) and
// presents one consistent get/set/remove/each/clear_all surface. At
// construction it probes the candidates with a live write/read/remove
// self-test and commits to the first one that passes; namespace prefixing
// then lets many logical stores share that one physical backend, and a
// defensive JSON codec bridges structured values into the backend's
// string-only storage model, tolerating entries written by foreign code.
//
// # Modules
//
// - [`backend`] -- The `Backend` trait: the contract consumed from storage
//   providers.
// - [`error`] -- `StoreError` and `BackendError`.
// - [`codec`] -- Pure serialize/deserialize with the legacy-tolerance
//   policy.
// - [`namespace`] -- Namespace validation and key prefix/strip rules.
// - [`select`] -- The liveness probe and first-success-wins selection.
// - [`store`] -- The `Store` facade and its construction protocol.
// - [`plugin`] -- The method-table plugin extension point.
// - [`memory`] -- An in-memory `BTreeMap` backend: testing, fallback of
//   last resort, ephemeral workloads.
// - [`observe`] -- A transparent wrapper collecting operation statistics.
//
// # Example
//
// ```rust
// use std::sync::Arc;
// use strata_store::backend::Backend;
// use strata_store::memory::MemoryBackend;
// use strata_store::store::Store;
// use serde_json::json;
//
// // In production the list would start with a durable backend; the
// // memory backend is the always-live fallback.
// let fallback: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
// let store = Store::new(vec![fallback]).unwrap();
//
// store.set("answer", &42).unwrap();
// assert_eq!(store.get_or("answer", json!(0)).unwrap(), json!(42));
//
// // Namespaces isolate logical stores on the shared backend.
// let session = store.namespace("session").unwrap();
// session.set("answer", &"different").unwrap();
// assert_eq!(store.get_as::<u32>("answer").unwrap(), Some(42));
// ```

pub mod backend;
pub mod codec;
pub mod error;
pub mod memory;
pub mod namespace;
pub mod observe;
pub mod plugin;
pub mod select;
pub mod store;

// Optional persistent backend — feature-gated to keep the default build lean.
#[cfg(feature = "redb-backend")]
pub mod redb_backend;

// Re-export the most commonly used types at the crate root for convenience.
pub use backend::Backend;
pub use error::{BackendError, StoreError};
pub use memory::MemoryBackend;
pub use observe::{BackendStats, ObservedBackend};
pub use plugin::{MethodTable, Plugin};
pub use select::{probe, select_first_live};
pub use store::{create_store, RawStore, Store};

#[cfg(feature = "redb-backend")]
pub use redb_backend::RedbBackend;

/// The decoded value type stored and retrieved by a [`Store`].
pub use serde_json::Value;
