// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The store facade: namespace rules + value codec + the selected backend.
//
// Construction runs the backend-selection protocol exactly once; the
// binding is immutable afterwards. A store that found no live backend is
// still a valid object: it is just disabled, and every data operation on
// it fails with `StoreError::NotReady` until the caller builds a new store.
//
// All data operations dispatch through the plugin method table, so a
// plugin-overridden operation applies uniformly whether it is called via
// the facade methods, the detached `raw()` closures, or another plugin.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::backend::Backend;
use crate::codec;
use crate::error::StoreError;
use crate::namespace::Namespace;
use crate::plugin::{apply_plugins, MethodTable, Plugin};
use crate::select::select_first_live;

/// The committed runtime state of one facade: zero or one selected backend
/// plus the resolved namespace. Method-table implementations receive this
/// as their execution context.
pub struct StoreCore {
    /// The bound backend; `None` means the store is disabled.
    backend: Option<Arc<dyn Backend>>,
    /// The resolved namespace (prefix + matcher).
    namespace: Namespace,
}

impl StoreCore {
    /// Whether a live backend is bound.
    pub fn enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// The bound backend, or [`StoreError::NotReady`] when disabled.
    pub fn backend(&self) -> Result<&dyn Backend, StoreError> {
        match &self.backend {
            Some(backend) => Ok(backend.as_ref()),
            None => Err(StoreError::NotReady),
        }
    }

    /// This store's resolved namespace.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

#[cfg(test)]
impl StoreCore {
    /// A core with no backend, for table-level tests.
    pub(crate) fn detached() -> Self {
        Self {
            backend: None,
            namespace: Namespace::root(),
        }
    }
}

/// A namespaced key-value store facade over the first live backend of a
/// candidate list.
///
/// Cloning shares state: a clone is the same logical store, which is also
/// how the detached [`Store::raw`] closures capture their instance.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use strata_store::backend::Backend;
/// use strata_store::memory::MemoryBackend;
/// use strata_store::store::Store;
///
/// let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
/// let store = Store::new(vec![backend]).unwrap();
///
/// store.set("greeting", &"hello").unwrap();
/// assert_eq!(store.get_as::<String>("greeting").unwrap().unwrap(), "hello");
/// ```
#[derive(Clone)]
pub struct Store {
    core: Arc<StoreCore>,
    table: Arc<MethodTable>,
    /// Kept so `namespace()` can re-apply the same plugin list.
    plugins: Arc<Vec<Arc<dyn Plugin>>>,
}

/// Build a store: validate the namespace, probe the candidate backends in
/// order, commit to the first live one, then fold the plugin list over the
/// base method table.
///
/// Fails only with [`StoreError::IllegalNamespace`]; finding no live
/// backend is not a construction error but a disabled store.
pub fn create_store(
    backends: Vec<Arc<dyn Backend>>,
    plugins: Vec<Arc<dyn Plugin>>,
    namespace: &str,
) -> Result<Store, StoreError> {
    let namespace = Namespace::new(namespace)?;
    let backend = select_first_live(backends);
    debug!(
        namespace = namespace.name(),
        enabled = backend.is_some(),
        plugins = plugins.len(),
        "store facade assembled"
    );
    let core = Arc::new(StoreCore { backend, namespace });
    let table = apply_plugins(base_table(), &plugins);
    Ok(Store {
        core,
        table: Arc::new(table),
        plugins: Arc::new(plugins),
    })
}

impl Store {
    /// Probe `backends` in order and build a root store with no plugins.
    pub fn new(backends: Vec<Arc<dyn Backend>>) -> Result<Self, StoreError> {
        create_store(backends, Vec::new(), "")
    }

    /// Whether a live backend is bound. A disabled store fails every data
    /// operation with [`StoreError::NotReady`].
    pub fn enabled(&self) -> bool {
        self.core.enabled()
    }

    /// Name of the bound backend, when one is bound.
    pub fn backend_name(&self) -> Option<&str> {
        self.core.backend.as_ref().map(|b| b.name())
    }

    /// This store's namespace name (`""` for the root store).
    pub fn namespace_name(&self) -> &str {
        self.core.namespace.name()
    }

    /// Whether this store's namespace is exactly `name`.
    pub fn has_namespace(&self, name: &str) -> bool {
        self.core.namespace.name() == name
    }

    /// Read and decode the value under `key`. `Ok(None)` when absent.
    ///
    /// Only "key absent" is softened; backend errors propagate. A raw
    /// entry written by foreign code comes back as `Value::String`.
    pub fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (self.table.get)(&self.core, key)
    }

    /// Read the value under `key`, substituting `default` when absent.
    pub fn get_or(&self, key: &str, default: Value) -> Result<Value, StoreError> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Typed read: decode the stored value into `T`.
    ///
    /// A stored value that does not fit `T` is a codec error, not a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(StoreError::Encode),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `key`.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(StoreError::Encode)?;
        (self.table.set)(&self.core, key, value)?;
        Ok(())
    }

    /// Value-level store: `None` is the unset sentinel and delegates to
    /// `remove` (including any plugin override of `remove`); `Some(v)`
    /// writes and hands back the stored value.
    pub fn set_value(
        &self,
        key: &str,
        value: Option<Value>,
    ) -> Result<Option<Value>, StoreError> {
        match value {
            None => {
                (self.table.remove)(&self.core, key)?;
                Ok(None)
            }
            Some(value) => (self.table.set)(&self.core, key, value).map(Some),
        }
    }

    /// Remove the entry under `key`.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        (self.table.remove)(&self.core, key)
    }

    /// Visit every entry in this store's namespace as
    /// `(unprefixed key, decoded value)`.
    ///
    /// Entries belonging to other namespaces on the same backend are
    /// silently skipped; isolation is enforced at read time, not just at
    /// write time. The root store has no prefix, so it sees everything,
    /// foreign namespaces' prefixed keys included.
    pub fn each(&self, mut visit: impl FnMut(&str, Value)) -> Result<(), StoreError> {
        (self.table.each)(&self.core, &mut visit)
    }

    /// Clear the ENTIRE physical backend, not just this namespace.
    ///
    /// This is deliberately namespace-unaware: it mirrors the base design,
    /// where `clear_all` reaches every namespace sharing the backend. It
    /// is inconsistent with the isolation that `get`/`set`/`each` enforce;
    /// callers who only want their own keys gone must remove them via
    /// `each` + `remove`.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        (self.table.clear_all)(&self.core)
    }

    /// Invoke a plugin-contributed named operation.
    pub fn call(&self, op: &str, args: &[Value]) -> Result<Value, StoreError> {
        match self.table.ops.get(op) {
            Some(f) => f(&self.core, args),
            None => Err(StoreError::UnknownOperation(op.to_string())),
        }
    }

    /// Derive a store on the same already-live backend with a fresh
    /// namespace. The backend is known-live, so no re-probing happens;
    /// the plugin list is re-applied to the new facade.
    pub fn namespace(&self, name: &str) -> Result<Store, StoreError> {
        let namespace = Namespace::new(name)?;
        debug!(namespace = namespace.name(), "derived namespaced store");
        let core = Arc::new(StoreCore {
            backend: self.core.backend.clone(),
            namespace,
        });
        let table = apply_plugins(base_table(), &self.plugins);
        Ok(Store {
            core,
            table: Arc::new(table),
            plugins: Arc::clone(&self.plugins),
        })
    }

    /// Detached function values, each capturing a clone of this store.
    ///
    /// Safe to hand to unrelated code: the closures keep working however
    /// far they travel from the originating binding.
    pub fn raw(&self) -> RawStore {
        let get = {
            let store = self.clone();
            Arc::new(move |key: &str| store.get(key))
                as Arc<dyn Fn(&str) -> Result<Option<Value>, StoreError> + Send + Sync>
        };
        let set = {
            let store = self.clone();
            Arc::new(move |key: &str, value: Option<Value>| store.set_value(key, value))
                as Arc<
                    dyn Fn(&str, Option<Value>) -> Result<Option<Value>, StoreError>
                        + Send
                        + Sync,
                >
        };
        let remove = {
            let store = self.clone();
            Arc::new(move |key: &str| store.remove(key))
                as Arc<dyn Fn(&str) -> Result<(), StoreError> + Send + Sync>
        };
        let each = {
            let store = self.clone();
            Arc::new(move |visit: &mut dyn FnMut(&str, Value)| {
                (store.table.each)(&store.core, visit)
            })
                as Arc<
                    dyn Fn(&mut dyn FnMut(&str, Value)) -> Result<(), StoreError> + Send + Sync,
                >
        };
        let clear_all = {
            let store = self.clone();
            Arc::new(move || store.clear_all())
                as Arc<dyn Fn() -> Result<(), StoreError> + Send + Sync>
        };
        RawStore {
            get,
            set,
            remove,
            each,
            clear_all,
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("namespace", &self.core.namespace.name())
            .field("backend", &self.backend_name())
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

/// Pre-bound function values mirroring the facade's data operations.
pub struct RawStore {
    /// Detached `get`.
    pub get: Arc<dyn Fn(&str) -> Result<Option<Value>, StoreError> + Send + Sync>,
    /// Detached `set_value` (with the `None`-removes sentinel).
    pub set:
        Arc<dyn Fn(&str, Option<Value>) -> Result<Option<Value>, StoreError> + Send + Sync>,
    /// Detached `remove`.
    pub remove: Arc<dyn Fn(&str) -> Result<(), StoreError> + Send + Sync>,
    /// Detached `each`.
    pub each: Arc<dyn Fn(&mut dyn FnMut(&str, Value)) -> Result<(), StoreError> + Send + Sync>,
    /// Detached `clear_all`.
    pub clear_all: Arc<dyn Fn() -> Result<(), StoreError> + Send + Sync>,
}

/// The base method table: prefix the key, run the codec, delegate to the
/// bound backend. Every closure starts by demanding a live backend, so a
/// disabled store fails uniformly with `NotReady`.
fn base_table() -> MethodTable {
    MethodTable {
        get: Arc::new(|core, key| {
            let raw = core.backend()?.read(&core.namespace().apply(key))?;
            Ok(codec::deserialize(raw.as_deref()))
        }),
        set: Arc::new(|core, key, value| {
            let backend = core.backend()?;
            let raw = codec::serialize(&value)?;
            let physical = core.namespace().apply(key);
            backend.write(&[(physical.as_str(), raw.as_str())])?;
            Ok(value)
        }),
        remove: Arc::new(|core, key| {
            core.backend()?
                .remove(&core.namespace().apply(key))
                .map_err(Into::into)
        }),
        each: Arc::new(|core, visit| {
            let backend = core.backend()?;
            let namespace = core.namespace();
            backend
                .each(&mut |physical, raw| {
                    if let Some(key) = namespace.strip(physical) {
                        // An empty raw value still visits, as null.
                        let value = codec::deserialize(Some(raw)).unwrap_or(Value::Null);
                        visit(key, value);
                    }
                })
                .map_err(Into::into)
        }),
        clear_all: Arc::new(|core| core.backend()?.clear_all().map_err(Into::into)),
        ops: HashMap::new(),
    }
}
