// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin extension point: an explicit method table instead of runtime
// monkey-patching.
//
// The facade's overridable operations live in a `MethodTable`, a struct of
// shared closures. Plugins are applied in list order by folding the table
// through each plugin's `install`: every step receives the table
// accumulated so far, so a plugin wraps an operation by capturing the
// previous entry inside its replacement. Later plugins therefore wrap or
// override earlier ones, and the base implementations sit at the bottom of
// every chain.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::store::StoreCore;

/// Implementation of the `get` operation: logical key -> decoded value.
pub type GetFn =
    Arc<dyn Fn(&StoreCore, &str) -> Result<Option<Value>, StoreError> + Send + Sync>;

/// Implementation of the `set` operation. Returns the stored value.
pub type SetFn =
    Arc<dyn Fn(&StoreCore, &str, Value) -> Result<Value, StoreError> + Send + Sync>;

/// Implementation of the `remove` operation.
pub type RemoveFn = Arc<dyn Fn(&StoreCore, &str) -> Result<(), StoreError> + Send + Sync>;

/// Implementation of the `each` operation. The visitor receives
/// `(unprefixed key, decoded value)` for every entry in this store's
/// namespace.
pub type EachFn = Arc<
    dyn Fn(&StoreCore, &mut dyn FnMut(&str, Value)) -> Result<(), StoreError> + Send + Sync,
>;

/// Implementation of the `clear_all` operation.
pub type ClearAllFn = Arc<dyn Fn(&StoreCore) -> Result<(), StoreError> + Send + Sync>;

/// A plugin-contributed named operation, invoked via `Store::call`.
pub type OpFn =
    Arc<dyn Fn(&StoreCore, &[Value]) -> Result<Value, StoreError> + Send + Sync>;

/// The facade's dispatch table.
///
/// Cloning is cheap (every entry is an `Arc`), which is what makes the
/// wrap-the-previous-entry pattern work:
///
/// ```ignore
/// fn install(&self, prev: MethodTable) -> MethodTable {
///     let prev_get = prev.get.clone();
///     MethodTable {
///         get: Arc::new(move |core, key| {
///             // ... wrap prev_get(core, key) ...
///         }),
///         ..prev
///     }
/// }
/// ```
#[derive(Clone)]
pub struct MethodTable {
    /// `get` implementation.
    pub get: GetFn,
    /// `set` implementation.
    pub set: SetFn,
    /// `remove` implementation.
    pub remove: RemoveFn,
    /// `each` implementation.
    pub each: EachFn,
    /// `clear_all` implementation.
    pub clear_all: ClearAllFn,
    /// Named operations added by plugins; absent from the base facade.
    pub ops: HashMap<String, OpFn>,
}

/// An extension object applied to the facade at construction time.
///
/// Plugins may replace core operations or add named ones. `install`
/// receives the accumulated table (the base implementations plus every
/// previously applied plugin) as its "previous implementation", enabling
/// composition rather than destructive overwrite.
pub trait Plugin: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Produce the table that replaces `prev`.
    fn install(&self, prev: MethodTable) -> MethodTable;
}

/// Fold an ordered plugin list over the base table. Order is significant:
/// later plugins wrap earlier ones.
pub(crate) fn apply_plugins(base: MethodTable, plugins: &[Arc<dyn Plugin>]) -> MethodTable {
    plugins.iter().fold(base, |table, plugin| {
        debug!(plugin = plugin.name(), "applying store plugin");
        plugin.install(table)
    })
}
