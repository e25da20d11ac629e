// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Namespace resolution: one physical backend, many isolated logical stores.
//
// A namespace partitions a backend's keyspace by prefixing every key with
// `__store__/<name>/`. The root namespace is the empty string and applies
// no prefix at all, so a root store sees the whole keyspace, including
// other namespaces' prefixed entries.

use crate::error::StoreError;

/// Prefix token shared by every non-root namespace.
const PREFIX_TOKEN: &str = "__store__/";

/// A resolved namespace: validated name plus the compiled key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    name: String,
    prefix: String,
}

impl Namespace {
    /// The root namespace: no name, no prefix, no stripping.
    pub fn root() -> Self {
        Self {
            name: String::new(),
            prefix: String::new(),
        }
    }

    /// Resolve and validate a namespace name.
    ///
    /// The empty name resolves to the root namespace. Anything else must
    /// match `[a-zA-Z0-9_-]*`; an illegal name fails with
    /// [`StoreError::IllegalNamespace`].
    pub fn new(name: &str) -> Result<Self, StoreError> {
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StoreError::IllegalNamespace(name.to_string()));
        }
        let prefix = if name.is_empty() {
            String::new()
        } else {
            format!("{PREFIX_TOKEN}{name}/")
        };
        Ok(Self {
            name: name.to_string(),
            prefix,
        })
    }

    /// The namespace name (`""` for root).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key prefix (`""` for root).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether this is the root namespace.
    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    /// Prefix a logical key into the physical key stored in the backend.
    pub fn apply(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Strip the prefix back off a physical key.
    ///
    /// Returns `None` for keys outside this namespace; for the root
    /// namespace every key matches and nothing is stripped.
    ///
    /// `strip(apply(key))` recovers `key` for every key. The separator is
    /// not collision-proof: a logical key that itself embeds the
    /// `__store__/` token can be mistaken for another namespace's entry by
    /// a root-store iteration. Known limitation.
    pub fn strip<'a>(&self, physical: &'a str) -> Option<&'a str> {
        physical.strip_prefix(self.prefix.as_str())
    }
}
