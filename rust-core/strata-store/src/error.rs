// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error types for the Strata store facade.
//
// Two layers: `BackendError` is what a storage backend raises from its own
// operations, `StoreError` is what the facade surfaces to callers. Backend
// failures after selection are wrapped transparently: the facade cannot
// know whether e.g. a quota error is recoverable, so it never rewrites them.
// Probe-time failures never reach either type: during backend selection an
// error is only evidence of unavailability.

use thiserror::Error;

/// Errors raised by a storage backend during data operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// An I/O error occurred in the underlying storage layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend rejected a write because a size or quota limit was hit.
    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The backend is not reachable or refused the operation outright.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Any other backend-specific failure.
    #[error("backend error: {0}")]
    Other(String),
}

/// Errors surfaced by the store facade.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The namespace string contains characters outside `[a-zA-Z0-9_-]`.
    /// Raised synchronously at construction and never recovered internally.
    #[error("illegal namespace {0:?}: only alphanumerics, underscores and dashes are allowed")]
    IllegalNamespace(String),

    /// A data operation was attempted while no live backend is bound.
    /// The store never re-probes on its own; the caller decides what to do.
    #[error("no backend available: every candidate failed the liveness probe")]
    NotReady,

    /// A value could not be encoded into the backend's string storage
    /// model, or a stored value could not be decoded into the requested
    /// type.
    #[error("codec error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The bound backend failed during a post-selection data operation.
    /// Propagated unmodified.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A named operation was invoked that no plugin provides.
    #[error("unknown store operation: {0}")]
    UnknownOperation(String),
}
