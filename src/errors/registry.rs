// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for catalogue lookup and plugin loading.

use thiserror::Error;

/// Errors that can occur while resolving a metric ID to a plugin
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    /// No catalogue artifact starts with `<id>_`
    #[error("no metric plugin matches '{metric_id}'")]
    NotFound { metric_id: String },

    /// More than one catalogue artifact starts with `<id>_`
    #[error("metric ID '{metric_id}' is ambiguous, candidates: {}", .candidates.join(", "))]
    Ambiguous {
        metric_id: String,
        candidates: Vec<String>,
    },

    /// The artifact was found but the loader could not build a plugin from it
    #[error("failed to load plugin '{artifact}': {reason}")]
    LoadFailed { artifact: String, reason: String },
}
