// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for metric resolution and plugin loading.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A metric plugin was instantiated from its catalogue artifact.
///
/// # Log Level
/// `info!` - Happens at most once per metric ID until reloaded
pub struct PluginLoaded<'a> {
    pub metric_id: &'a str,
    pub artifact: &'a str,
    pub implementation: &'a str,
}

impl Display for PluginLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded metric '{}' from artifact '{}' ({})",
            self.metric_id, self.artifact, self.implementation
        )
    }
}

impl StructuredLog for PluginLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            metric_id = self.metric_id,
            artifact = self.artifact,
            implementation = self.implementation,
            "{}", self
        );
    }
}

/// A cached plugin was replaced by a freshly loaded one.
///
/// # Log Level
/// `info!` - Operator-initiated
pub struct PluginReloaded<'a> {
    pub metric_id: &'a str,
    pub artifact: &'a str,
}

impl Display for PluginReloaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reloaded metric '{}' from artifact '{}'", self.metric_id, self.artifact)
    }
}

impl StructuredLog for PluginReloaded<'_> {
    fn log(&self) {
        tracing::info!(metric_id = self.metric_id, artifact = self.artifact, "{}", self);
    }
}

/// A catalogue entry was added or replaced at runtime.
///
/// # Log Level
/// `info!` - Operator-initiated
pub struct EntryRegistered<'a> {
    pub metric_id: &'a str,
    pub artifact: &'a str,
    pub replaced: bool,
}

impl Display for EntryRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let verb = if self.replaced { "Replaced" } else { "Registered" };
        write!(f, "{} catalogue entry '{}' for metric '{}'", verb, self.artifact, self.metric_id)
    }
}

impl StructuredLog for EntryRegistered<'_> {
    fn log(&self) {
        tracing::info!(
            metric_id = self.metric_id,
            artifact = self.artifact,
            replaced = self.replaced,
            "{}", self
        );
    }
}

/// A requested metric ID could not be resolved to a plugin.
///
/// # Log Level
/// `warn!` - The metric gets a NotFound outcome; the run continues
pub struct ResolutionFailed<'a> {
    pub metric_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ResolutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not resolve metric '{}': {}", self.metric_id, self.error)
    }
}

impl StructuredLog for ResolutionFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            metric_id = self.metric_id,
            error = %self.error,
            "{}", self
        );
    }
}

/// A manifest entry names an implementation the loader does not provide.
/// Resolution of the metric will fail until the entry is replaced.
///
/// # Log Level
/// `warn!` - Configuration problem, not fatal at startup
pub struct UnknownImplementation<'a> {
    pub metric_id: &'a str,
    pub implementation: &'a str,
}

impl Display for UnknownImplementation<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Metric '{}' names unknown implementation '{}'",
            self.metric_id, self.implementation
        )
    }
}

impl StructuredLog for UnknownImplementation<'_> {
    fn log(&self) {
        tracing::warn!(
            metric_id = self.metric_id,
            implementation = self.implementation,
            "{}", self
        );
    }
}
