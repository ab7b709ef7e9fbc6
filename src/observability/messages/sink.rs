// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for result storage.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A binary image result was uploaded to blob storage.
///
/// # Log Level
/// `debug!`
pub struct BlobUploaded<'a> {
    pub subject_id: &'a str,
    pub metric_id: &'a str,
    pub reference: &'a str,
    pub size_bytes: usize,
}

impl Display for BlobUploaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Uploaded {} bytes for metric '{}' of subject '{}' to {}",
            self.size_bytes, self.metric_id, self.subject_id, self.reference
        )
    }
}

impl StructuredLog for BlobUploaded<'_> {
    fn log(&self) {
        tracing::debug!(
            subject_id = self.subject_id,
            metric_id = self.metric_id,
            reference = self.reference,
            size_bytes = self.size_bytes,
            "{}", self
        );
    }
}

/// A metric outcome was durably recorded.
///
/// # Log Level
/// `debug!`
pub struct ResultPersisted<'a> {
    pub subject_id: &'a str,
    pub metric_id: &'a str,
    pub value_count: usize,
    pub diagnostic: bool,
}

impl Display for ResultPersisted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.diagnostic {
            write!(
                f,
                "Persisted failure diagnostic for metric '{}' of subject '{}'",
                self.metric_id, self.subject_id
            )
        } else {
            write!(
                f,
                "Persisted {} values for metric '{}' of subject '{}'",
                self.value_count, self.metric_id, self.subject_id
            )
        }
    }
}

impl StructuredLog for ResultPersisted<'_> {
    fn log(&self) {
        tracing::debug!(
            subject_id = self.subject_id,
            metric_id = self.metric_id,
            value_count = self.value_count,
            diagnostic = self.diagnostic,
            "{}", self
        );
    }
}

/// Storing a metric outcome failed. The outcome itself is unaffected.
///
/// # Log Level
/// `error!`
pub struct StoreFailed<'a> {
    pub subject_id: &'a str,
    pub metric_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for StoreFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to store result of metric '{}' for subject '{}': {}",
            self.metric_id, self.subject_id, self.error
        )
    }
}

impl StructuredLog for StoreFailed<'_> {
    fn log(&self) {
        tracing::error!(
            subject_id = self.subject_id,
            metric_id = self.metric_id,
            error = %self.error,
            "{}", self
        );
    }
}
