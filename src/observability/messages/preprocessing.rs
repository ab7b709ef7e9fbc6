// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for preprocessing stages.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// A stage populated its bundle field.
///
/// # Log Level
/// `debug!`
pub struct StageCompleted<'a> {
    pub subject_id: &'a str,
    pub stage: &'a str,
    pub duration: Duration,
}

impl Display for StageCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Preprocessing stage '{}' completed for subject '{}' in {:?}",
            self.stage, self.subject_id, self.duration
        )
    }
}

impl StructuredLog for StageCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            subject_id = self.subject_id,
            stage = self.stage,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A stage could not populate its bundle field; dependent metrics will fail.
///
/// # Log Level
/// `warn!`
pub struct StageFailed<'a> {
    pub subject_id: &'a str,
    pub stage: &'a str,
    pub dependent_metrics: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Preprocessing stage '{}' failed for subject '{}', {} metrics affected: {}",
            self.stage, self.subject_id, self.dependent_metrics, self.error
        )
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            subject_id = self.subject_id,
            stage = self.stage,
            dependent_metrics = self.dependent_metrics,
            error = %self.error,
            "{}", self
        );
    }
}
