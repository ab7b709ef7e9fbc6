// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{MetricError, PreprocessingError, RegistryError};
use crate::traits::MetricValue;

/// Why a metric produced no values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The metric ID could not be resolved to a plugin
    NotFound,
    /// An input the metric depends on was never supplied
    MissingInput,
    /// A preprocessing stage the metric depends on failed
    PreprocessingFailure,
    /// The metric returned an error or panicked
    MetricFault,
    /// The metric exceeded the configured time limit
    Timeout,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NotFound => "not_found",
            FailureKind::MissingInput => "missing_input",
            FailureKind::PreprocessingFailure => "preprocessing_failure",
            FailureKind::MetricFault => "metric_fault",
            FailureKind::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricFailure {
    pub metric_id: String,
    pub kind: FailureKind,
    pub message: String,
}

impl MetricFailure {
    pub fn new(metric_id: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            metric_id: metric_id.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn from_registry(metric_id: &str, error: &RegistryError) -> Self {
        Self::new(metric_id, FailureKind::NotFound, error.to_string())
    }

    pub fn from_preprocessing(metric_id: &str, error: &PreprocessingError) -> Self {
        let kind = match error {
            PreprocessingError::MissingInput { .. } => FailureKind::MissingInput,
            PreprocessingError::StageFailed { .. } => FailureKind::PreprocessingFailure,
        };
        Self::new(metric_id, kind, error.to_string())
    }

    pub fn from_metric(metric_id: &str, error: &MetricError) -> Self {
        let kind = match error {
            MetricError::MissingInput(_) => FailureKind::MissingInput,
            MetricError::Failed(_) => FailureKind::MetricFault,
        };
        Self::new(metric_id, kind, error.to_string())
    }
}

/// The result of one metric invocation within a run. Every requested metric
/// ID yields exactly one outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricOutcome {
    Success {
        metric_id: String,
        values: Vec<MetricValue>,
    },
    Failure(MetricFailure),
}

impl MetricOutcome {
    pub fn metric_id(&self) -> &str {
        match self {
            MetricOutcome::Success { metric_id, .. } => metric_id,
            MetricOutcome::Failure(failure) => &failure.metric_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MetricOutcome::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            MetricOutcome::Success { .. } => None,
            MetricOutcome::Failure(failure) => Some(failure.kind),
        }
    }

    pub fn values(&self) -> &[MetricValue] {
        match self {
            MetricOutcome::Success { values, .. } => values,
            MetricOutcome::Failure(_) => &[],
        }
    }
}

impl From<MetricFailure> for MetricOutcome {
    fn from(failure: MetricFailure) -> Self {
        MetricOutcome::Failure(failure)
    }
}
