// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Error returned by a metric plugin's execution entry point.
#[derive(Debug, Error)]
pub enum MetricError {
    /// An input the metric depends on was not present in the bundle.
    #[error("required input '{0}' is not available")]
    MissingInput(&'static str),

    /// The metric's own computation failed.
    #[error("{0}")]
    Failed(String),
}

impl MetricError {
    pub fn failed(message: impl Into<String>) -> Self {
        MetricError::Failed(message.into())
    }
}

/// A model-inference session could not be obtained.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InferenceError {
    #[error("model '{0}' is not available")]
    ModelUnavailable(String),

    #[error("no inference capacity left for model '{0}'")]
    Exhausted(String),
}
