// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Problems found while validating the metric catalogue manifest
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two manifest entries share the same metric ID
    DuplicateMetricId {
        /// The duplicate metric ID
        metric_id: String,
    },
    /// A metric ID cannot be used for prefix matching against artifact names
    InvalidMetricId {
        /// The offending metric ID
        metric_id: String,
        /// Why the ID was rejected
        reason: String,
    },
    /// A metric has no human-readable name, so no artifact name can be formed
    EmptyName {
        /// The metric missing its name
        metric_id: String,
    },
    /// A metric sets both gating flags; segmentation will take priority
    ConflictingGatingFlags {
        /// The metric with both flags set
        metric_id: String,
    },
}

impl ValidationError {
    /// Warnings are logged but never reject a configuration
    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationError::ConflictingGatingFlags { .. })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateMetricId { metric_id } => {
                write!(f, "Duplicate metric ID: '{}'", metric_id)
            }
            ValidationError::InvalidMetricId { metric_id, reason } => {
                write!(f, "Invalid metric ID '{}': {}", metric_id, reason)
            }
            ValidationError::EmptyName { metric_id } => {
                write!(f, "Metric '{}' has an empty name", metric_id)
            }
            ValidationError::ConflictingGatingFlags { metric_id } => {
                write!(
                    f,
                    "Metric '{}' requires both structural analysis and segmentation. \
                     It will be evaluated in the segmentation group only.",
                    metric_id
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading configuration from disk
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("configuration validation failed:\n{}", format_validation_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("failed to build runtime: {0}")]
    Runtime(String),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
