// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration validation.

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A validation finding that does not reject the configuration.
///
/// # Log Level
/// `warn!` - Potential issue, configuration still loads
///
/// # Example
/// ```
/// use wui_evaluator::errors::ValidationError;
/// use wui_evaluator::observability::messages::validation::ConfigurationWarning;
///
/// let warning = ValidationError::ConflictingGatingFlags {
///     metric_id: "m9".to_string(),
/// };
/// let msg = ConfigurationWarning { warning: &warning };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct ConfigurationWarning<'a> {
    pub warning: &'a ValidationError,
}

impl Display for ConfigurationWarning<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration warning: {}", self.warning)
    }
}

impl StructuredLog for ConfigurationWarning<'_> {
    fn log(&self) {
        tracing::warn!(warning = %self.warning, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::WARN,
            "configuration_warning",
            name = name,
            warning = %self.warning,
        )
    }
}

/// The metric manifest passed validation.
///
/// # Log Level
/// `info!`
pub struct CatalogueValidated {
    pub metric_count: usize,
    pub warning_count: usize,
}

impl Display for CatalogueValidated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Metric catalogue validated: {} metrics, {} warnings",
            self.metric_count, self.warning_count
        )
    }
}

impl StructuredLog for CatalogueValidated {
    fn log(&self) {
        tracing::info!(
            metric_count = self.metric_count,
            warning_count = self.warning_count,
            "{}", self
        );
    }
}
