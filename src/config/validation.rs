//! Validation of the metric manifest.
//!
//! Every manifest entry becomes a catalogue artifact named `<id>_<name>`, and
//! the registry resolves metric IDs by matching `<id>_` against those names.
//! The checks here guarantee that matching is unambiguous for every declared
//! metric:
//!
//! 1. **Identifier shape**: IDs are non-empty and contain no `_`, otherwise one
//!    ID could be a prefix-with-separator of another artifact
//! 2. **Uniqueness**: no two entries share an ID
//! 3. **Names**: every entry has a non-empty name
//! 4. **Gating flags**: an entry requiring both structural analysis and
//!    segmentation is reported as a warning, since only the segmentation
//!    group will run it
//!
//! # Example
//! ```rust
//! use wui_evaluator::config::{parse_config, validate_catalogue};
//!
//! let config = parse_config(r#"
//! metrics:
//!   - id: m1
//!     name: png_file_size
//!   - id: m1
//!     name: png_size
//! "#).unwrap();
//!
//! let findings = validate_catalogue(&config.metrics);
//! assert_eq!(findings.len(), 1);
//! assert!(!findings[0].is_warning());
//! ```

use std::collections::HashSet;

use crate::config::catalogue::MetricManifestEntry;
use crate::config::consts::ARTIFACT_SEPARATOR;
use crate::errors::ValidationError;

/// Validate a metric manifest, returning every finding in manifest order.
///
/// Findings for which [`ValidationError::is_warning`] is true do not make the
/// manifest unusable.
pub fn validate_catalogue(manifest: &[MetricManifestEntry]) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for entry in manifest {
        let descriptor = &entry.descriptor;
        let id = descriptor.id.as_str();

        if let Some(reason) = invalid_id_reason(id) {
            findings.push(ValidationError::InvalidMetricId {
                metric_id: id.to_string(),
                reason,
            });
        }

        if !seen.insert(id) {
            findings.push(ValidationError::DuplicateMetricId {
                metric_id: id.to_string(),
            });
        }

        if descriptor.name.trim().is_empty() {
            findings.push(ValidationError::EmptyName {
                metric_id: id.to_string(),
            });
        }

        let preprocessing = &descriptor.preprocessing;
        if preprocessing.requires_structural_analysis && preprocessing.requires_segmentation {
            findings.push(ValidationError::ConflictingGatingFlags {
                metric_id: id.to_string(),
            });
        }
    }

    findings
}

fn invalid_id_reason(id: &str) -> Option<String> {
    if id.is_empty() {
        return Some("metric ID is empty".to_string());
    }
    if id.contains(ARTIFACT_SEPARATOR) {
        return Some(format!("metric ID must not contain '{}'", ARTIFACT_SEPARATOR));
    }
    if id.chars().any(char::is_whitespace) {
        return Some("metric ID must not contain whitespace".to_string());
    }
    None
}
