// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for evaluation runs and metric execution.
//!
//! This module contains message types for logging events related to:
//! * Evaluation run lifecycle (submission, start, completion)
//! * Execution group scheduling
//! * Per-metric success and failure

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// An evaluation request was accepted for background execution.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SubmissionAccepted<'a> {
    pub subject_id: &'a str,
    pub metric_count: usize,
}

impl Display for SubmissionAccepted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Accepted evaluation of subject '{}' with {} metrics",
            self.subject_id, self.metric_count
        )
    }
}

impl StructuredLog for SubmissionAccepted<'_> {
    fn log(&self) {
        tracing::info!(
            subject_id = self.subject_id,
            metric_count = self.metric_count,
            "{}", self
        );
    }
}

/// Submission refused because the submitter has shut down.
///
/// # Log Level
/// `warn!` - The caller's evaluation will not run
pub struct SubmissionRejected<'a> {
    pub subject_id: &'a str,
}

impl Display for SubmissionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected evaluation of subject '{}': submitter is shut down",
            self.subject_id
        )
    }
}

impl StructuredLog for SubmissionRejected<'_> {
    fn log(&self) {
        tracing::warn!(subject_id = self.subject_id, "{}", self);
    }
}

/// Evaluation run started for one subject.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use wui_evaluator::observability::messages::engine::RunStarted;
///
/// let msg = RunStarted {
///     subject_id: "subject-1",
///     requested_metrics: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunStarted<'a> {
    pub subject_id: &'a str,
    pub requested_metrics: usize,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting evaluation of subject '{}': {} metrics requested",
            self.subject_id, self.requested_metrics
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            subject_id = self.subject_id,
            requested_metrics = self.requested_metrics,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluation",
            span_name = name,
            subject_id = self.subject_id,
            requested_metrics = self.requested_metrics,
        )
    }
}

/// Evaluation run finished. Storage may still be in flight.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunCompleted<'a> {
    pub subject_id: &'a str,
    pub succeeded: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluation of subject '{}' completed in {:?}: {} succeeded, {} failed",
            self.subject_id, self.duration, self.succeeded, self.failed
        )
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            subject_id = self.subject_id,
            succeeded = self.succeeded,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// An execution group is about to run its gating stage and metrics.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct GroupStarted<'a> {
    pub subject_id: &'a str,
    pub gating: &'a str,
    pub metric_count: usize,
}

impl Display for GroupStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running {} group for subject '{}' with {} metrics",
            self.gating, self.subject_id, self.metric_count
        )
    }
}

impl StructuredLog for GroupStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            subject_id = self.subject_id,
            gating = self.gating,
            metric_count = self.metric_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "execution_group",
            span_name = name,
            gating = self.gating,
            metric_count = self.metric_count,
        )
    }
}

/// Every metric in an execution group produced an outcome.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct GroupCompleted<'a> {
    pub subject_id: &'a str,
    pub gating: &'a str,
    pub metric_count: usize,
    pub duration: Duration,
}

impl Display for GroupCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Finished {} group for subject '{}': {} metrics in {:?}",
            self.gating, self.subject_id, self.metric_count, self.duration
        )
    }
}

impl StructuredLog for GroupCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            subject_id = self.subject_id,
            gating = self.gating,
            metric_count = self.metric_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A metric invocation returned values.
///
/// # Log Level
/// `debug!` - Per-metric detail
pub struct MetricSucceeded<'a> {
    pub subject_id: &'a str,
    pub metric_id: &'a str,
    pub value_count: usize,
    pub duration: Duration,
}

impl Display for MetricSucceeded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Metric '{}' produced {} values for subject '{}' in {:?}",
            self.metric_id, self.value_count, self.subject_id, self.duration
        )
    }
}

impl StructuredLog for MetricSucceeded<'_> {
    fn log(&self) {
        tracing::debug!(
            subject_id = self.subject_id,
            metric_id = self.metric_id,
            value_count = self.value_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A metric produced a failure outcome instead of values.
///
/// # Log Level
/// `warn!` - The run continues; the failure is persisted as a diagnostic
///
/// # Example
/// ```
/// use wui_evaluator::observability::messages::engine::MetricFailed;
///
/// let msg = MetricFailed {
///     subject_id: "subject-1",
///     metric_id: "m8",
///     kind: "missing_input",
///     message: "structural analysis requires a source URL or markup",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct MetricFailed<'a> {
    pub subject_id: &'a str,
    pub metric_id: &'a str,
    pub kind: &'a str,
    pub message: &'a str,
}

impl Display for MetricFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Metric '{}' failed for subject '{}' ({}): {}",
            self.metric_id, self.subject_id, self.kind, self.message
        )
    }
}

impl StructuredLog for MetricFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            subject_id = self.subject_id,
            metric_id = self.metric_id,
            kind = self.kind,
            failure = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "metric_failed",
            span_name = name,
            metric_id = self.metric_id,
            kind = self.kind,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        struct TestCase {
            name: &'static str,
            rendered: String,
            expected: &'static str,
        }

        let test_cases = vec![
            TestCase {
                name: "run started",
                rendered: RunStarted { subject_id: "s1", requested_metrics: 3 }.to_string(),
                expected: "Starting evaluation of subject 's1': 3 metrics requested",
            },
            TestCase {
                name: "metric failed",
                rendered: MetricFailed {
                    subject_id: "s1",
                    metric_id: "m3",
                    kind: "timeout",
                    message: "exceeded 1s",
                }
                .to_string(),
                expected: "Metric 'm3' failed for subject 's1' (timeout): exceeded 1s",
            },
            TestCase {
                name: "submission",
                rendered: SubmissionAccepted { subject_id: "s2", metric_count: 1 }.to_string(),
                expected: "Accepted evaluation of subject 's2' with 1 metrics",
            },
            TestCase {
                name: "submission rejected",
                rendered: SubmissionRejected { subject_id: "s3" }.to_string(),
                expected: "Rejected evaluation of subject 's3': submitter is shut down",
            },
        ];

        for test_case in test_cases {
            assert_eq!(test_case.rendered, test_case.expected, "Test case '{}'", test_case.name);
        }
    }
}
