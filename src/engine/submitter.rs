// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::SystemTime;
use tokio_util::task::TaskTracker;

use crate::engine::pipeline::{EvaluationPipeline, EvaluationRequest};
use crate::errors::SubmitError;
use crate::observability::messages::engine::{SubmissionAccepted, SubmissionRejected};
use crate::observability::messages::StructuredLog;
use crate::traits::{SubmissionTicket, TaskSubmitter};

/// Fire-and-forget submission onto the current tokio runtime.
///
/// Each submission runs the full pipeline, including storage, in a tracked
/// task. `shutdown` stops accepting work and waits for every tracked run;
/// later submissions are rejected.
pub struct BackgroundSubmitter {
    pipeline: Arc<EvaluationPipeline>,
    tracker: TaskTracker,
}

impl BackgroundSubmitter {
    pub fn new(pipeline: Arc<EvaluationPipeline>) -> Self {
        Self {
            pipeline,
            tracker: TaskTracker::new(),
        }
    }

    /// Number of runs still in flight.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    pub async fn shutdown(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl TaskSubmitter for BackgroundSubmitter {
    fn submit(&self, request: EvaluationRequest) -> Result<SubmissionTicket, SubmitError> {
        if self.tracker.is_closed() {
            SubmissionRejected {
                subject_id: &request.subject_id,
            }
            .log();
            return Err(SubmitError::Closed {
                subject_id: request.subject_id,
            });
        }

        let ticket = SubmissionTicket {
            subject_id: request.subject_id.clone(),
            metric_count: request.metric_ids.len(),
            submitted_at: SystemTime::now(),
        };

        SubmissionAccepted {
            subject_id: &ticket.subject_id,
            metric_count: ticket.metric_count,
        }
        .log();

        let pipeline = self.pipeline.clone();
        self.tracker.spawn(async move {
            let report = pipeline.run(request).await;
            report.storage.wait().await;
        });

        Ok(ticket)
    }
}
