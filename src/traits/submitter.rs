// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::SystemTime;

use crate::engine::EvaluationRequest;
use crate::errors::SubmitError;

/// Receipt for a submitted evaluation. Completion is observed through the
/// result sink's persistence side effects, not through the ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionTicket {
    pub subject_id: String,
    pub metric_count: usize,
    pub submitted_at: SystemTime,
}

/// Accepts evaluation requests for background execution.
pub trait TaskSubmitter: Send + Sync {
    /// Returns immediately; the evaluation runs detached from the caller.
    /// Fails with `SubmitError::Closed` once the submitter has shut down.
    fn submit(&self, request: EvaluationRequest) -> Result<SubmissionTicket, SubmitError>;
}
