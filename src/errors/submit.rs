// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitError {
    /// The submitter was shut down and takes no further work.
    #[error("submitter is shut down; evaluation of subject '{subject_id}' was not started")]
    Closed { subject_id: String },
}
