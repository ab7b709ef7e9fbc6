// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised by the result sink and its storage collaborators.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SinkError {
    #[error("upload rejected: payload is empty")]
    EmptyPayload,

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("failed to persist result: {0}")]
    Persistence(String),

    #[error("storage task did not complete: {0}")]
    Interrupted(String),
}
