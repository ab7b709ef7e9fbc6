// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for preprocessing stages and the collaborators behind them.

use thiserror::Error;

use crate::engine::Stage;

/// Structural analysis could not obtain usable markup.
#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    #[error("markup could not be analyzed: {0}")]
    Markup(String),
}

/// The segmentation collaborator failed.
#[derive(Debug, Clone, Error)]
#[error("segmentation failed: {0}")]
pub struct SegmentationError(pub String);

/// A preprocessing stage could not populate its bundle field.
#[derive(Debug, Clone, Error)]
pub enum PreprocessingError {
    /// The stage needs an input the request did not carry.
    #[error("{stage} requires {needed}, but none was supplied")]
    MissingInput { stage: Stage, needed: &'static str },

    /// The stage itself raised a fault.
    #[error("{stage} failed: {reason}")]
    StageFailed { stage: Stage, reason: String },
}

impl PreprocessingError {
    pub fn stage(&self) -> Stage {
        match self {
            PreprocessingError::MissingInput { stage, .. } => *stage,
            PreprocessingError::StageFailed { stage, .. } => *stage,
        }
    }

    pub(crate) fn failed(stage: Stage, reason: impl ToString) -> Self {
        PreprocessingError::StageFailed {
            stage,
            reason: reason.to_string(),
        }
    }
}
