// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! `StructuredLog` to emit the same event with typed tracing fields.
//!
//! # Organization
//!
//! * `engine` - Evaluation runs, execution groups and metric outcomes
//! * `preprocessing` - Preprocessing stage completion and failure
//! * `registry` - Metric resolution and plugin loading
//! * `sink` - Blob uploads and result persistence
//! * `validation` - Configuration validation warnings
//!
//! # Usage Pattern
//!
//! ```rust
//! use wui_evaluator::observability::messages::engine::RunStarted;
//! use wui_evaluator::observability::messages::StructuredLog;
//!
//! let msg = RunStarted {
//!     subject_id: "subject-1",
//!     requested_metrics: 3,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod engine;
pub mod preprocessing;
pub mod registry;
pub mod sink;
pub mod validation;

/// A message that knows how to log itself with structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message at its natural level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span {
        tracing::info_span!("event", span_name = name, message = %self)
    }
}
