// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types follow a struct-based pattern: each event is a small struct
//! implementing `Display` and `StructuredLog`, so log lines carry no magic
//! strings at the call site and every event ships typed fields to `tracing`.
//!
//! # Usage
//!
//! ```rust
//! use wui_evaluator::observability::messages::engine::MetricFailed;
//! use wui_evaluator::observability::messages::StructuredLog;
//!
//! let msg = MetricFailed {
//!     subject_id: "subject-1",
//!     metric_id: "m3",
//!     kind: "metric_fault",
//!     message: "division by zero",
//! };
//!
//! msg.log();
//! ```
//!
//! Output format and filtering are decided by the host; the `wui-evaluator`
//! binary installs a `tracing-subscriber` formatter driven by `RUST_LOG`.

pub mod messages;

/// Install the default subscriber: compact formatting filtered by `RUST_LOG`,
/// falling back to `info`.
///
/// Returns quietly if a global subscriber is already set.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
