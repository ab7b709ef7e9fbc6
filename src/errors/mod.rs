// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod metric;
mod preprocessing;
mod registry;
mod sink;
mod submit;

pub use config::{ConfigError, ValidationError};
pub use metric::{InferenceError, MetricError};
pub use preprocessing::{LoadError, PreprocessingError, SegmentationError};
pub use registry::RegistryError;
pub use sink::SinkError;
pub use submit::SubmitError;
