// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod factory;
pub mod metrics;

pub use factory::LocalMetricFactory;
pub use metrics::*;
