// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::backends::local::metrics::colorfulness::mean_std;
use crate::errors::MetricError;
use crate::traits::{MetricContext, MetricPlugin, MetricValue};

/// Mean and standard deviation of the CIELAB L, a and b channels, emitted
/// as `[L_mean, L_std, a_mean, a_std, b_mean, b_std]`.
pub struct LabStatisticsMetric {
    id: String,
}

impl LabStatisticsMetric {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl MetricPlugin for LabStatisticsMetric {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "lab_average_std"
    }

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        let lab = ctx
            .color_space()
            .ok_or(MetricError::MissingInput("color space conversion"))?;
        if lab.pixels.is_empty() {
            return Err(MetricError::failed("image has no pixels"));
        }

        let mut values = Vec::with_capacity(6);
        for channel in 0..3 {
            let samples: Vec<f64> = lab.channel(channel).map(f64::from).collect();
            let (mean, std) = mean_std(&samples);
            values.push(MetricValue::Scalar(mean));
            values.push(MetricValue::Scalar(std));
        }
        Ok(values)
    }
}
