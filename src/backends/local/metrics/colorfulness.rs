// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use image::RgbImage;

use crate::errors::MetricError;
use crate::traits::{MetricContext, MetricPlugin, MetricValue};

const COLORFULNESS_COEFFICIENT: f64 = 0.3;

/// Hasler and Süsstrunk colorfulness over the opponent channels
/// `rg = R - G` and `yb = (R + G) / 2 - B`.
pub struct ColorfulnessMetric {
    id: String,
}

impl ColorfulnessMetric {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl MetricPlugin for ColorfulnessMetric {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "colorfulness"
    }

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        if ctx.raster().is_empty() {
            return Err(MetricError::failed("image has no pixels"));
        }
        Ok(vec![MetricValue::Scalar(colorfulness(ctx.raster()))])
    }
}

pub fn colorfulness(raster: &RgbImage) -> f64 {
    let (rg, yb): (Vec<f64>, Vec<f64>) = raster
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0.map(f64::from);
            (r - g, 0.5 * (r + g) - b)
        })
        .unzip();

    let (rg_mean, rg_std) = mean_std(&rg);
    let (yb_mean, yb_std) = mean_std(&yb);

    let average = (rg_mean.powi(2) + yb_mean.powi(2)).sqrt();
    let deviation = (rg_std.powi(2) + yb_std.powi(2)).sqrt();
    deviation + COLORFULNESS_COEFFICIENT * average
}

/// Population mean and standard deviation.
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
