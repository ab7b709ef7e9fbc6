// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use image::GrayImage;

use crate::errors::MetricError;
use crate::traits::{MetricContext, MetricPlugin, MetricValue};

/// Shannon entropy, in bits, of the grayscale intensity histogram.
pub struct ShannonEntropyMetric {
    id: String,
}

impl ShannonEntropyMetric {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl MetricPlugin for ShannonEntropyMetric {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "shannon_entropy"
    }

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        let grayscale = ctx
            .grayscale()
            .ok_or(MetricError::MissingInput("grayscale"))?;
        Ok(vec![MetricValue::Scalar(shannon_entropy(grayscale))])
    }
}

pub fn shannon_entropy(image: &GrayImage) -> f64 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total = image.pixels().len() as f64;
    if total == 0.0 {
        return 0.0;
    }

    histogram
        .iter()
        .filter(|count| **count > 0)
        .map(|count| {
            let p = *count as f64 / total;
            -p * p.log2()
        })
        .sum()
}
