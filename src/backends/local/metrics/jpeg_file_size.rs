// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::MetricError;
use crate::traits::{MetricContext, MetricPlugin, MetricValue};

/// JPEG file size in bytes and the PNG-to-JPEG compression ratio.
pub struct JpegFileSizeMetric {
    id: String,
}

impl JpegFileSizeMetric {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl MetricPlugin for JpegFileSizeMetric {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "jpeg_file_size"
    }

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        let png = ctx
            .lossless_bytes()
            .ok_or(MetricError::MissingInput("lossless encoding"))?;
        let jpeg = ctx
            .lossy_bytes()
            .ok_or(MetricError::MissingInput("lossy encoding"))?;

        if jpeg.is_empty() {
            return Err(MetricError::failed("lossy encoding is empty"));
        }

        let jpeg_size = jpeg.len() as f64;
        Ok(vec![
            MetricValue::Scalar(jpeg_size),
            MetricValue::Scalar(png.len() as f64 / jpeg_size),
        ])
    }
}
