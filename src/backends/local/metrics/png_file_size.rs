// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::MetricError;
use crate::traits::{MetricContext, MetricPlugin, MetricValue};

/// Size in bytes of the subject encoded as 24-bit RGB PNG.
pub struct PngFileSizeMetric {
    id: String,
}

impl PngFileSizeMetric {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl MetricPlugin for PngFileSizeMetric {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "png_file_size"
    }

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        let png = ctx
            .lossless_bytes()
            .ok_or(MetricError::MissingInput("lossless encoding"))?;
        Ok(vec![MetricValue::Scalar(png.len() as f64)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::context_for;
    use crate::engine::PreprocessingBundle;
    use image::RgbImage;

    #[tokio::test]
    async fn test_reports_lossless_size() {
        let bundle = PreprocessingBundle::new(RgbImage::new(2, 2)).with_lossless(vec![0; 1234]);
        let values = PngFileSizeMetric::new("m1").execute(&context_for(bundle)).await.unwrap();
        assert_eq!(values, vec![MetricValue::Scalar(1234.0)]);
    }

    #[tokio::test]
    async fn test_missing_lossless_encoding() {
        let bundle = PreprocessingBundle::new(RgbImage::new(2, 2));
        let result = PngFileSizeMetric::new("m1").execute(&context_for(bundle)).await;
        assert!(matches!(result, Err(MetricError::MissingInput(_))));
    }
}
