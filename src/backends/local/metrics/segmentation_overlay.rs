// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::MetricError;
use crate::traits::{MetricContext, MetricPlugin, MetricValue};

/// Exposes the segmentation itself: the rendered overlay image followed by
/// the element list as JSON.
pub struct SegmentationOverlayMetric {
    id: String,
}

impl SegmentationOverlayMetric {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl MetricPlugin for SegmentationOverlayMetric {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "segmentation"
    }

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        let segmentation = ctx
            .segmentation()
            .ok_or(MetricError::MissingInput("segmentation"))?;
        let elements = serde_json::to_string(segmentation)
            .map_err(|e| MetricError::failed(format!("failed to serialize segments: {}", e)))?;

        Ok(vec![
            MetricValue::BinaryImage(segmentation.rendered_overlay.clone()),
            MetricValue::Text(elements),
        ])
    }
}
