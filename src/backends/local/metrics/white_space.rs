// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::MetricError;
use crate::traits::{MetricContext, MetricPlugin, MetricValue, SegmentationResult};

/// Proportion of the image not covered by any segmented element.
pub struct WhiteSpaceMetric {
    id: String,
}

impl WhiteSpaceMetric {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl MetricPlugin for WhiteSpaceMetric {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "white_space"
    }

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        let segmentation = ctx
            .segmentation()
            .ok_or(MetricError::MissingInput("segmentation"))?;
        let ratio = white_space(segmentation)
            .ok_or_else(|| MetricError::failed("segmented image has no pixels"))?;
        Ok(vec![MetricValue::Scalar(ratio)])
    }
}

/// Overlapping elements count once; bounds outside the image are clipped and
/// inverted bounds cover nothing.
pub fn white_space(segmentation: &SegmentationResult) -> Option<f64> {
    let height = segmentation.image_shape.height as usize;
    let width = segmentation.image_shape.width as usize;
    if height == 0 || width == 0 {
        return None;
    }

    let mut covered = vec![false; height * width];
    for element in &segmentation.elements {
        let bounds = element.position;
        let rows = (bounds.row_min as usize).min(height)..(bounds.row_max as usize).min(height);
        let column_end = (bounds.column_max as usize).min(width);
        let column_start = (bounds.column_min as usize).min(column_end);
        for row in rows {
            covered[row * width + column_start..row * width + column_end]
                .iter_mut()
                .for_each(|c| *c = true);
        }
    }

    let free = covered.iter().filter(|c| !**c).count();
    Some(free as f64 / covered.len() as f64)
}
