// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;

use super::metrics::*;
use crate::config::CatalogueEntry;
use crate::errors::RegistryError;
use crate::traits::{MetricPlugin, PluginLoader};

/// Loader for the built-in (in-process) metric plugins.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMetricFactory;

impl LocalMetricFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create a plugin instance for a catalogue entry
    ///
    /// The entry's `implementation` determines which metric to create:
    /// - "png_file_size" -> PngFileSizeMetric
    /// - "jpeg_file_size" -> JpegFileSizeMetric
    /// - "colorfulness" -> ColorfulnessMetric
    /// - "lab_average_std" -> LabStatisticsMetric
    /// - "white_space" -> WhiteSpaceMetric
    /// - "segmentation" -> SegmentationOverlayMetric
    /// - "word_count" -> WordCountMetric
    /// - "shannon_entropy" -> ShannonEntropyMetric
    pub fn create_metric(entry: &CatalogueEntry) -> Result<Arc<dyn MetricPlugin>, RegistryError> {
        let id = entry.descriptor.id.clone();

        match entry.implementation.as_str() {
            // Encoding metrics
            "png_file_size" => Ok(Arc::new(PngFileSizeMetric::new(id))),
            "jpeg_file_size" => Ok(Arc::new(JpegFileSizeMetric::new(id))),

            // Color metrics
            "colorfulness" => Ok(Arc::new(ColorfulnessMetric::new(id))),
            "lab_average_std" => Ok(Arc::new(LabStatisticsMetric::new(id))),
            "shannon_entropy" => Ok(Arc::new(ShannonEntropyMetric::new(id))),

            // Segmentation metrics
            "white_space" => Ok(Arc::new(WhiteSpaceMetric::new(id))),
            "segmentation" => Ok(Arc::new(SegmentationOverlayMetric::new(id))),

            // Structural metrics
            "word_count" => Ok(Arc::new(WordCountMetric::new(id))),

            other => Err(RegistryError::LoadFailed {
                artifact: entry.artifact.clone(),
                reason: format!("unknown local metric implementation: '{}'", other),
            }),
        }
    }

    /// List all available local metric implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        vec![
            "png_file_size",
            "jpeg_file_size",
            "colorfulness",
            "lab_average_std",
            "shannon_entropy",
            "white_space",
            "segmentation",
            "word_count",
        ]
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(implementation: &str) -> bool {
        Self::list_available_implementations().contains(&implementation)
    }
}

#[async_trait]
impl PluginLoader for LocalMetricFactory {
    async fn load(&self, entry: &CatalogueEntry) -> Result<Arc<dyn MetricPlugin>, RegistryError> {
        Self::create_metric(entry)
    }
}
