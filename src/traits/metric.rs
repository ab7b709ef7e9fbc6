// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::CatalogueEntry;
use crate::engine::inference::{InferenceLease, InferenceProvider};
use crate::engine::{LabImage, PreprocessingBundle};
use crate::errors::{MetricError, RegistryError};
use crate::traits::collaborators::{SegmentationResult, StructuralAnalysis};

/// The kind of a single metric output value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Scalar,
    Text,
    BinaryImage,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Scalar => "scalar",
            ValueKind::Text => "text",
            ValueKind::BinaryImage => "binary_image",
        };
        f.write_str(name)
    }
}

/// One typed value produced by a metric.
///
/// Binary images are PNG-encoded bytes. They never reach the persistence
/// collaborator directly; the result sink uploads them and persists the
/// returned reference instead.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Scalar(f64),
    Text(String),
    BinaryImage(Vec<u8>),
}

impl MetricValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            MetricValue::Scalar(_) => ValueKind::Scalar,
            MetricValue::Text(_) => ValueKind::Text,
            MetricValue::BinaryImage(_) => ValueKind::BinaryImage,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Scalar(value)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        MetricValue::Text(value)
    }
}

/// Everything a metric invocation may read.
///
/// The context borrows nothing: it holds the shared bundle by `Arc`, so a
/// metric task can own its context while siblings read the same bundle.
#[derive(Clone)]
pub struct MetricContext {
    subject_id: Arc<str>,
    source_url: Option<Arc<str>>,
    bundle: Arc<PreprocessingBundle>,
    inference: Option<Arc<dyn InferenceProvider>>,
}

impl MetricContext {
    pub fn new(
        subject_id: Arc<str>,
        source_url: Option<Arc<str>>,
        bundle: Arc<PreprocessingBundle>,
        inference: Option<Arc<dyn InferenceProvider>>,
    ) -> Self {
        Self {
            subject_id,
            source_url,
            bundle,
            inference,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn raster(&self) -> &RgbImage {
        self.bundle.raster()
    }

    pub fn grayscale(&self) -> Option<&GrayImage> {
        self.bundle.grayscale()
    }

    pub fn color_space(&self) -> Option<&LabImage> {
        self.bundle.color_space()
    }

    pub fn lossless_bytes(&self) -> Option<&[u8]> {
        self.bundle.lossless_bytes()
    }

    pub fn lossy_bytes(&self) -> Option<&[u8]> {
        self.bundle.lossy_bytes()
    }

    pub fn segmentation(&self) -> Option<&SegmentationResult> {
        self.bundle.segmentation()
    }

    pub fn structure(&self) -> Option<&StructuralAnalysis> {
        self.bundle.structure()
    }

    /// Acquire a model-inference handle scoped to this invocation.
    ///
    /// The handle is released when the returned lease is dropped, including
    /// when the metric returns early or panics.
    pub fn acquire_inference(&self, model: &str) -> Result<InferenceLease, MetricError> {
        let provider = self
            .inference
            .clone()
            .ok_or(MetricError::MissingInput("inference provider"))?;
        InferenceLease::acquire(provider, model).map_err(|e| MetricError::failed(e.to_string()))
    }
}

/// A single pluggable evaluation capability.
#[async_trait]
pub trait MetricPlugin: Send + Sync {
    /// The metric ID this plugin was loaded for
    fn id(&self) -> &str;

    /// Implementation name, stable across IDs
    fn name(&self) -> &'static str;

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError>;
}

/// Builds plugin instances from catalogue artifacts.
#[async_trait]
pub trait PluginLoader: Send + Sync {
    async fn load(&self, entry: &CatalogueEntry) -> Result<Arc<dyn MetricPlugin>, RegistryError>;
}
