// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Boundary contracts for the collaborators the orchestration core consumes.
//!
//! Implementations live in `backends` (structural analysis, segmentation) and
//! `sink::stores` (blob storage, result persistence). Hosts can swap any of
//! them without touching the engine.

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::FailureKind;
use crate::errors::{LoadError, SegmentationError, SinkError};

/// Text and element structure extracted from markup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuralAnalysis {
    /// Visible text, whitespace-joined
    pub text: String,
    /// Every element in document order
    pub elements: Vec<ElementSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSummary {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub child_tags: Vec<String>,
}

#[async_trait]
pub trait StructuralAnalyzer: Send + Sync {
    /// Fetch-and-render path
    async fn analyze_url(&self, url: &str) -> Result<StructuralAnalysis, LoadError>;

    /// Static-parse path
    async fn analyze_markup(&self, markup: &str) -> Result<StructuralAnalysis, LoadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    pub height: u32,
    pub width: u32,
    pub channels: u8,
}

/// Half-open pixel bounds: rows `row_min..row_max`, columns `column_min..column_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub row_min: u32,
    pub row_max: u32,
    pub column_min: u32,
    pub column_max: u32,
}

impl BoundingBox {
    pub fn height(&self) -> u32 {
        self.row_max.saturating_sub(self.row_min)
    }

    pub fn width(&self) -> u32 {
        self.column_max.saturating_sub(self.column_min)
    }

    pub fn area(&self) -> u64 {
        u64::from(self.height()) * u64::from(self.width())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentElement {
    pub position: BoundingBox,
    pub class: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationResult {
    pub image_shape: ImageShape,
    pub elements: Vec<SegmentElement>,
    /// PNG rendering of the detected regions over the input
    #[serde(skip)]
    pub rendered_overlay: Vec<u8>,
}

#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn segment(&self, raster: Arc<RgbImage>) -> Result<SegmentationResult, SegmentationError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `bucket_path` and return a public reference.
    ///
    /// Empty payloads are rejected with `SinkError::EmptyPayload`.
    async fn upload(&self, bytes: &[u8], extension: &str, bucket_path: &str) -> Result<String, SinkError>;
}

/// A value as it is durably recorded: binary images appear only as references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PersistedValue {
    Scalar(f64),
    Text(String),
    BlobRef(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: FailureKind,
    pub message: String,
}

/// The durable record for one metric of one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedResult {
    pub values: Vec<PersistedValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn persist(&self, subject_id: &str, metric_id: &str, result: &PersistedResult) -> Result<(), SinkError>;
}
