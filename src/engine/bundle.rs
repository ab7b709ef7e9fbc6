// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use image::{GrayImage, RgbImage};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::traits::{SegmentationResult, StructuralAnalysis};

/// A raster converted to CIELAB (D65), one `[L, a, b]` triple per pixel in
/// row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 3]>,
}

impl LabImage {
    pub fn channel(&self, index: usize) -> impl Iterator<Item = f32> + '_ {
        self.pixels.iter().map(move |p| p[index])
    }
}

/// The per-run container of derived representations of one subject.
///
/// Every derived field is written at most once by its preprocessing stage and
/// only read after that stage has finished. Metrics see the bundle through a
/// shared `Arc` and never mutate it.
pub struct PreprocessingBundle {
    raster: Arc<RgbImage>,
    pub(crate) lossless: OnceCell<Vec<u8>>,
    pub(crate) grayscale: OnceCell<GrayImage>,
    pub(crate) lossy: OnceCell<Vec<u8>>,
    pub(crate) color_space: OnceCell<LabImage>,
    pub(crate) structure: OnceCell<StructuralAnalysis>,
    pub(crate) segmentation: OnceCell<SegmentationResult>,
}

impl PreprocessingBundle {
    pub fn new(raster: RgbImage) -> Self {
        Self::from_shared(Arc::new(raster))
    }

    pub fn from_shared(raster: Arc<RgbImage>) -> Self {
        Self {
            raster,
            lossless: OnceCell::new(),
            grayscale: OnceCell::new(),
            lossy: OnceCell::new(),
            color_space: OnceCell::new(),
            structure: OnceCell::new(),
            segmentation: OnceCell::new(),
        }
    }

    /// Seed the lossless encoding with the bytes the subject arrived as.
    pub fn with_lossless(self, encoded: Vec<u8>) -> Self {
        let _ = self.lossless.set(encoded);
        self
    }

    pub fn raster(&self) -> &RgbImage {
        &self.raster
    }

    pub fn shared_raster(&self) -> Arc<RgbImage> {
        self.raster.clone()
    }

    pub fn lossless_bytes(&self) -> Option<&[u8]> {
        self.lossless.get().map(Vec::as_slice)
    }

    pub fn grayscale(&self) -> Option<&GrayImage> {
        self.grayscale.get()
    }

    pub fn lossy_bytes(&self) -> Option<&[u8]> {
        self.lossy.get().map(Vec::as_slice)
    }

    pub fn color_space(&self) -> Option<&LabImage> {
        self.color_space.get()
    }

    pub fn structure(&self) -> Option<&StructuralAnalysis> {
        self.structure.get()
    }

    pub fn segmentation(&self) -> Option<&SegmentationResult> {
        self.segmentation.get()
    }
}

impl std::fmt::Debug for PreprocessingBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreprocessingBundle")
            .field("dimensions", &self.raster.dimensions())
            .field("lossless", &self.lossless.get().map(Vec::len))
            .field("grayscale", &self.grayscale.initialized())
            .field("lossy", &self.lossy.get().map(Vec::len))
            .field("color_space", &self.color_space.initialized())
            .field("structure", &self.structure.initialized())
            .field("segmentation", &self.segmentation.initialized())
            .finish()
    }
}
