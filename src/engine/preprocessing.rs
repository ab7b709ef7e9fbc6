// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Preprocessing stage executors.
//!
//! Each stage populates exactly one bundle field and is idempotent: a field
//! that is already populated is left alone, and concurrent calls for the same
//! stage share one computation. CPU-bound work runs on the blocking pool so
//! it never stalls the async workers that drive I/O-bound metrics.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GrayImage, ImageEncoder, RgbImage};
use std::sync::Arc;
use std::time::Instant;

use crate::config::consts::DEFAULT_JPEG_QUALITY;
use crate::engine::bundle::{LabImage, PreprocessingBundle};
use crate::engine::resolver::Stage;
use crate::errors::PreprocessingError;
use crate::observability::messages::preprocessing::StageCompleted;
use crate::observability::messages::StructuredLog;
use crate::traits::{Segmenter, StructuralAnalyzer};

/// The raw, non-raster inputs of one evaluation request.
#[derive(Debug, Clone)]
pub struct SubjectInputs {
    pub subject_id: Arc<str>,
    pub source_url: Option<Arc<str>>,
    pub markup: Option<Arc<str>>,
}

/// Runs preprocessing stages against a bundle using the configured collaborators.
#[derive(Clone)]
pub struct PreprocessingExecutors {
    analyzer: Arc<dyn StructuralAnalyzer>,
    segmenter: Arc<dyn Segmenter>,
    jpeg_quality: u8,
}

impl PreprocessingExecutors {
    pub fn new(analyzer: Arc<dyn StructuralAnalyzer>, segmenter: Arc<dyn Segmenter>) -> Self {
        Self {
            analyzer,
            segmenter,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    pub async fn run_stage(
        &self,
        stage: Stage,
        bundle: &PreprocessingBundle,
        inputs: &SubjectInputs,
    ) -> Result<(), PreprocessingError> {
        let started = Instant::now();

        match stage {
            Stage::LosslessEncode => self.ensure_lossless(bundle).await?,
            Stage::Grayscale => self.ensure_grayscale(bundle).await?,
            Stage::LossyReencode => self.ensure_lossy(bundle).await?,
            Stage::ColorSpaceConversion => self.ensure_color_space(bundle).await?,
            Stage::StructuralAnalysis => self.ensure_structure(bundle, inputs).await?,
            Stage::Segmentation => self.ensure_segmentation(bundle).await?,
        }

        StageCompleted {
            subject_id: &inputs.subject_id,
            stage: stage.as_str(),
            duration: started.elapsed(),
        }
        .log();

        Ok(())
    }

    /// Lossless encoding of the raster; skipped when the request supplied one.
    pub async fn ensure_lossless(&self, bundle: &PreprocessingBundle) -> Result<(), PreprocessingError> {
        let raster = bundle.shared_raster();
        bundle
            .lossless
            .get_or_try_init(|| blocking(Stage::LosslessEncode, move || encode_png(&raster)))
            .await?;
        Ok(())
    }

    pub async fn ensure_grayscale(&self, bundle: &PreprocessingBundle) -> Result<(), PreprocessingError> {
        let raster = bundle.shared_raster();
        bundle
            .grayscale
            .get_or_try_init(|| blocking(Stage::Grayscale, move || Ok(to_grayscale(&raster))))
            .await?;
        Ok(())
    }

    pub async fn ensure_lossy(&self, bundle: &PreprocessingBundle) -> Result<(), PreprocessingError> {
        let raster = bundle.shared_raster();
        let quality = self.jpeg_quality;
        bundle
            .lossy
            .get_or_try_init(|| blocking(Stage::LossyReencode, move || encode_jpeg(&raster, quality)))
            .await?;
        Ok(())
    }

    pub async fn ensure_color_space(&self, bundle: &PreprocessingBundle) -> Result<(), PreprocessingError> {
        let raster = bundle.shared_raster();
        bundle
            .color_space
            .get_or_try_init(|| blocking(Stage::ColorSpaceConversion, move || Ok(to_lab(&raster))))
            .await?;
        Ok(())
    }

    /// Analyze the subject's markup. A source URL takes precedence over
    /// supplied markup; with neither, the stage reports a missing input
    /// without calling the analyzer.
    pub async fn ensure_structure(
        &self,
        bundle: &PreprocessingBundle,
        inputs: &SubjectInputs,
    ) -> Result<(), PreprocessingError> {
        let stage = Stage::StructuralAnalysis;
        bundle
            .structure
            .get_or_try_init(|| async {
                let analysis = match (&inputs.source_url, &inputs.markup) {
                    (Some(url), _) => self.analyzer.analyze_url(url).await,
                    (None, Some(markup)) => self.analyzer.analyze_markup(markup).await,
                    (None, None) => {
                        return Err(PreprocessingError::MissingInput {
                            stage,
                            needed: "a source URL or markup",
                        })
                    }
                };
                analysis.map_err(|e| PreprocessingError::failed(stage, e))
            })
            .await?;
        Ok(())
    }

    pub async fn ensure_segmentation(&self, bundle: &PreprocessingBundle) -> Result<(), PreprocessingError> {
        bundle
            .segmentation
            .get_or_try_init(|| async {
                self.segmenter
                    .segment(bundle.shared_raster())
                    .await
                    .map_err(|e| PreprocessingError::failed(Stage::Segmentation, e))
            })
            .await?;
        Ok(())
    }
}

async fn blocking<T, F>(stage: Stage, work: F) -> Result<T, PreprocessingError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| PreprocessingError::failed(stage, e))?
        .map_err(|reason| PreprocessingError::failed(stage, reason))
}

pub fn to_grayscale(raster: &RgbImage) -> GrayImage {
    image::imageops::grayscale(raster)
}

pub fn encode_png(raster: &RgbImage) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(raster.as_raw(), raster.width(), raster.height(), ExtendedColorType::Rgb8)
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

pub fn encode_jpeg(raster: &RgbImage, quality: u8) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(raster.as_raw(), raster.width(), raster.height(), ExtendedColorType::Rgb8)
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}

// D65 reference white, 2 degree observer
const WHITE_X: f32 = 0.950_47;
const WHITE_Y: f32 = 1.0;
const WHITE_Z: f32 = 1.088_83;

/// sRGB to CIELAB under D65. L is in `0..=100`.
pub fn to_lab(raster: &RgbImage) -> LabImage {
    let pixels = raster
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0.map(srgb_to_linear);

            let x = 0.412_453 * r + 0.357_580 * g + 0.180_423 * b;
            let y = 0.212_671 * r + 0.715_160 * g + 0.072_169 * b;
            let z = 0.019_334 * r + 0.119_193 * g + 0.950_227 * b;

            let fx = lab_f(x / WHITE_X);
            let fy = lab_f(y / WHITE_Y);
            let fz = lab_f(z / WHITE_Z);

            [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
        })
        .collect();

    LabImage {
        width: raster.width(),
        height: raster.height(),
        pixels,
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = f32::from(channel) / 255.0;
    if c > 0.040_45 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn lab_f(t: f32) -> f32 {
    const EPSILON: f32 = 0.008_856;
    if t > EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}
