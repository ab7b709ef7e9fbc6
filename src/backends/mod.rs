// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in implementations of the plugin and collaborator seams.
//!
//! # Available Backends
//!
//! ## Local Metrics
//! In-process metric plugins, built by `LocalMetricFactory` from the
//! catalogue entry's `implementation` name:
//! - **Encoding**: PNG file size, JPEG file size and compression ratio
//! - **Color**: colorfulness, CIELAB channel statistics, grayscale entropy
//! - **Layout**: white space ratio, segmentation overlay
//! - **Text**: word count over the page's visible text
//!
//! ## Structural Analysis
//! `HtmlStructuralAnalyzer` parses supplied markup, or fetches a URL and
//! parses the response body.
//!
//! ## Segmentation
//! `XyCutSegmenter` splits the raster into regions along whitespace gaps and
//! renders their outlines as a PNG overlay.
//!
//! ## Stub Backend (Test-Only)
//! Test doubles for engine and registry development (only available in test builds):
//! - **Plugins**: static, failing, crashing, slow, concurrency-probing and recording metrics
//! - **Collaborators**: counting and failing analyzers and segmenters
//! - **Loaders**: counting and table-driven plugin loaders
//! - **Note**: NOT available in production builds
//!
//! # Example
//!
//! ```rust
//! use wui_evaluator::backends::local::LocalMetricFactory;
//! use wui_evaluator::config::{CatalogueEntry, MetricDescriptor};
//!
//! let entry = CatalogueEntry::new(MetricDescriptor::new("m1", "png_file_size"), "png_file_size");
//! let plugin = LocalMetricFactory::create_metric(&entry)?;
//! assert_eq!(plugin.id(), "m1");
//! # Ok::<(), wui_evaluator::errors::RegistryError>(())
//! ```

pub mod analysis;
pub mod local;
pub mod segmentation;
#[cfg(test)]
pub mod stub;
