// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Metric descriptors and the catalogue of loadable metric artifacts.
//!
//! The catalogue is populated once from the manifest section of the config and
//! can be extended at runtime. Each entry is addressed by its artifact name,
//! `<id>_<name>` (for example `m1_png_file_size`), and lookups match a metric
//! ID against that name by prefix.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::consts::ARTIFACT_SEPARATOR;
use crate::engine::Stage;
use crate::errors::RegistryError;
use crate::traits::ValueKind;

/// Input kinds a metric can meaningfully evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptedInput {
    Html,
    Url,
    Png,
}

/// Preprocessing a metric needs before it can execute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessingRequirements {
    #[serde(default, alias = "grayscale_conversion_required")]
    pub requires_grayscale: bool,
    #[serde(default, alias = "jpeg_conversion_required")]
    pub requires_lossy_reencode: bool,
    #[serde(default, alias = "lab_conversion_required")]
    pub requires_color_space_conversion: bool,
    #[serde(default, alias = "dom_analysis_required")]
    pub requires_structural_analysis: bool,
    #[serde(default, alias = "segmentation_required")]
    pub requires_segmentation: bool,
}

impl PreprocessingRequirements {
    /// Declared requirement for `stage`. The lossless encoding is never
    /// declared; every run has one.
    pub fn requires(&self, stage: Stage) -> bool {
        match stage {
            Stage::LosslessEncode => false,
            Stage::Grayscale => self.requires_grayscale,
            Stage::LossyReencode => self.requires_lossy_reencode,
            Stage::ColorSpaceConversion => self.requires_color_space_conversion,
            Stage::StructuralAnalysis => self.requires_structural_analysis,
            Stage::Segmentation => self.requires_segmentation,
        }
    }
}

/// Documents one output value of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ValueKind,
}

/// Static, immutable capability descriptor of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub accepted_input: Vec<AcceptedInput>,
    #[serde(default)]
    pub preprocessing: PreprocessingRequirements,
    #[serde(default)]
    pub results: Vec<ResultDefinition>,
}

impl MetricDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            accepted_input: vec![AcceptedInput::Png, AcceptedInput::Url, AcceptedInput::Html],
            preprocessing: PreprocessingRequirements::default(),
            results: Vec::new(),
        }
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingRequirements) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    /// `<id>_<name>`, the name the catalogue matches against
    pub fn artifact_name(&self) -> String {
        format!("{}{}{}", self.id, ARTIFACT_SEPARATOR, self.name)
    }

    pub fn accepts(&self, input: AcceptedInput) -> bool {
        self.accepted_input.contains(&input)
    }
}

/// A manifest entry as written in the config file.
///
/// `implementation` selects the plugin the loader builds; it defaults to the
/// metric's name.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricManifestEntry {
    #[serde(flatten)]
    pub descriptor: MetricDescriptor,
    #[serde(default)]
    pub implementation: Option<String>,
}

/// A loadable metric artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueEntry {
    pub descriptor: Arc<MetricDescriptor>,
    pub artifact: String,
    pub implementation: String,
}

impl CatalogueEntry {
    pub fn new(descriptor: MetricDescriptor, implementation: impl Into<String>) -> Self {
        Self {
            artifact: descriptor.artifact_name(),
            descriptor: Arc::new(descriptor),
            implementation: implementation.into(),
        }
    }
}

impl From<MetricManifestEntry> for CatalogueEntry {
    fn from(entry: MetricManifestEntry) -> Self {
        let implementation = entry
            .implementation
            .unwrap_or_else(|| entry.descriptor.name.clone());
        CatalogueEntry::new(entry.descriptor, implementation)
    }
}

/// The set of metric artifacts available to the registry.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
}

impl Catalogue {
    pub fn new(entries: Vec<CatalogueEntry>) -> Self {
        Self { entries }
    }

    pub fn from_manifest(manifest: &[MetricManifestEntry]) -> Self {
        Self::new(manifest.iter().cloned().map(CatalogueEntry::from).collect())
    }

    /// Find the single artifact whose name starts with `<metric_id>_`.
    pub fn lookup(&self, metric_id: &str) -> Result<&CatalogueEntry, RegistryError> {
        let prefix = format!("{}{}", metric_id, ARTIFACT_SEPARATOR);
        let mut matches = self
            .entries
            .iter()
            .filter(|entry| entry.artifact.starts_with(&prefix));

        let first = matches.next().ok_or_else(|| RegistryError::NotFound {
            metric_id: metric_id.to_string(),
        })?;

        let rest: Vec<&CatalogueEntry> = matches.collect();
        if !rest.is_empty() {
            let candidates = std::iter::once(first)
                .chain(rest)
                .map(|entry| entry.artifact.clone())
                .collect();
            return Err(RegistryError::Ambiguous {
                metric_id: metric_id.to_string(),
                candidates,
            });
        }

        Ok(first)
    }

    /// Add an artifact, replacing any entry for the same metric ID.
    pub fn upsert(&mut self, entry: CatalogueEntry) -> Option<CatalogueEntry> {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.descriptor.id == entry.descriptor.id)
        {
            Some(existing) => Some(std::mem::replace(existing, entry)),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogueEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
