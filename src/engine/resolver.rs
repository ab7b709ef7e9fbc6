// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Preprocessing resolution: which stages must run, and in which group each
//! metric executes.
//!
//! Stages come in two classes. Cheap stages (grayscale, lossy re-encode,
//! color space conversion) are pure functions of the raster and run up front.
//! Gating stages (structural analysis, segmentation) are expensive and only
//! the metrics that need them wait for them. A metric joins exactly one
//! execution group, chosen by the highest-priority gating stage it requires:
//!
//! | requires segmentation | requires structural analysis | group |
//! |---|---|---|
//! | yes | any | `Segmentation` |
//! | no  | yes | `StructuralAnalysis` |
//! | no  | no  | `None` |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::{LoadedMetric, PreprocessingRequirements};

/// A preprocessing step that derives one representation of the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Baseline PNG encoding, computed for every run that lacks one
    LosslessEncode,
    Grayscale,
    LossyReencode,
    ColorSpaceConversion,
    StructuralAnalysis,
    Segmentation,
}

impl Stage {
    pub const CHEAP: [Stage; 3] = [
        Stage::Grayscale,
        Stage::LossyReencode,
        Stage::ColorSpaceConversion,
    ];

    /// Cheap stages are computed eagerly for every run that needs them.
    pub fn is_cheap(self) -> bool {
        !matches!(self, Stage::StructuralAnalysis | Stage::Segmentation)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::LosslessEncode => "lossless_encode",
            Stage::Grayscale => "grayscale",
            Stage::LossyReencode => "lossy_reencode",
            Stage::ColorSpaceConversion => "color_space_conversion",
            Stage::StructuralAnalysis => "structural_analysis",
            Stage::Segmentation => "segmentation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The gating stage an execution group waits for. Ordered by execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GatingStage {
    None,
    StructuralAnalysis,
    Segmentation,
}

impl GatingStage {
    pub fn for_requirements(requirements: &PreprocessingRequirements) -> Self {
        if requirements.requires_segmentation {
            GatingStage::Segmentation
        } else if requirements.requires_structural_analysis {
            GatingStage::StructuralAnalysis
        } else {
            GatingStage::None
        }
    }

    pub fn stage(self) -> Option<Stage> {
        match self {
            GatingStage::None => None,
            GatingStage::StructuralAnalysis => Some(Stage::StructuralAnalysis),
            GatingStage::Segmentation => Some(Stage::Segmentation),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GatingStage::None => "ungated",
            GatingStage::StructuralAnalysis => "structural_analysis",
            GatingStage::Segmentation => "segmentation",
        }
    }
}

impl fmt::Display for GatingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics sharing one gating stage.
#[derive(Debug, Clone)]
pub struct ExecutionGroup {
    pub gating: GatingStage,
    pub metrics: Vec<LoadedMetric>,
}

/// Output of resolution: the stages a run needs and its non-empty groups in
/// execution order.
#[derive(Debug, Clone, Default)]
pub struct ResolutionPlan {
    pub required_stages: BTreeSet<Stage>,
    pub groups: Vec<ExecutionGroup>,
}

impl ResolutionPlan {
    /// Required cheap stages, in a fixed order.
    pub fn cheap_stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.required_stages.iter().copied().filter(|s| s.is_cheap())
    }

    pub fn metric_count(&self) -> usize {
        self.groups.iter().map(|g| g.metrics.len()).sum()
    }
}

pub struct PreprocessingResolver;

impl PreprocessingResolver {
    /// Compute the union of required stages and partition metrics by gating stage.
    ///
    /// A gating stage is only marked required when at least one metric is
    /// placed in its group, so a metric flagged for both structural analysis
    /// and segmentation never causes structural analysis to run.
    pub fn resolve(metrics: Vec<LoadedMetric>) -> ResolutionPlan {
        let mut required_stages = BTreeSet::new();
        let mut ungated = Vec::new();
        let mut structural = Vec::new();
        let mut segmentation = Vec::new();

        for metric in metrics {
            let requirements = metric.descriptor.preprocessing;
            for stage in Stage::CHEAP {
                if requirements.requires(stage) {
                    required_stages.insert(stage);
                }
            }

            let gating = GatingStage::for_requirements(&requirements);
            if let Some(stage) = gating.stage() {
                required_stages.insert(stage);
            }

            match gating {
                GatingStage::None => ungated.push(metric),
                GatingStage::StructuralAnalysis => structural.push(metric),
                GatingStage::Segmentation => segmentation.push(metric),
            }
        }

        let groups = [
            (GatingStage::None, ungated),
            (GatingStage::StructuralAnalysis, structural),
            (GatingStage::Segmentation, segmentation),
        ]
        .into_iter()
        .filter(|(_, metrics)| !metrics.is_empty())
        .map(|(gating, metrics)| ExecutionGroup { gating, metrics })
        .collect();

        ResolutionPlan {
            required_stages,
            groups,
        }
    }
}
