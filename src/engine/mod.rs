// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod bundle;
pub mod evaluator;
pub mod inference;
pub mod outcome;
pub mod pipeline;
pub mod preprocessing;
pub mod resolver;
pub mod submitter;

pub use bundle::{LabImage, PreprocessingBundle};
pub use evaluator::EvaluationEngine;
pub use inference::{InferenceLease, InferenceProvider, InferenceSession};
pub use outcome::{FailureKind, MetricFailure, MetricOutcome};
pub use pipeline::{
    EvaluationPipeline, EvaluationReport, EvaluationRequest, StorageReceipt, StorageReceipts,
};
pub use preprocessing::{PreprocessingExecutors, SubjectInputs};
pub use resolver::{ExecutionGroup, GatingStage, PreprocessingResolver, ResolutionPlan, Stage};
pub use submitter::BackgroundSubmitter;
