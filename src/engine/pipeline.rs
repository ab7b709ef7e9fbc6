// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The evaluation pipeline: one run per `EvaluationRequest`.
//!
//! ## Run phases
//! 1. **Resolution**: every requested metric ID is resolved through the
//!    registry; unresolvable IDs become `NotFound` outcomes
//! 2. **Planning**: the resolver unions required stages and partitions the
//!    resolved metrics into execution groups
//! 3. **Cheap preprocessing**: the lossless encoding and every required cheap
//!    stage are computed before any metric runs
//! 4. **Groups**: `None`, then `StructuralAnalysis`, then `Segmentation`. Each
//!    group runs its gating stage once and then evaluates its metrics
//!    concurrently. A failed stage fails only the metrics that depend on it.
//! 5. **Storage**: each outcome is handed to the result sink as soon as its
//!    group finishes; the returned report carries the in-flight receipts
//!
//! Every requested metric ID yields exactly one outcome.

use image::RgbImage;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::config::{LoadedMetric, MetricRegistry};
use crate::engine::bundle::PreprocessingBundle;
use crate::engine::evaluator::EvaluationEngine;
use crate::engine::inference::InferenceProvider;
use crate::engine::outcome::{MetricFailure, MetricOutcome};
use crate::engine::preprocessing::{PreprocessingExecutors, SubjectInputs};
use crate::engine::resolver::{ExecutionGroup, PreprocessingResolver, Stage};
use crate::errors::{PreprocessingError, SinkError};
use crate::observability::messages::engine::{
    GroupCompleted, GroupStarted, MetricFailed, RunCompleted, RunStarted,
};
use crate::observability::messages::preprocessing::StageFailed;
use crate::observability::messages::StructuredLog;
use crate::sink::ResultSink;
use crate::traits::{MetricContext, PersistedResult};

/// Input for one evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub subject_id: String,
    pub raster: RgbImage,
    /// Lossless encoding the subject arrived as, if any
    pub encoded: Option<Vec<u8>>,
    pub source_url: Option<String>,
    pub markup: Option<String>,
    pub metric_ids: BTreeSet<String>,
}

impl EvaluationRequest {
    pub fn new<I, S>(subject_id: impl Into<String>, raster: RgbImage, metric_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject_id: subject_id.into(),
            raster,
            encoded: None,
            source_url: None,
            markup: None,
            metric_ids: metric_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    pub fn with_encoded(mut self, encoded: Vec<u8>) -> Self {
        self.encoded = Some(encoded);
        self
    }
}

/// The persistence result for one outcome.
#[derive(Debug, Clone)]
pub struct StorageReceipt {
    pub metric_id: String,
    pub result: Result<PersistedResult, SinkError>,
}

/// Storage tasks still in flight when a run returns.
#[derive(Debug, Default)]
pub struct StorageReceipts {
    pending: Vec<(String, JoinHandle<Result<PersistedResult, SinkError>>)>,
}

impl StorageReceipts {
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Wait for every storage task, in submission order.
    pub async fn wait(self) -> Vec<StorageReceipt> {
        let mut receipts = Vec::with_capacity(self.pending.len());
        for (metric_id, task) in self.pending {
            let result = match task.await {
                Ok(result) => result,
                Err(join_error) => Err(SinkError::Interrupted(join_error.to_string())),
            };
            receipts.push(StorageReceipt { metric_id, result });
        }
        receipts
    }
}

/// Everything a run produced.
#[derive(Debug)]
pub struct EvaluationReport {
    pub subject_id: String,
    pub outcomes: Vec<Arc<MetricOutcome>>,
    pub storage: StorageReceipts,
}

impl EvaluationReport {
    pub fn outcome(&self, metric_id: &str) -> Option<&MetricOutcome> {
        self.outcomes
            .iter()
            .map(Arc::as_ref)
            .find(|o| o.metric_id() == metric_id)
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

pub struct EvaluationPipeline {
    registry: Arc<MetricRegistry>,
    executors: PreprocessingExecutors,
    engine: EvaluationEngine,
    sink: Arc<ResultSink>,
    inference: Option<Arc<dyn InferenceProvider>>,
}

impl EvaluationPipeline {
    pub fn new(
        registry: Arc<MetricRegistry>,
        executors: PreprocessingExecutors,
        engine: EvaluationEngine,
        sink: Arc<ResultSink>,
    ) -> Self {
        Self {
            registry,
            executors,
            engine,
            sink,
            inference: None,
        }
    }

    pub fn with_inference(mut self, provider: Arc<dyn InferenceProvider>) -> Self {
        self.inference = Some(provider);
        self
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    pub async fn run(&self, request: EvaluationRequest) -> EvaluationReport {
        let started = Instant::now();
        let subject_id: Arc<str> = Arc::from(request.subject_id.as_str());

        RunStarted {
            subject_id: &subject_id,
            requested_metrics: request.metric_ids.len(),
        }
        .log();

        let mut run = RunState::new(subject_id.clone(), self.sink.clone());

        let mut resolved = Vec::with_capacity(request.metric_ids.len());
        for metric_id in &request.metric_ids {
            match self.registry.resolve(metric_id).await {
                Ok(metric) => resolved.push(metric),
                Err(e) => run.fail(MetricFailure::from_registry(metric_id, &e)),
            }
        }
        run.flush();

        let plan = PreprocessingResolver::resolve(resolved);

        if !plan.groups.is_empty() {
            let inputs = SubjectInputs {
                subject_id: subject_id.clone(),
                source_url: request.source_url.as_deref().map(Arc::from),
                markup: request.markup.as_deref().map(Arc::from),
            };

            let mut bundle = PreprocessingBundle::new(request.raster);
            if let Some(encoded) = request.encoded {
                bundle = bundle.with_lossless(encoded);
            }

            let mut failed_stages: BTreeMap<Stage, PreprocessingError> = BTreeMap::new();
            for stage in std::iter::once(Stage::LosslessEncode).chain(plan.cheap_stages()) {
                if let Err(e) = self.executors.run_stage(stage, &bundle, &inputs).await {
                    StageFailed {
                        subject_id: &subject_id,
                        stage: stage.as_str(),
                        dependent_metrics: count_dependents(&plan.groups, stage),
                        error: &e,
                    }
                    .log();
                    failed_stages.insert(stage, e);
                }
            }

            let bundle = Arc::new(bundle);
            let ctx = MetricContext::new(
                subject_id.clone(),
                inputs.source_url.clone(),
                bundle.clone(),
                self.inference.clone(),
            );

            for group in &plan.groups {
                self.run_group(group, &bundle, &inputs, &ctx, &failed_stages, &mut run)
                    .await;
            }
        }

        RunCompleted {
            subject_id: &subject_id,
            succeeded: run.succeeded(),
            failed: run.outcomes.len() - run.succeeded(),
            duration: started.elapsed(),
        }
        .log();

        run.into_report()
    }

    async fn run_group(
        &self,
        group: &ExecutionGroup,
        bundle: &PreprocessingBundle,
        inputs: &SubjectInputs,
        ctx: &MetricContext,
        failed_stages: &BTreeMap<Stage, PreprocessingError>,
        run: &mut RunState,
    ) {
        let started = Instant::now();
        GroupStarted {
            subject_id: &inputs.subject_id,
            gating: group.gating.as_str(),
            metric_count: group.metrics.len(),
        }
        .log();

        let mut runnable: Vec<LoadedMetric> = Vec::with_capacity(group.metrics.len());
        for metric in &group.metrics {
            let requirements = &metric.descriptor.preprocessing;
            match failed_stages.iter().find(|(stage, _)| requirements.requires(**stage)) {
                Some((_, error)) => run.fail(MetricFailure::from_preprocessing(metric.id(), error)),
                None => runnable.push(metric.clone()),
            }
        }

        if !runnable.is_empty() {
            let gate = match group.gating.stage() {
                Some(stage) => self.executors.run_stage(stage, bundle, inputs).await.map_err(|e| {
                    StageFailed {
                        subject_id: &inputs.subject_id,
                        stage: stage.as_str(),
                        dependent_metrics: runnable.len(),
                        error: &e,
                    }
                    .log();
                    e
                }),
                None => Ok(()),
            };

            match gate {
                Ok(()) => {
                    let runnable_group = ExecutionGroup {
                        gating: group.gating,
                        metrics: runnable,
                    };
                    for outcome in self.engine.evaluate_group(&runnable_group, ctx).await {
                        run.record(outcome);
                    }
                }
                Err(e) => {
                    for metric in &runnable {
                        run.fail(MetricFailure::from_preprocessing(metric.id(), &e));
                    }
                }
            }
        }

        run.flush();

        GroupCompleted {
            subject_id: &inputs.subject_id,
            gating: group.gating.as_str(),
            metric_count: group.metrics.len(),
            duration: started.elapsed(),
        }
        .log();
    }
}

fn count_dependents(groups: &[ExecutionGroup], stage: Stage) -> usize {
    groups
        .iter()
        .flat_map(|g| g.metrics.iter())
        .filter(|m| m.descriptor.preprocessing.requires(stage))
        .count()
}

/// Outcomes collected so far, plus the storage tasks started for them.
struct RunState {
    subject_id: Arc<str>,
    sink: Arc<ResultSink>,
    outcomes: Vec<Arc<MetricOutcome>>,
    unflushed: usize,
    storage: StorageReceipts,
}

impl RunState {
    fn new(subject_id: Arc<str>, sink: Arc<ResultSink>) -> Self {
        Self {
            subject_id,
            sink,
            outcomes: Vec::new(),
            unflushed: 0,
            storage: StorageReceipts::default(),
        }
    }

    fn record(&mut self, outcome: MetricOutcome) {
        self.outcomes.push(Arc::new(outcome));
        self.unflushed += 1;
    }

    /// Record a failure raised outside the evaluator, which logs its own.
    fn fail(&mut self, failure: MetricFailure) {
        MetricFailed {
            subject_id: &self.subject_id,
            metric_id: &failure.metric_id,
            kind: failure.kind.as_str(),
            message: &failure.message,
        }
        .log();
        self.record(MetricOutcome::Failure(failure));
    }

    /// Hand every outcome recorded since the last flush to the sink.
    fn flush(&mut self) {
        let start = self.outcomes.len() - self.unflushed;
        for outcome in &self.outcomes[start..] {
            let sink = self.sink.clone();
            let subject_id = self.subject_id.clone();
            let outcome = outcome.clone();
            let metric_id = outcome.metric_id().to_string();
            let task = tokio::spawn(async move { sink.store(&subject_id, &outcome).await });
            self.storage.pending.push((metric_id, task));
        }
        self.unflushed = 0;
    }

    fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    fn into_report(self) -> EvaluationReport {
        EvaluationReport {
            subject_id: self.subject_id.to_string(),
            outcomes: self.outcomes,
            storage: self.storage,
        }
    }
}
