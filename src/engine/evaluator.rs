// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

use crate::engine::outcome::{FailureKind, MetricFailure, MetricOutcome};
use crate::engine::resolver::ExecutionGroup;
use crate::observability::messages::engine::{MetricFailed, MetricSucceeded};
use crate::observability::messages::StructuredLog;
use crate::errors::MetricError;
use crate::traits::{MetricContext, MetricPlugin, MetricValue};

/// Executes the metrics of an execution group concurrently.
///
/// Every metric runs in its own task, gated by a semaphore shared across all
/// runs of this engine, so `max_concurrency` bounds in-flight metric
/// invocations process-wide rather than per subject.
///
/// ## Fault isolation
/// - An error returned by a metric becomes a failure outcome for that metric
/// - A panicking metric is caught at its task boundary and becomes a
///   `MetricFault` outcome; siblings are unaffected
/// - Invocations run on the blocking pool; with a metric timeout configured,
///   one that runs too long becomes a `Timeout` outcome and frees its slot
pub struct EvaluationEngine {
    semaphore: Arc<Semaphore>,
    max_concurrency: usize,
    metric_timeout: Option<Duration>,
}

impl EvaluationEngine {
    pub fn new(max_concurrency: usize) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
            metric_timeout: None,
        }
    }

    pub fn with_metric_timeout(mut self, metric_timeout: Option<Duration>) -> Self {
        self.metric_timeout = metric_timeout;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Run every metric in `group` against `ctx` and return one outcome per
    /// metric, in group order.
    pub async fn evaluate_group(&self, group: &ExecutionGroup, ctx: &MetricContext) -> Vec<MetricOutcome> {
        let mut tasks = Vec::with_capacity(group.metrics.len());

        for metric in &group.metrics {
            let metric_id = metric.id().to_string();
            let plugin = metric.plugin.clone();
            let ctx = ctx.clone();
            let semaphore = self.semaphore.clone();
            let metric_timeout = self.metric_timeout;
            let task_metric_id = metric_id.clone();

            let task = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return MetricOutcome::Failure(MetricFailure::new(
                            task_metric_id,
                            FailureKind::MetricFault,
                            format!("executor unavailable: {}", e),
                        ))
                    }
                };

                let started = Instant::now();
                let invocation = invoke_blocking(plugin, ctx.clone());
                let joined = match metric_timeout {
                    Some(limit) => match tokio::time::timeout(limit, invocation).await {
                        Ok(joined) => joined,
                        Err(_) => {
                            return MetricOutcome::Failure(MetricFailure::new(
                                task_metric_id,
                                FailureKind::Timeout,
                                format!("metric exceeded time limit of {:?}", limit),
                            ))
                        }
                    },
                    None => invocation.await,
                };
                let result = match joined {
                    Ok(result) => result,
                    Err(join_error) => return MetricOutcome::Failure(join_failure(&task_metric_id, join_error)),
                };

                match result {
                    Ok(values) => {
                        MetricSucceeded {
                            subject_id: ctx.subject_id(),
                            metric_id: &task_metric_id,
                            value_count: values.len(),
                            duration: started.elapsed(),
                        }
                        .log();
                        MetricOutcome::Success {
                            metric_id: task_metric_id,
                            values,
                        }
                    }
                    Err(e) => MetricOutcome::Failure(MetricFailure::from_metric(&task_metric_id, &e)),
                }
            });

            tasks.push((metric_id, task));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (metric_id, task) in tasks {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(join_error) => MetricOutcome::Failure(join_failure(&metric_id, join_error)),
            };

            if let MetricOutcome::Failure(failure) = &outcome {
                MetricFailed {
                    subject_id: ctx.subject_id(),
                    metric_id: &failure.metric_id,
                    kind: failure.kind.as_str(),
                    message: &failure.message,
                }
                .log();
            }

            outcomes.push(outcome);
        }

        outcomes
    }
}

/// Runs the plugin on the blocking pool. A timed-out invocation is abandoned,
/// not interrupted.
fn invoke_blocking(
    plugin: Arc<dyn MetricPlugin>,
    ctx: MetricContext,
) -> JoinHandle<Result<Vec<MetricValue>, MetricError>> {
    let handle = Handle::current();
    tokio::task::spawn_blocking(move || handle.block_on(async move { plugin.execute(&ctx).await }))
}

fn join_failure(metric_id: &str, join_error: JoinError) -> MetricFailure {
    let message = if join_error.is_panic() {
        format!("metric panicked: {}", panic_message(join_error.into_panic()))
    } else {
        "metric task was cancelled".to_string()
    };
    MetricFailure::new(metric_id, FailureKind::MetricFault, message)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
