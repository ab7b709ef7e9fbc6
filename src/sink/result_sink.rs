// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::consts::DEFAULT_BUCKET_PATH;
use crate::engine::MetricOutcome;
use crate::errors::SinkError;
use crate::observability::messages::sink::{BlobUploaded, ResultPersisted, StoreFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::{BlobStore, Diagnostic, MetricValue, PersistedResult, PersistedValue, ResultStore};

const IMAGE_EXTENSION: &str = ".png";

/// Converts metric outcomes into durable records.
///
/// Binary images are uploaded first and replaced by the reference the blob
/// store returns; scalars and text pass through unchanged. Failures are
/// persisted as an empty value list with a diagnostic, so every outcome
/// leaves a record.
pub struct ResultSink {
    blobs: Arc<dyn BlobStore>,
    results: Arc<dyn ResultStore>,
    bucket_path: String,
}

impl ResultSink {
    pub fn new(blobs: Arc<dyn BlobStore>, results: Arc<dyn ResultStore>) -> Self {
        Self {
            blobs,
            results,
            bucket_path: DEFAULT_BUCKET_PATH.to_string(),
        }
    }

    pub fn with_bucket_path(mut self, bucket_path: impl Into<String>) -> Self {
        self.bucket_path = bucket_path.into();
        self
    }

    pub async fn store(&self, subject_id: &str, outcome: &MetricOutcome) -> Result<PersistedResult, SinkError> {
        let metric_id = outcome.metric_id();
        let result = self.persist(subject_id, outcome).await;

        match &result {
            Ok(persisted) => ResultPersisted {
                subject_id,
                metric_id,
                value_count: persisted.values.len(),
                diagnostic: persisted.diagnostic.is_some(),
            }
            .log(),
            Err(e) => StoreFailed {
                subject_id,
                metric_id,
                error: e,
            }
            .log(),
        }

        result
    }

    async fn persist(&self, subject_id: &str, outcome: &MetricOutcome) -> Result<PersistedResult, SinkError> {
        let persisted = match outcome {
            MetricOutcome::Success { metric_id, values } => {
                let mut persisted_values = Vec::with_capacity(values.len());
                for value in values {
                    persisted_values.push(self.persist_value(subject_id, metric_id, value).await?);
                }
                PersistedResult {
                    values: persisted_values,
                    diagnostic: None,
                }
            }
            MetricOutcome::Failure(failure) => PersistedResult {
                values: Vec::new(),
                diagnostic: Some(Diagnostic {
                    kind: failure.kind,
                    message: failure.message.clone(),
                }),
            },
        };

        self.results
            .persist(subject_id, outcome.metric_id(), &persisted)
            .await?;

        Ok(persisted)
    }

    async fn persist_value(
        &self,
        subject_id: &str,
        metric_id: &str,
        value: &MetricValue,
    ) -> Result<PersistedValue, SinkError> {
        match value {
            MetricValue::Scalar(v) if !v.is_finite() => Err(SinkError::Persistence(format!(
                "scalar value {} is not finite",
                v
            ))),
            MetricValue::Scalar(v) => Ok(PersistedValue::Scalar(*v)),
            MetricValue::Text(t) => Ok(PersistedValue::Text(t.clone())),
            MetricValue::BinaryImage(bytes) => {
                if bytes.is_empty() {
                    return Err(SinkError::EmptyPayload);
                }
                let reference = self
                    .blobs
                    .upload(bytes, IMAGE_EXTENSION, &self.bucket_path)
                    .await?;
                BlobUploaded {
                    subject_id,
                    metric_id,
                    reference: &reference,
                    size_bytes: bytes.len(),
                }
                .log();
                Ok(PersistedValue::BlobRef(reference))
            }
        }
    }
}
