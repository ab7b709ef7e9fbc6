// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use crate::backends::analysis::HtmlStructuralAnalyzer;
use crate::backends::local::LocalMetricFactory;
use crate::backends::segmentation::XyCutSegmenter;
use crate::config::catalogue::Catalogue;
use crate::config::loader::Config;
use crate::config::registry::MetricRegistry;
use crate::engine::{EvaluationEngine, EvaluationPipeline, PreprocessingExecutors};
use crate::errors::ConfigError;
use crate::observability::messages::registry::UnknownImplementation;
use crate::observability::messages::StructuredLog;
use crate::sink::{FsBlobStore, JsonLinesResultStore, ResultSink};

/// Evaluation runtime builder - wires the registry, preprocessing
/// collaborators, evaluation engine and result sink from configuration.
///
/// Every part uses the built-in backends: `LocalMetricFactory` loads plugins,
/// `HtmlStructuralAnalyzer` and `XyCutSegmenter` back the gated stages, and
/// results land in a filesystem blob store plus a JSON-lines result file.
/// Hosts that need different collaborators assemble `EvaluationPipeline`
/// directly.
///
/// # Examples
///
/// ```
/// use wui_evaluator::config::{parse_config, RuntimeBuilder};
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = parse_config(r#"
/// executor:
///   max_concurrency: 2
/// metrics:
///   - id: m1
///     name: png_file_size
/// "#).unwrap();
///
/// let pipeline = RuntimeBuilder::from_config(&config).unwrap();
/// assert_eq!(pipeline.registry().descriptors().await.len(), 1);
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build a complete evaluation pipeline from configuration.
    pub fn from_config(cfg: &Config) -> Result<EvaluationPipeline, ConfigError> {
        let registry = Self::registry(cfg);
        let executors = Self::executors(cfg)?;
        let engine = Self::engine(cfg);
        let sink = Self::sink(cfg);

        Ok(EvaluationPipeline::new(
            Arc::new(registry),
            executors,
            engine,
            Arc::new(sink),
        ))
    }

    /// Registry over the manifest, loading through `LocalMetricFactory`.
    pub fn registry(cfg: &Config) -> MetricRegistry {
        let catalogue = Catalogue::from_manifest(&cfg.metrics);

        for entry in catalogue.entries() {
            if !LocalMetricFactory::is_implementation_available(&entry.implementation) {
                UnknownImplementation {
                    metric_id: &entry.descriptor.id,
                    implementation: &entry.implementation,
                }
                .log();
            }
        }

        MetricRegistry::new(catalogue, Arc::new(LocalMetricFactory::new()))
    }

    pub fn executors(cfg: &Config) -> Result<PreprocessingExecutors, ConfigError> {
        let analysis = &cfg.structural_analysis;
        let analyzer = HtmlStructuralAnalyzer::new(
            Duration::from_secs(analysis.resolved_fetch_timeout_seconds()),
            analysis.resolved_user_agent(),
        )
        .map_err(|e| ConfigError::Runtime(e.to_string()))?;

        Ok(
            PreprocessingExecutors::new(Arc::new(analyzer), Arc::new(XyCutSegmenter::new()))
                .with_jpeg_quality(cfg.preprocessing.resolved_jpeg_quality()),
        )
    }

    pub fn engine(cfg: &Config) -> EvaluationEngine {
        EvaluationEngine::new(cfg.executor.resolved_max_concurrency()).with_metric_timeout(
            cfg.executor
                .metric_timeout_seconds
                .map(Duration::from_secs),
        )
    }

    pub fn sink(cfg: &Config) -> ResultSink {
        let storage = &cfg.storage;

        let mut blobs = FsBlobStore::new(storage.resolved_blob_dir());
        if let Some(base) = &storage.public_base_url {
            blobs = blobs.with_public_base_url(base.clone());
        }
        let results = JsonLinesResultStore::new(storage.resolved_results_file());

        ResultSink::new(Arc::new(blobs), Arc::new(results))
            .with_bucket_path(storage.resolved_bucket_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_engine_options_table_driven() {
        struct TestCase {
            name: &'static str,
            yaml: &'static str,
            expected_concurrency: Option<usize>,
        }

        let test_cases = vec![
            TestCase {
                name: "explicit concurrency",
                yaml: "executor:\n  max_concurrency: 3\n",
                expected_concurrency: Some(3),
            },
            TestCase {
                name: "zero falls back to available parallelism",
                yaml: "executor:\n  max_concurrency: 0\n",
                expected_concurrency: None,
            },
            TestCase {
                name: "empty config",
                yaml: "",
                expected_concurrency: None,
            },
        ];

        for test_case in test_cases {
            let cfg = parse_config(test_case.yaml).unwrap();
            let engine = RuntimeBuilder::engine(&cfg);
            match test_case.expected_concurrency {
                Some(expected) => assert_eq!(engine.max_concurrency(), expected, "Test case '{}'", test_case.name),
                None => assert!(engine.max_concurrency() >= 1, "Test case '{}'", test_case.name),
            }
        }
    }

    #[test]
    fn test_executors_use_configured_quality() {
        let cfg = parse_config("preprocessing:\n  jpeg_quality: 55\n").unwrap();
        let executors = RuntimeBuilder::executors(&cfg).unwrap();
        assert_eq!(executors.jpeg_quality(), 55);
    }

    #[tokio::test]
    async fn test_registry_loads_built_in_metrics() {
        let cfg = parse_config(
            r#"
metrics:
  - id: m1
    name: png_file_size
  - id: m8
    name: word_count
    preprocessing:
      requires_structural_analysis: true
  - id: m99
    name: unknown_metric
"#,
        )
        .unwrap();

        let registry = RuntimeBuilder::registry(&cfg);

        assert_eq!(registry.resolve("m1").await.unwrap().plugin.name(), "png_file_size");
        assert!(registry
            .resolve("m8")
            .await
            .unwrap()
            .descriptor
            .preprocessing
            .requires_structural_analysis);
        assert!(registry.resolve("m99").await.is_err());
    }
}
