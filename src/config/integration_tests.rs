// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use crate::backends::local::LocalMetricFactory;
    use crate::config::{load_and_validate_config, AcceptedInput, RuntimeBuilder};
    use crate::traits::ValueKind;

    const BUNDLED_CONFIG: &str = "configs/wui-evaluator.yaml";

    /// Test that the bundled configuration loads and validates
    #[test]
    fn test_bundled_config_loading() {
        let config = load_and_validate_config(BUNDLED_CONFIG).unwrap();

        assert_eq!(config.executor.max_concurrency, Some(4));
        assert_eq!(config.executor.metric_timeout_seconds, Some(120));
        assert_eq!(config.preprocessing.resolved_jpeg_quality(), 80);
        assert_eq!(config.storage.resolved_bucket_path(), "results");

        let ids: Vec<&str> = config.metrics.iter().map(|m| m.descriptor.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3", "m4", "m5", "m6", "m8", "m12"]);
    }

    /// Legacy `*_required` manifest keys map onto the descriptor flags
    #[test]
    fn test_bundled_config_preprocessing_flags() {
        let config = load_and_validate_config(BUNDLED_CONFIG).unwrap();
        let flags = |id: &str| {
            config
                .metrics
                .iter()
                .find(|m| m.descriptor.id == id)
                .map(|m| m.descriptor.preprocessing)
                .unwrap()
        };

        assert!(flags("m2").requires_lossy_reencode);
        assert!(flags("m4").requires_color_space_conversion);
        assert!(flags("m5").requires_segmentation);
        assert!(flags("m8").requires_structural_analysis);
        assert!(flags("m12").requires_grayscale);
        assert_eq!(flags("m1"), Default::default());
    }

    #[test]
    fn test_bundled_config_descriptors() {
        let config = load_and_validate_config(BUNDLED_CONFIG).unwrap();
        let m6 = config.metrics.iter().find(|m| m.descriptor.id == "m6").unwrap();

        assert_eq!(m6.descriptor.artifact_name(), "m6_uied_segmentation");
        assert_eq!(m6.implementation.as_deref(), Some("segmentation"));
        let kinds: Vec<ValueKind> = m6.descriptor.results.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ValueKind::BinaryImage, ValueKind::Text]);

        let m8 = config.metrics.iter().find(|m| m.descriptor.id == "m8").unwrap();
        assert!(m8.descriptor.accepts(AcceptedInput::Html));
        assert!(!m8.descriptor.accepts(AcceptedInput::Png));
    }

    /// Every bundled metric is backed by a built-in implementation
    #[test]
    fn test_bundled_metrics_have_implementations() {
        let config = load_and_validate_config(BUNDLED_CONFIG).unwrap();

        for entry in &config.metrics {
            let implementation = entry
                .implementation
                .clone()
                .unwrap_or_else(|| entry.descriptor.name.clone());
            assert!(
                LocalMetricFactory::is_implementation_available(&implementation),
                "metric '{}' has no implementation '{}'",
                entry.descriptor.id,
                implementation
            );
        }
    }

    /// Test building the evaluation runtime from the bundled configuration
    #[tokio::test]
    async fn test_build_runtime_from_yaml() {
        let config = load_and_validate_config(BUNDLED_CONFIG).unwrap();
        let pipeline = RuntimeBuilder::from_config(&config).unwrap();

        let registry = pipeline.registry();
        assert_eq!(registry.descriptors().await.len(), 8);

        for id in ["m1", "m2", "m3", "m4", "m5", "m6", "m8", "m12"] {
            let loaded = registry.resolve(id).await.unwrap();
            assert_eq!(loaded.id(), id);
        }
        assert!(registry.resolve("m7").await.is_err());
    }
}
