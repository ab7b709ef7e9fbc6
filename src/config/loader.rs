// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::catalogue::MetricManifestEntry;
use crate::config::consts::{
    DEFAULT_BLOB_DIR, DEFAULT_BUCKET_PATH, DEFAULT_FETCH_TIMEOUT_SECONDS, DEFAULT_JPEG_QUALITY,
    DEFAULT_RESULTS_FILE, DEFAULT_USER_AGENT, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
use crate::errors::ConfigError;
use crate::observability::messages::validation::{CatalogueValidated, ConfigurationWarning};
use crate::observability::messages::StructuredLog;

/// Main configuration structure for the evaluation service.
///
/// Every section is optional and falls back to built-in defaults; an empty
/// document yields a runnable configuration with an empty metric catalogue.
///
/// # Fields
/// * `executor` - Concurrency and timeout limits for metric tasks
/// * `preprocessing` - Tuning for the derived-representation stages
/// * `structural_analysis` - How source URLs are fetched
/// * `storage` - Where result images and result records are written
/// * `metrics` - The metric manifest, one entry per loadable metric
///
/// # Example
/// ```yaml
/// executor:
///   max_concurrency: 4
///   metric_timeout_seconds: 30
/// preprocessing:
///   jpeg_quality: 80
/// storage:
///   blob_dir: ./out/blobs
///   results_file: ./out/results.jsonl
/// metrics:
///   - id: m1
///     name: png_file_size
///     accepted_input: [png, url, html]
///     results:
///       - name: PNG file size
///         type: scalar
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub executor: ExecutorOptions,
    #[serde(default)]
    pub preprocessing: PreprocessingOptions,
    #[serde(default)]
    pub structural_analysis: StructuralAnalysisOptions,
    #[serde(default)]
    pub storage: StorageOptions,
    #[serde(default)]
    pub metrics: Vec<MetricManifestEntry>,
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_concurrency` - Upper bound on metric tasks running at once, shared by all runs (optional)
/// * `metric_timeout_seconds` - Wall-clock limit for one metric invocation (optional)
#[derive(Debug, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
    pub metric_timeout_seconds: Option<u64>,
}

impl ExecutorOptions {
    /// Configured concurrency, or the host's available parallelism.
    pub fn resolved_max_concurrency(&self) -> usize {
        self.max_concurrency.filter(|n| *n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PreprocessingOptions {
    pub jpeg_quality: Option<u8>,
}

impl PreprocessingOptions {
    /// JPEG quality for the lossy re-encode stage, clamped to `1..=100`.
    pub fn resolved_jpeg_quality(&self) -> u8 {
        self.jpeg_quality
            .unwrap_or(DEFAULT_JPEG_QUALITY)
            .clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StructuralAnalysisOptions {
    pub fetch_timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

impl StructuralAnalysisOptions {
    pub fn resolved_fetch_timeout_seconds(&self) -> u64 {
        self.fetch_timeout_seconds
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECONDS)
    }

    pub fn resolved_user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Storage locations for the filesystem blob store and the JSON-lines result store.
///
/// `public_base_url`, when set, prefixes the references the blob store hands
/// back; otherwise references are local file paths.
#[derive(Debug, Default, Deserialize)]
pub struct StorageOptions {
    pub blob_dir: Option<PathBuf>,
    pub public_base_url: Option<String>,
    pub bucket_path: Option<String>,
    pub results_file: Option<PathBuf>,
}

impl StorageOptions {
    pub fn resolved_blob_dir(&self) -> PathBuf {
        self.blob_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOB_DIR))
    }

    pub fn resolved_bucket_path(&self) -> &str {
        self.bucket_path.as_deref().unwrap_or(DEFAULT_BUCKET_PATH)
    }

    pub fn resolved_results_file(&self) -> PathBuf {
        self.results_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_FILE))
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse a config from YAML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    // serde_yaml maps an empty document to unit, not an empty mapping
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = serde_yaml::from_str(content)?;
    Ok(cfg)
}

/// Load and validate a config from a YAML file
///
/// Validation errors reject the configuration. Warnings are logged and the
/// configuration is returned.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;

    let (warnings, errors): (Vec<_>, Vec<_>) = crate::config::validate_catalogue(&cfg.metrics)
        .into_iter()
        .partition(|p| p.is_warning());

    for warning in &warnings {
        ConfigurationWarning { warning }.log();
    }

    if !errors.is_empty() {
        return Err(ConfigError::Invalid(errors));
    }

    CatalogueValidated {
        metric_count: cfg.metrics.len(),
        warning_count: warnings.len(),
    }
    .log();

    Ok(cfg)
}
