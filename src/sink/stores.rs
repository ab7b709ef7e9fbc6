// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Blob and result store implementations.
//!
//! The filesystem blob store and the JSON-lines result store back the
//! `wui-evaluator` binary. The in-memory stores serve embedding hosts and
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::errors::SinkError;
use crate::traits::{BlobStore, PersistedResult, PersistedValue, ResultStore};

fn blob_name(extension: &str) -> String {
    format!("{}{}", Uuid::new_v4(), extension)
}

/// Writes blobs to `<root>/<bucket_path>/<uuid><extension>`.
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_base_url: None,
        }
    }

    /// References become `<base>/<bucket_path>/<file>` instead of local paths.
    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        self.public_base_url = Some(base.into());
        self
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, bytes: &[u8], extension: &str, bucket_path: &str) -> Result<String, SinkError> {
        if bytes.is_empty() {
            return Err(SinkError::EmptyPayload);
        }

        let directory = self.root.join(bucket_path);
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| SinkError::Upload(format!("{}: {}", directory.display(), e)))?;

        let file_name = blob_name(extension);
        let path = directory.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| SinkError::Upload(format!("{}: {}", path.display(), e)))?;

        Ok(match &self.public_base_url {
            Some(base) => format!("{}/{}/{}", base.trim_end_matches('/'), bucket_path, file_name),
            None => path.display().to_string(),
        })
    }
}

/// One line of the JSON-lines result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub subject_id: String,
    pub metric_id: String,
    pub recorded_at: u64,
    #[serde(flatten)]
    pub result: PersistedResult,
}

/// Appends one JSON object per persisted result to a file.
pub struct JsonLinesResultStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonLinesResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every record in the file, in write order.
    pub async fn read_all(&self) -> Result<Vec<ResultRecord>, SinkError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SinkError::Persistence(e.to_string())),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| SinkError::Persistence(e.to_string())))
            .collect()
    }
}

#[async_trait]
impl ResultStore for JsonLinesResultStore {
    async fn persist(&self, subject_id: &str, metric_id: &str, result: &PersistedResult) -> Result<(), SinkError> {
        // serde_json writes non-finite floats as null, which cannot be read back
        if let Some(v) = result.values.iter().find_map(|value| match value {
            PersistedValue::Scalar(v) if !v.is_finite() => Some(*v),
            _ => None,
        }) {
            return Err(SinkError::Persistence(format!(
                "{}/{}: scalar value {} is not finite",
                subject_id, metric_id, v
            )));
        }

        let record = ResultRecord {
            subject_id: subject_id.to_string(),
            metric_id: metric_id.to_string(),
            recorded_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            result: result.clone(),
        };
        let mut line = serde_json::to_string(&record).map_err(|e| SinkError::Persistence(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SinkError::Persistence(e.to_string()))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| SinkError::Persistence(format!("{}: {}", self.path.display(), e)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| SinkError::Persistence(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| SinkError::Persistence(e.to_string()))?;

        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Keeps uploaded blobs in memory, keyed by `<bucket_path>/<uuid><extension>`.
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, Vec<u8>)> {
        lock(&self.entries).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, bytes: &[u8], extension: &str, bucket_path: &str) -> Result<String, SinkError> {
        if bytes.is_empty() {
            return Err(SinkError::EmptyPayload);
        }
        let reference = format!("{}/{}", bucket_path, blob_name(extension));
        lock(&self.entries).push((reference.clone(), bytes.to_vec()));
        Ok(reference)
    }
}

/// Keeps the latest persisted result per `(subject_id, metric_id)`.
#[derive(Default)]
pub struct MemoryResultStore {
    records: Mutex<BTreeMap<(String, String), PersistedResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subject_id: &str, metric_id: &str) -> Option<PersistedResult> {
        lock(&self.records)
            .get(&(subject_id.to_string(), metric_id.to_string()))
            .cloned()
    }

    pub fn metric_ids(&self, subject_id: &str) -> Vec<String> {
        lock(&self.records)
            .keys()
            .filter(|(subject, _)| subject == subject_id)
            .map(|(_, metric)| metric.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn persist(&self, subject_id: &str, metric_id: &str, result: &PersistedResult) -> Result<(), SinkError> {
        lock(&self.records).insert(
            (subject_id.to_string(), metric_id.to_string()),
            result.clone(),
        );
        Ok(())
    }
}
