// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test doubles for the engine, registry and preprocessing collaborators.

use async_trait::async_trait;
use image::RgbImage;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::{CatalogueEntry, LoadedMetric, MetricDescriptor, PreprocessingRequirements};
use crate::engine::inference::{InferenceProvider, InferenceSession};
use crate::engine::{PreprocessingBundle, Stage};
use crate::errors::{InferenceError, LoadError, MetricError, RegistryError, SegmentationError};
use crate::traits::{
    BoundingBox, ElementSummary, ImageShape, MetricContext, MetricPlugin, MetricValue,
    PluginLoader, SegmentElement, SegmentationResult, Segmenter, StructuralAnalysis,
    StructuralAnalyzer,
};

/// Shared, ordered record of side effects observed by the doubles.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == event).count()
    }

    /// Position of the first occurrence of `event`.
    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().unwrap().iter().position(|e| e == event)
    }
}

pub fn requirements(stages: &[Stage]) -> PreprocessingRequirements {
    PreprocessingRequirements {
        requires_grayscale: stages.contains(&Stage::Grayscale),
        requires_lossy_reencode: stages.contains(&Stage::LossyReencode),
        requires_color_space_conversion: stages.contains(&Stage::ColorSpaceConversion),
        requires_structural_analysis: stages.contains(&Stage::StructuralAnalysis),
        requires_segmentation: stages.contains(&Stage::Segmentation),
    }
}

pub fn stub_entry(id: &str, name: &str, reqs: PreprocessingRequirements) -> CatalogueEntry {
    CatalogueEntry::new(MetricDescriptor::new(id, name).with_preprocessing(reqs), name)
}

pub fn loaded_with(id: &str, reqs: PreprocessingRequirements, plugin: Arc<dyn MetricPlugin>) -> LoadedMetric {
    LoadedMetric {
        descriptor: Arc::new(MetricDescriptor::new(id, "stub").with_preprocessing(reqs)),
        plugin,
    }
}

pub fn stub_loaded(id: &str, reqs: PreprocessingRequirements) -> LoadedMetric {
    loaded_with(id, reqs, Arc::new(StaticPlugin::scalar(id, 0.0)))
}

pub fn context_for(bundle: PreprocessingBundle) -> MetricContext {
    MetricContext::new(Arc::from("subject"), None, Arc::new(bundle), None)
}

pub fn stub_context() -> MetricContext {
    context_for(PreprocessingBundle::new(RgbImage::new(1, 1)))
}

/// Returns fixed values.
pub struct StaticPlugin {
    id: String,
    values: Vec<MetricValue>,
}

impl StaticPlugin {
    pub fn new(id: &str, values: Vec<MetricValue>) -> Self {
        Self {
            id: id.to_string(),
            values,
        }
    }

    pub fn scalar(id: &str, value: f64) -> Self {
        Self::new(id, vec![MetricValue::Scalar(value)])
    }
}

#[async_trait]
impl MetricPlugin for StaticPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "static"
    }

    async fn execute(&self, _ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        Ok(self.values.clone())
    }
}

/// Always returns an error.
pub struct FailingPlugin {
    id: String,
    message: String,
}

impl FailingPlugin {
    pub fn new(id: &str, message: &str) -> Self {
        Self {
            id: id.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl MetricPlugin for FailingPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "failing"
    }

    async fn execute(&self, _ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        Err(MetricError::failed(self.message.clone()))
    }
}

/// Panics with `"<id> crashed"`.
pub struct CrashingPlugin {
    id: String,
}

impl CrashingPlugin {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl MetricPlugin for CrashingPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "crashing"
    }

    async fn execute(&self, _ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        panic!("{} crashed", self.id);
    }
}

/// Sleeps before returning a scalar.
pub struct SlowPlugin {
    id: String,
    delay: Duration,
}

impl SlowPlugin {
    pub fn new(id: &str, delay: Duration) -> Self {
        Self {
            id: id.to_string(),
            delay,
        }
    }
}

#[async_trait]
impl MetricPlugin for SlowPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "slow"
    }

    async fn execute(&self, _ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![MetricValue::Scalar(1.0)])
    }
}

/// Blocks its thread for `duration` without yielding to the runtime.
pub struct BusyPlugin {
    id: String,
    duration: Duration,
}

impl BusyPlugin {
    pub fn new(id: &str, duration: Duration) -> Self {
        Self {
            id: id.to_string(),
            duration,
        }
    }
}

#[async_trait]
impl MetricPlugin for BusyPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "busy"
    }

    async fn execute(&self, _ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        std::thread::sleep(self.duration);
        Ok(vec![MetricValue::Scalar(1.0)])
    }
}

/// Tracks how many plugins sharing it execute at the same time.
#[derive(Clone)]
pub struct ConcurrencyProbe {
    delay: Duration,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    pub fn for_id(&self, id: &str) -> ConcurrencyProbePlugin {
        ConcurrencyProbePlugin {
            id: id.to_string(),
            probe: self.clone(),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct ConcurrencyProbePlugin {
    id: String,
    probe: ConcurrencyProbe,
}

impl ConcurrencyProbePlugin {
    pub fn shared(delay: Duration) -> ConcurrencyProbe {
        ConcurrencyProbe {
            delay,
            active: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl MetricPlugin for ConcurrencyProbePlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "concurrency_probe"
    }

    async fn execute(&self, _ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        let now = self.probe.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.probe.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.probe.delay).await;
        self.probe.active.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![MetricValue::Scalar(now as f64)])
    }
}

/// Records `metric:<id>` when executed and reports which bundle fields it saw.
pub struct RecordingPlugin {
    id: String,
    log: EventLog,
}

impl RecordingPlugin {
    pub fn new(id: &str, log: EventLog) -> Self {
        Self {
            id: id.to_string(),
            log,
        }
    }
}

#[async_trait]
impl MetricPlugin for RecordingPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "recording"
    }

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        self.log.push(format!("metric:{}", self.id));

        let mut seen = Vec::new();
        if ctx.lossless_bytes().is_some() {
            seen.push("lossless");
        }
        if ctx.grayscale().is_some() {
            seen.push("grayscale");
        }
        if ctx.lossy_bytes().is_some() {
            seen.push("lossy");
        }
        if ctx.color_space().is_some() {
            seen.push("color_space");
        }
        if ctx.structure().is_some() {
            seen.push("structure");
        }
        if ctx.segmentation().is_some() {
            seen.push("segmentation");
        }
        Ok(vec![MetricValue::Text(seen.join(","))])
    }
}

/// Loads `StaticPlugin`s, counting loads. A fresh instance is built per load.
#[derive(Default)]
pub struct CountingLoader {
    loads: AtomicUsize,
    failing: HashSet<String>,
}

impl CountingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, metric_id: &str) -> Self {
        self.failing.insert(metric_id.to_string());
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginLoader for CountingLoader {
    async fn load(&self, entry: &CatalogueEntry) -> Result<Arc<dyn MetricPlugin>, RegistryError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.failing.contains(&entry.descriptor.id) {
            return Err(RegistryError::LoadFailed {
                artifact: entry.artifact.clone(),
                reason: "stub load failure".to_string(),
            });
        }
        Ok(Arc::new(StaticPlugin::scalar(&entry.descriptor.id, 1.0)))
    }
}

/// Holds every load until `release` hands out permits.
pub struct GatedLoader {
    gate: Semaphore,
    started: AtomicUsize,
}

impl GatedLoader {
    pub fn new() -> Self {
        Self {
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
        }
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn release(&self, loads: usize) {
        self.gate.add_permits(loads);
    }
}

#[async_trait]
impl PluginLoader for GatedLoader {
    async fn load(&self, entry: &CatalogueEntry) -> Result<Arc<dyn MetricPlugin>, RegistryError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self.gate.acquire().await.map_err(|e| RegistryError::LoadFailed {
            artifact: entry.artifact.clone(),
            reason: e.to_string(),
        })?;
        permit.forget();
        Ok(Arc::new(StaticPlugin::scalar(&entry.descriptor.id, 1.0)))
    }
}

/// Loads plugins from a fixed table keyed by metric ID.
#[derive(Default)]
pub struct TableLoader {
    plugins: BTreeMap<String, Arc<dyn MetricPlugin>>,
}

impl TableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, plugin: Arc<dyn MetricPlugin>) -> Self {
        self.plugins.insert(plugin.id().to_string(), plugin);
        self
    }
}

#[async_trait]
impl PluginLoader for TableLoader {
    async fn load(&self, entry: &CatalogueEntry) -> Result<Arc<dyn MetricPlugin>, RegistryError> {
        self.plugins
            .get(&entry.descriptor.id)
            .cloned()
            .ok_or_else(|| RegistryError::LoadFailed {
                artifact: entry.artifact.clone(),
                reason: "no plugin in table".to_string(),
            })
    }
}

/// Returns a fixed analysis and records `structural_analysis` per call.
pub struct CountingAnalyzer {
    log: EventLog,
    url_calls: AtomicUsize,
    markup_calls: AtomicUsize,
}

impl CountingAnalyzer {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            url_calls: AtomicUsize::new(0),
            markup_calls: AtomicUsize::new(0),
        }
    }

    pub fn url_calls(&self) -> usize {
        self.url_calls.load(Ordering::SeqCst)
    }

    pub fn markup_calls(&self) -> usize {
        self.markup_calls.load(Ordering::SeqCst)
    }

    fn analysis(source: &str) -> StructuralAnalysis {
        StructuralAnalysis {
            text: format!("analyzed {}", source),
            elements: vec![ElementSummary {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
                child_tags: vec![],
            }],
        }
    }
}

#[async_trait]
impl StructuralAnalyzer for CountingAnalyzer {
    async fn analyze_url(&self, _url: &str) -> Result<StructuralAnalysis, LoadError> {
        self.url_calls.fetch_add(1, Ordering::SeqCst);
        self.log.push("structural_analysis");
        Ok(Self::analysis("url"))
    }

    async fn analyze_markup(&self, _markup: &str) -> Result<StructuralAnalysis, LoadError> {
        self.markup_calls.fetch_add(1, Ordering::SeqCst);
        self.log.push("structural_analysis");
        Ok(Self::analysis("markup"))
    }
}

pub struct FailingAnalyzer;

#[async_trait]
impl StructuralAnalyzer for FailingAnalyzer {
    async fn analyze_url(&self, url: &str) -> Result<StructuralAnalysis, LoadError> {
        Err(LoadError::Fetch {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }

    async fn analyze_markup(&self, _markup: &str) -> Result<StructuralAnalysis, LoadError> {
        Err(LoadError::Markup("unparseable".to_string()))
    }
}

/// One full-image element with a small non-empty overlay; records `segmentation`.
pub struct CountingSegmenter {
    log: EventLog,
    calls: AtomicUsize,
}

impl CountingSegmenter {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Segmenter for CountingSegmenter {
    async fn segment(&self, raster: Arc<RgbImage>) -> Result<SegmentationResult, SegmentationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.push("segmentation");

        let (width, height) = raster.dimensions();
        Ok(SegmentationResult {
            image_shape: ImageShape {
                height,
                width,
                channels: 3,
            },
            elements: vec![SegmentElement {
                position: BoundingBox {
                    row_min: 0,
                    row_max: height / 2,
                    column_min: 0,
                    column_max: width,
                },
                class: "Block".to_string(),
                extra: Default::default(),
            }],
            rendered_overlay: vec![0x89, b'P', b'N', b'G'],
        })
    }
}

pub struct FailingSegmenter;

#[async_trait]
impl Segmenter for FailingSegmenter {
    async fn segment(&self, _raster: Arc<RgbImage>) -> Result<SegmentationResult, SegmentationError> {
        Err(SegmentationError("model unavailable".to_string()))
    }
}

/// Hands out up to `capacity` concurrent sessions.
pub struct CountingInferenceProvider {
    capacity: usize,
    outstanding: AtomicUsize,
    released: AtomicUsize,
    next_handle: AtomicUsize,
}

impl CountingInferenceProvider {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            outstanding: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            next_handle: AtomicUsize::new(1),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl InferenceProvider for CountingInferenceProvider {
    fn acquire(&self, model: &str) -> Result<InferenceSession, InferenceError> {
        let reserved = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.capacity).then_some(n + 1)
            });
        if reserved.is_err() {
            return Err(InferenceError::Exhausted(model.to_string()));
        }

        Ok(InferenceSession {
            model: model.to_string(),
            handle: self.next_handle.fetch_add(1, Ordering::SeqCst) as u64,
        })
    }

    fn release(&self, _session: InferenceSession) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
