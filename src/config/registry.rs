// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Metric registry: resolves metric IDs to loaded plugin instances.
//!
//! Plugins are loaded lazily on first resolution and cached per metric ID.
//! Each ID owns a `OnceCell`, so concurrent first resolutions of the same ID
//! perform exactly one load while resolutions of different IDs never wait on
//! each other. A failed load leaves the cell empty and the next resolution
//! retries.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

use crate::config::catalogue::{Catalogue, CatalogueEntry, MetricDescriptor};
use crate::errors::RegistryError;
use crate::observability::messages::registry::{
    EntryRegistered, PluginLoaded, PluginReloaded, ResolutionFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{MetricPlugin, PluginLoader};

/// A resolved metric: its descriptor plus the shared plugin instance.
#[derive(Clone)]
pub struct LoadedMetric {
    pub descriptor: Arc<MetricDescriptor>,
    pub plugin: Arc<dyn MetricPlugin>,
}

impl LoadedMetric {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }
}

impl std::fmt::Debug for LoadedMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedMetric")
            .field("id", &self.descriptor.id)
            .field("plugin", &self.plugin.name())
            .finish()
    }
}

type MetricCell = Arc<OnceCell<LoadedMetric>>;

pub struct MetricRegistry {
    catalogue: RwLock<Catalogue>,
    loader: Arc<dyn PluginLoader>,
    loaded: RwLock<HashMap<String, MetricCell>>,
}

impl MetricRegistry {
    pub fn new(catalogue: Catalogue, loader: Arc<dyn PluginLoader>) -> Self {
        Self {
            catalogue: RwLock::new(catalogue),
            loader,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a metric ID to its descriptor and plugin, loading it on first use.
    pub async fn resolve(&self, metric_id: &str) -> Result<LoadedMetric, RegistryError> {
        // Lookup and cell creation share the catalogue guard so a concurrent
        // `register_entry` either precedes both or evicts the cell afterwards.
        let (entry, cell) = {
            let catalogue = self.catalogue.read().await;
            let entry = match catalogue.lookup(metric_id) {
                Ok(entry) => entry.clone(),
                Err(e) => {
                    ResolutionFailed { metric_id, error: &e }.log();
                    return Err(e);
                }
            };
            (entry, self.cell_for(metric_id).await)
        };

        let loaded = cell
            .get_or_try_init(|| self.load(&entry))
            .await
            .map_err(|e| {
                ResolutionFailed { metric_id, error: &e }.log();
                e
            })?;

        Ok(loaded.clone())
    }

    /// Load a fresh plugin for `metric_id` and swap it into the cache.
    ///
    /// Runs already holding the previous instance keep using it. The catalogue
    /// stays read-locked until the swap, so a replacement entry registered
    /// meanwhile is applied after it.
    pub async fn reload(&self, metric_id: &str) -> Result<LoadedMetric, RegistryError> {
        let catalogue = self.catalogue.read().await;
        let entry = catalogue.lookup(metric_id)?.clone();
        let fresh = self.load(&entry).await?;

        let cell = Arc::new(OnceCell::new_with(Some(fresh.clone())));
        self.loaded.write().await.insert(metric_id.to_string(), cell);
        drop(catalogue);

        PluginReloaded {
            metric_id,
            artifact: &entry.artifact,
        }
        .log();

        Ok(fresh)
    }

    /// Add a catalogue entry, replacing any entry for the same metric ID.
    ///
    /// A replaced entry's cached plugin is dropped; the next resolution loads
    /// from the new artifact.
    pub async fn register_entry(&self, entry: CatalogueEntry) {
        let metric_id = entry.descriptor.id.clone();
        let artifact = entry.artifact.clone();

        let replaced = {
            let mut catalogue = self.catalogue.write().await;
            let replaced = catalogue.upsert(entry).is_some();
            self.loaded.write().await.remove(&metric_id);
            replaced
        };

        EntryRegistered {
            metric_id: &metric_id,
            artifact: &artifact,
            replaced,
        }
        .log();
    }

    /// Descriptors of every catalogue entry, in catalogue order.
    pub async fn descriptors(&self) -> Vec<Arc<MetricDescriptor>> {
        self.catalogue
            .read()
            .await
            .entries()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// True when a plugin instance is cached for `metric_id`.
    pub async fn is_loaded(&self, metric_id: &str) -> bool {
        self.loaded
            .read()
            .await
            .get(metric_id)
            .map(|cell| cell.initialized())
            .unwrap_or(false)
    }

    async fn cell_for(&self, metric_id: &str) -> MetricCell {
        if let Some(cell) = self.loaded.read().await.get(metric_id) {
            return cell.clone();
        }

        self.loaded
            .write()
            .await
            .entry(metric_id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    async fn load(&self, entry: &CatalogueEntry) -> Result<LoadedMetric, RegistryError> {
        let plugin = self.loader.load(entry).await?;

        PluginLoaded {
            metric_id: &entry.descriptor.id,
            artifact: &entry.artifact,
            implementation: plugin.name(),
        }
        .log();

        Ok(LoadedMetric {
            descriptor: entry.descriptor.clone(),
            plugin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{stub_entry, CountingLoader, GatedLoader};
    use crate::config::PreprocessingRequirements;

    fn registry_with(loader: Arc<CountingLoader>, ids: &[(&str, &str)]) -> MetricRegistry {
        let entries = ids
            .iter()
            .map(|(id, name)| stub_entry(id, name, PreprocessingRequirements::default()))
            .collect();
        MetricRegistry::new(Catalogue::new(entries), loader)
    }

    #[tokio::test]
    async fn test_resolve_caches_plugin() {
        let loader = Arc::new(CountingLoader::new());
        let registry = registry_with(loader.clone(), &[("m1", "png_file_size")]);

        let first = registry.resolve("m1").await.unwrap();
        let second = registry.resolve("m1").await.unwrap();

        assert_eq!(loader.load_count(), 1);
        assert!(Arc::ptr_eq(&first.plugin, &second.plugin));
        assert_eq!(first.id(), "m1");
        assert!(registry.is_loaded("m1").await);
    }

    #[tokio::test]
    async fn test_concurrent_first_resolution_loads_once() {
        let loader = Arc::new(CountingLoader::new());
        let registry = Arc::new(registry_with(loader.clone(), &[("m1", "png_file_size")]));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.resolve("m1").await }));
        }

        let mut plugins = Vec::new();
        for handle in handles {
            plugins.push(handle.await.unwrap().unwrap().plugin);
        }

        assert_eq!(loader.load_count(), 1);
        assert!(plugins.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn test_resolve_unknown_id() {
        let loader = Arc::new(CountingLoader::new());
        let registry = registry_with(loader.clone(), &[("m1", "png_file_size")]);

        let result = registry.resolve("m404").await;
        assert!(matches!(result, Err(RegistryError::NotFound { metric_id }) if metric_id == "m404"));
        assert_eq!(loader.load_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let loader = Arc::new(CountingLoader::new().failing_on("m2"));
        let registry = registry_with(loader.clone(), &[("m2", "jpeg_file_size")]);

        assert!(matches!(
            registry.resolve("m2").await,
            Err(RegistryError::LoadFailed { .. })
        ));
        assert!(!registry.is_loaded("m2").await);
        assert!(registry.resolve("m2").await.is_err());
        assert_eq!(loader.load_count(), 2);
    }

    #[tokio::test]
    async fn test_reload_swaps_instance() {
        let loader = Arc::new(CountingLoader::new());
        let registry = registry_with(loader.clone(), &[("m1", "png_file_size")]);

        let before = registry.resolve("m1").await.unwrap();
        let reloaded = registry.reload("m1").await.unwrap();
        let after = registry.resolve("m1").await.unwrap();

        assert_eq!(loader.load_count(), 2);
        assert!(!Arc::ptr_eq(&before.plugin, &reloaded.plugin));
        assert!(Arc::ptr_eq(&reloaded.plugin, &after.plugin));
    }

    #[tokio::test]
    async fn test_register_entry_makes_metric_resolvable() {
        let loader = Arc::new(CountingLoader::new());
        let registry = registry_with(loader.clone(), &[]);

        assert!(registry.resolve("m7").await.is_err());

        registry
            .register_entry(stub_entry("m7", "contrast", PreprocessingRequirements::default()))
            .await;

        let loaded = registry.resolve("m7").await.unwrap();
        assert_eq!(loaded.descriptor.name, "contrast");
        assert_eq!(registry.descriptors().await.len(), 1);
    }

    #[tokio::test]
    async fn test_register_entry_replaces_cached_plugin() {
        let loader = Arc::new(CountingLoader::new());
        let registry = registry_with(loader.clone(), &[("m1", "png_file_size")]);

        registry.resolve("m1").await.unwrap();
        registry
            .register_entry(stub_entry("m1", "png_size", PreprocessingRequirements::default()))
            .await;
        assert!(!registry.is_loaded("m1").await);

        let loaded = registry.resolve("m1").await.unwrap();
        assert_eq!(loaded.descriptor.name, "png_size");
        assert_eq!(loader.load_count(), 2);
    }

    async fn wait_for_load_start(loader: &GatedLoader) {
        while loader.started() == 0 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_register_entry_during_reload_wins() {
        let loader = Arc::new(GatedLoader::new());
        let entries = vec![stub_entry("m1", "png_file_size", PreprocessingRequirements::default())];
        let registry = Arc::new(MetricRegistry::new(Catalogue::new(entries), loader.clone()));

        let reloading = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.reload("m1").await })
        };
        wait_for_load_start(&loader).await;

        let registering = {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .register_entry(stub_entry("m1", "png_size", PreprocessingRequirements::default()))
                    .await
            })
        };
        tokio::task::yield_now().await;

        loader.release(2);
        let reloaded = reloading.await.unwrap().unwrap();
        registering.await.unwrap();

        assert_eq!(reloaded.descriptor.name, "png_file_size");
        let current = registry.resolve("m1").await.unwrap();
        assert_eq!(current.descriptor.name, "png_size");
    }

    #[tokio::test]
    async fn test_register_entry_during_first_load_is_not_shadowed() {
        let loader = Arc::new(GatedLoader::new());
        let entries = vec![stub_entry("m1", "png_file_size", PreprocessingRequirements::default())];
        let registry = Arc::new(MetricRegistry::new(Catalogue::new(entries), loader.clone()));

        let resolving = {
            let registry = registry.clone();
            tokio::spawn(async move { registry.resolve("m1").await })
        };
        wait_for_load_start(&loader).await;

        registry
            .register_entry(stub_entry("m1", "png_size", PreprocessingRequirements::default()))
            .await;

        loader.release(2);
        let first = resolving.await.unwrap().unwrap();
        let second = registry.resolve("m1").await.unwrap();

        assert_eq!(first.descriptor.name, "png_file_size");
        assert_eq!(second.descriptor.name, "png_size");
    }
}
