// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod catalogue;
mod loader;
mod registry;
mod runtime;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use catalogue::{
    AcceptedInput, Catalogue, CatalogueEntry, MetricDescriptor, MetricManifestEntry,
    PreprocessingRequirements, ResultDefinition,
};
pub use loader::{
    load_and_validate_config, load_config, parse_config, Config, ExecutorOptions,
    PreprocessingOptions, StorageOptions, StructuralAnalysisOptions,
};
pub use registry::{LoadedMetric, MetricRegistry};
pub use runtime::RuntimeBuilder;
pub use validation::validate_catalogue;
