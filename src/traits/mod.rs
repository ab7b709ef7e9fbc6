pub mod collaborators;
pub mod metric;
pub mod submitter;

pub use collaborators::{
    BlobStore, BoundingBox, Diagnostic, ElementSummary, ImageShape, PersistedResult, PersistedValue,
    ResultStore, SegmentElement, SegmentationResult, Segmenter, StructuralAnalysis, StructuralAnalyzer,
};
pub use metric::{MetricContext, MetricPlugin, MetricValue, PluginLoader, ValueKind};
pub use submitter::{SubmissionTicket, TaskSubmitter};
