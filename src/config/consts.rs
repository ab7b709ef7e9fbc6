/// Default quality for the lossy (JPEG) re-encode stage
pub const DEFAULT_JPEG_QUALITY: u8 = 80;
/// Minimum accepted JPEG quality
pub const MIN_JPEG_QUALITY: u8 = 1;
/// Maximum accepted JPEG quality
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Default timeout for fetching a source URL during structural analysis
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 30;
/// User agent sent when fetching a source URL
pub const DEFAULT_USER_AGENT: &str = concat!("wui-evaluator/", env!("CARGO_PKG_VERSION"));

/// Directory the filesystem blob store writes into
pub const DEFAULT_BLOB_DIR: &str = "blobs";
/// Folder inside the blob store for metric result images
pub const DEFAULT_BUCKET_PATH: &str = "results";
/// JSON-lines file the result store appends to
pub const DEFAULT_RESULTS_FILE: &str = "results.jsonl";

/// Separates the metric ID from its human-readable name in artifact names
pub const ARTIFACT_SEPARATOR: char = '_';

/// Minimum run of empty rows or columns that separates two regions
pub const DEFAULT_SEGMENT_MIN_GAP: u32 = 8;
/// Per-channel distance from the background color that counts as content
pub const DEFAULT_SEGMENT_COLOR_TOLERANCE: u8 = 24;
/// Regions smaller than this in either dimension are discarded
pub const DEFAULT_SEGMENT_MIN_SIZE: u32 = 4;
