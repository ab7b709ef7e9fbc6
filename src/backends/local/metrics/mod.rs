// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod colorfulness;
pub mod jpeg_file_size;
pub mod lab_statistics;
pub mod png_file_size;
pub mod segmentation_overlay;
pub mod shannon_entropy;
pub mod white_space;
pub mod word_count;

pub use colorfulness::ColorfulnessMetric;
pub use jpeg_file_size::JpegFileSizeMetric;
pub use lab_statistics::LabStatisticsMetric;
pub use png_file_size::PngFileSizeMetric;
pub use segmentation_overlay::SegmentationOverlayMetric;
pub use shannon_entropy::ShannonEntropyMetric;
pub use white_space::WhiteSpaceMetric;
pub use word_count::WordCountMetric;
