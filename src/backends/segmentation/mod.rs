// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod xy_cut;

pub use xy_cut::XyCutSegmenter;
