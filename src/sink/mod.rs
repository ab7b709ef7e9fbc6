// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod result_sink;
mod stores;

pub use result_sink::ResultSink;
pub use stores::{
    FsBlobStore, JsonLinesResultStore, MemoryBlobStore, MemoryResultStore, ResultRecord,
};
