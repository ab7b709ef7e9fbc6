// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // built-in metrics and collaborators
pub mod config;     // config, catalogue + registry
pub mod engine;     // resolver, preprocessing, evaluation
pub mod errors;     // error handling
pub mod observability;
pub mod sink;       // result sink + stores
pub mod traits;     // plugin and collaborator seams
