// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::MetricError;
use crate::traits::{MetricContext, MetricPlugin, MetricValue};

/// Number of words in the page's visible text.
pub struct WordCountMetric {
    id: String,
}

impl WordCountMetric {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl MetricPlugin for WordCountMetric {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &'static str {
        "word_count"
    }

    async fn execute(&self, ctx: &MetricContext) -> Result<Vec<MetricValue>, MetricError> {
        let structure = ctx
            .structure()
            .ok_or(MetricError::MissingInput("structural analysis"))?;
        Ok(vec![MetricValue::Scalar(word_count(&structure.text) as f64)])
    }
}

/// A word is a whitespace-delimited token with at least one word character.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|token| token.chars().any(|c| c.is_alphanumeric() || c == '_'))
        .count()
}
