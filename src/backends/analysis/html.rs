// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! HTML structural analysis.
//!
//! Markup is parsed with `scraper` on the blocking pool. The URL path fetches
//! the page body with `reqwest` first and then runs the same parse.

use async_trait::async_trait;
use scraper::{ElementRef, Html, Node};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::consts::{DEFAULT_FETCH_TIMEOUT_SECONDS, DEFAULT_USER_AGENT};
use crate::errors::LoadError;
use crate::traits::{ElementSummary, StructuralAnalysis, StructuralAnalyzer};

/// Text inside these elements is never rendered.
const INVISIBLE_TEXT_PARENTS: [&str; 5] = ["style", "script", "head", "title", "meta"];

pub struct HtmlStructuralAnalyzer {
    client: reqwest::Client,
}

impl HtmlStructuralAnalyzer {
    pub fn new(fetch_timeout: Duration, user_agent: &str) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| LoadError::Markup(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_defaults() -> Result<Self, LoadError> {
        Self::new(
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECONDS),
            DEFAULT_USER_AGENT,
        )
    }

    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        let fetch_error = |reason: String| LoadError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| fetch_error(e.to_string()))?;

        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}

#[async_trait]
impl StructuralAnalyzer for HtmlStructuralAnalyzer {
    async fn analyze_url(&self, url: &str) -> Result<StructuralAnalysis, LoadError> {
        tracing::debug!(url = %url, "Fetching markup for structural analysis");
        let markup = self.fetch(url).await?;
        self.analyze_markup(&markup).await
    }

    async fn analyze_markup(&self, markup: &str) -> Result<StructuralAnalysis, LoadError> {
        let markup = markup.to_string();
        tokio::task::spawn_blocking(move || analyze(&markup))
            .await
            .map_err(|e| LoadError::Markup(e.to_string()))
    }
}

/// Parse `markup` and extract its visible text and element structure.
pub fn analyze(markup: &str) -> StructuralAnalysis {
    let document = Html::parse_document(markup);
    let root = document.root_element();

    StructuralAnalysis {
        text: visible_text(&document),
        elements: root.descendants().filter_map(ElementRef::wrap).map(summarize).collect(),
    }
}

fn visible_text(document: &Html) -> String {
    let mut pieces = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|element| INVISIBLE_TEXT_PARENTS.contains(&element.name()))
                .unwrap_or(false)
        });

        let trimmed = text.trim();
        if !hidden && !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    pieces.join(" ")
}

fn summarize(element: ElementRef<'_>) -> ElementSummary {
    ElementSummary {
        tag: element.value().name().to_string(),
        attributes: element
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<BTreeMap<_, _>>(),
        child_tags: element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|child| child.value().name().to_string())
            .collect(),
    }
}
