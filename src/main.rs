// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use image::ImageFormat;
use std::env;
use std::time::Instant;
use wui_evaluator::config::{load_and_validate_config, RuntimeBuilder};
use wui_evaluator::engine::{EvaluationRequest, MetricOutcome};
use wui_evaluator::observability::init_tracing;
use wui_evaluator::traits::{MetricValue, PersistedValue};

const USAGE: &str =
    "Usage: wui-evaluator <config.yaml> <image> [--url URL] [--html FILE] [--subject ID] <metric-id>...";

/// Parsed command line
struct Invocation {
    config_file: String,
    image_file: String,
    source_url: Option<String>,
    html_file: Option<String>,
    subject_id: Option<String>,
    metric_ids: Vec<String>,
}

fn parse_args(args: &[String]) -> anyhow::Result<Invocation> {
    let mut positional = Vec::new();
    let mut source_url = None;
    let mut html_file = None;
    let mut subject_id = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{} expects a value", flag))
        };
        match arg.as_str() {
            "--url" => source_url = Some(value("--url")?),
            "--html" => html_file = Some(value("--html")?),
            "--subject" => subject_id = Some(value("--subject")?),
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown option '{}'\n{}", flag, USAGE),
            _ => positional.push(arg.clone()),
        }
    }

    if positional.len() < 3 {
        bail!(USAGE);
    }
    let mut positional = positional.into_iter();
    let config_file = positional.next().unwrap_or_default();
    let image_file = positional.next().unwrap_or_default();

    Ok(Invocation {
        config_file,
        image_file,
        source_url,
        html_file,
        subject_id,
        metric_ids: positional.collect(),
    })
}

fn describe_value(value: &MetricValue) -> String {
    const PREVIEW_CHARS: usize = 60;
    match value {
        MetricValue::Scalar(v) => format!("{:.4}", v),
        MetricValue::Text(t) if t.chars().count() > PREVIEW_CHARS => {
            let preview: String = t.chars().take(PREVIEW_CHARS).collect();
            format!("\"{}…\" ({} chars)", preview, t.chars().count())
        }
        MetricValue::Text(t) => format!("\"{}\"", t),
        MetricValue::BinaryImage(bytes) => format!("<image, {} bytes>", bytes.len()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let invocation = parse_args(&args)?;
    let start_time = Instant::now();

    // Load configuration
    let config = load_and_validate_config(&invocation.config_file)
        .with_context(|| format!("failed to load {}", invocation.config_file))?;
    let pipeline = RuntimeBuilder::from_config(&config)?;

    // Load subject
    let bytes = std::fs::read(&invocation.image_file)
        .with_context(|| format!("failed to read {}", invocation.image_file))?;
    let raster = image::load_from_memory(&bytes)
        .with_context(|| format!("failed to decode {}", invocation.image_file))?
        .to_rgb8();

    let subject_id = invocation
        .subject_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut request = EvaluationRequest::new(subject_id, raster, invocation.metric_ids.clone());
    if image::guess_format(&bytes).ok() == Some(ImageFormat::Png) {
        request = request.with_encoded(bytes);
    }
    if let Some(url) = &invocation.source_url {
        request = request.with_source_url(url.clone());
    }
    if let Some(html_file) = &invocation.html_file {
        let markup = std::fs::read_to_string(html_file)
            .with_context(|| format!("failed to read {}", html_file))?;
        request = request.with_markup(markup);
    }

    println!("🖼️  WUI Evaluation");
    println!("═══════════════════════════════════");
    println!("📋 Configuration: {}", invocation.config_file);
    println!("🆔 Subject: {}", request.subject_id);
    println!("📐 Image: {} ({}x{})", invocation.image_file, request.raster.width(), request.raster.height());
    println!("⚙️  Max Concurrency: {}", config.executor.resolved_max_concurrency());
    println!();

    // Evaluate
    let execution_start = Instant::now();
    let report = pipeline.run(request).await;
    let execution_time = execution_start.elapsed();

    println!("📊 Evaluation Results:");
    println!("⏱️  Execution Time: {:?}", execution_time);
    println!("✅ Succeeded: {}   ❌ Failed: {}", report.succeeded(), report.failed());
    println!();

    for outcome in &report.outcomes {
        match outcome.as_ref() {
            MetricOutcome::Success { metric_id, values } => {
                println!("  ✅ {}", metric_id);
                for value in values {
                    println!("       • {}", describe_value(value));
                }
            }
            MetricOutcome::Failure(failure) => {
                println!("  ❌ {} [{}] {}", failure.metric_id, failure.kind, failure.message);
            }
        }
    }

    // Storage runs detached from the evaluation; wait so the process does not exit early
    println!("\n💾 Storage:");
    for receipt in report.storage.wait().await {
        match receipt.result {
            Ok(persisted) => {
                let references: Vec<&str> = persisted
                    .values
                    .iter()
                    .filter_map(|v| match v {
                        PersistedValue::BlobRef(reference) => Some(reference.as_str()),
                        _ => None,
                    })
                    .collect();
                if references.is_empty() {
                    println!("  • {} stored", receipt.metric_id);
                } else {
                    println!("  • {} stored, images: {}", receipt.metric_id, references.join(", "));
                }
            }
            Err(e) => println!("  ⚠️  {} not stored: {}", receipt.metric_id, e),
        }
    }

    println!("\n⏱️  Total Time (including config load): {:?}", start_time.elapsed());

    Ok(())
}
