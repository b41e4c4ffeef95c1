//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    dataset: DatasetInfo,
    format: FormatInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    windowing: WindowingInfo,
    workers: usize,
}

#[derive(Serialize)]
struct DatasetInfo {
    input_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<String>,
    extension: String,
}

#[derive(Serialize)]
struct FormatInfo {
    comment_marker: char,
    delimiter: char,
}

#[derive(Serialize)]
struct WindowingInfo {
    window_length: usize,
    channels: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    strides: BTreeMap<String, StrideInfo>,
}

#[derive(Serialize)]
struct StrideInfo {
    stride: i64,
    /// Fraction of each window shared with the next one
    overlap: f64,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn overlap(window_length: usize, stride: i64) -> f64 {
    let l = window_length as f64;
    ((l - stride as f64) / l).max(0.0)
}

fn build_config_info(blueprint: &PipelineBlueprint, args: &InfoArgs) -> ConfigInfo {
    let windowing = &blueprint.windowing;
    let strides = if args.strides {
        windowing
            .strides
            .iter()
            .map(|(label, &stride)| {
                (
                    label.clone(),
                    StrideInfo {
                        stride,
                        overlap: overlap(windowing.window_length, stride),
                    },
                )
            })
            .collect()
    } else {
        BTreeMap::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        dataset: DatasetInfo {
            input_dir: blueprint.dataset.input_dir.display().to_string(),
            output_dir: blueprint
                .dataset
                .output_dir
                .as_ref()
                .map(|p| p.display().to_string()),
            extension: blueprint.dataset.extension.clone(),
        },
        format: FormatInfo {
            comment_marker: blueprint.format.comment_marker,
            delimiter: blueprint.format.delimiter,
        },
        location: blueprint.location.label.clone(),
        windowing: WindowingInfo {
            window_length: windowing.window_length,
            channels: windowing.channels,
            strides,
        },
        workers: blueprint.batch.workers,
    }
}

fn print_config_info(blueprint: &PipelineBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  fallprep Configuration                      ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let dataset = &blueprint.dataset;
    println!("📁 Dataset");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Input: {}", dataset.input_dir.display());
    match &dataset.output_dir {
        Some(dir) => println!("   ├─ Output: {}", dir.display()),
        None => println!("   ├─ Output: (not set)"),
    }
    println!("   └─ Extension: .{}", dataset.extension);

    println!("\n📄 Format");
    println!("   ├─ Comment marker: '{}'", blueprint.format.comment_marker);
    println!("   └─ Delimiter: '{}'", blueprint.format.delimiter);

    println!("\n📍 Location");
    match blueprint.location_label() {
        Some(label) => println!("   └─ {}", label),
        None => println!("   └─ (all devices)"),
    }

    let windowing = &blueprint.windowing;
    println!("\n🪟 Windowing");
    println!("   ├─ Window length: {}", windowing.window_length);
    println!("   ├─ Channels: {}", windowing.channels);
    if args.strides {
        println!("   └─ Strides ({}):", windowing.strides.len());
        let last = windowing.strides.len().saturating_sub(1);
        for (i, (label, &stride)) in windowing.strides.iter().enumerate() {
            let prefix = if i == last { "└─" } else { "├─" };
            println!(
                "      {} label {}: stride {} ({:.0}% overlap)",
                prefix,
                label,
                stride,
                overlap(windowing.window_length, stride) * 100.0
            );
        }
    } else {
        println!("   └─ {} label strides", windowing.strides.len());
    }

    println!("\n⚙️  Batch");
    println!("   └─ Workers: {}", blueprint.batch.workers);

    println!();
}
