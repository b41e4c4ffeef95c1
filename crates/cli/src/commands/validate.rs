//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::PipelineBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    input_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    window_length: usize,
    stride_count: usize,
    workers: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    input_dir: blueprint.dataset.input_dir.display().to_string(),
                    output_dir: blueprint
                        .dataset
                        .output_dir
                        .as_ref()
                        .map(|p| p.display().to_string()),
                    location: blueprint.location.label.clone(),
                    window_length: blueprint.windowing.window_length,
                    stride_count: blueprint.windowing.strides.len(),
                    workers: blueprint.batch.workers,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &PipelineBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.location_label().is_none() {
        warnings.push(
            "location.label is not set - `align` needs --location, audits will cover all devices"
                .to_string(),
        );
    }

    if blueprint.dataset.output_dir.is_none() {
        warnings.push("dataset.output_dir is not set - `align` needs --output".to_string());
    }

    if !blueprint.dataset.input_dir.is_dir() {
        warnings.push(format!(
            "dataset.input_dir '{}' does not exist",
            blueprint.dataset.input_dir.display()
        ));
    }

    let window_length = blueprint.windowing.window_length as i64;
    for (label, stride) in &blueprint.windowing.strides {
        if *stride > window_length {
            warnings.push(format!(
                "stride {stride} for label {label} exceeds window_length {window_length} - samples will be dropped between windows"
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Input: {}", summary.input_dir);
            println!(
                "  Output: {}",
                summary.output_dir.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  Location: {}",
                summary.location.as_deref().unwrap_or("(not set)")
            );
            println!("  Window length: {}", summary.window_length);
            println!("  Strides: {}", summary.stride_count);
            println!("  Workers: {}", summary.workers);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: PathBuf::from("/no/such/fallprep.toml"),
            json: true,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_valid_file_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fallprep.toml");
        std::fs::write(
            &path,
            "[windowing]\nwindow_length = 100\n\n[windowing.strides]\n0 = 150\n1 = 50\n",
        )
        .unwrap();

        let result = validate_config(&ValidateArgs {
            config: path,
            json: false,
        });
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("location.label")));
        assert!(warnings.iter().any(|w| w.contains("stride 150")));
        assert_eq!(result.summary.unwrap().window_length, 100);
    }

    #[test]
    fn test_invalid_stride_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fallprep.toml");
        std::fs::write(&path, "[windowing.strides]\n1 = 0\n").unwrap();

        let result = validate_config(&ValidateArgs {
            config: path,
            json: true,
        });
        assert!(!result.valid);
        assert!(run_validate(&ValidateArgs {
            config: PathBuf::from(result.config_path),
            json: true,
        })
        .is_err());
    }
}
