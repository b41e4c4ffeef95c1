//! Blueprint resolution: file (or defaults) plus CLI overrides, validated.

use std::path::Path;

use config_loader::ConfigLoader;
use contracts::{ActivityLabel, PipelineBlueprint};
use tracing::info;

use crate::cli::{SourceArgs, StrideOverride};
use crate::error::{CliError, Result};

/// Load the configuration file, or start from defaults when none is given.
pub fn load_blueprint(path: Option<&Path>) -> Result<PipelineBlueprint> {
    let Some(path) = path else {
        info!("No configuration file given, using defaults");
        return Ok(PipelineBlueprint::default());
    };

    if !path.exists() {
        return Err(CliError::config_not_found(path));
    }

    info!(config = %path.display(), "Loading configuration");
    ConfigLoader::load_from_path(path).map_err(|e| CliError::config_validation(e.to_string()))
}

/// Apply the shared corpus overrides
pub fn apply_source_overrides(blueprint: &mut PipelineBlueprint, source: &SourceArgs) {
    if let Some(ref input) = source.input {
        info!(input = %input.display(), "Overriding input directory from CLI");
        blueprint.dataset.input_dir = input.clone();
    }
    if let Some(ref location) = source.location {
        info!(location = %location, "Overriding location from CLI");
        blueprint.location.label = Some(location.clone());
    }
    if let Some(workers) = source.workers {
        info!(workers, "Overriding worker count from CLI");
        blueprint.batch.workers = workers;
    }
    if let Some(ref extension) = source.extension {
        blueprint.dataset.extension = extension.clone();
    }
}

/// Apply windowing overrides from the `window` command
pub fn apply_window_overrides(
    blueprint: &mut PipelineBlueprint,
    window_length: Option<usize>,
    strides: &[StrideOverride],
) {
    if let Some(length) = window_length {
        info!(window_length = length, "Overriding window length from CLI");
        blueprint.windowing.window_length = length;
    }
    for o in strides {
        info!(label = %o.label, stride = o.stride, "Overriding stride from CLI");
        let key = match o.label.trim().parse::<ActivityLabel>() {
            // Replace every key naming this label, so `01=5` overrides `1`
            Ok(label) => {
                blueprint
                    .windowing
                    .strides
                    .retain(|k, _| k.trim().parse::<ActivityLabel>() != Ok(label));
                label.to_string()
            }
            // Left as-is for validation to report
            Err(_) => o.label.clone(),
        };
        blueprint.windowing.strides.insert(key, o.stride);
    }
}

/// Re-validate after overrides
pub fn validated(blueprint: PipelineBlueprint) -> Result<PipelineBlueprint> {
    ConfigLoader::validate(&blueprint).map_err(|e| CliError::config_validation(e.to_string()))?;
    Ok(blueprint)
}

/// Load, override and validate for the batch commands
pub fn resolve_source(source: &SourceArgs) -> Result<PipelineBlueprint> {
    let mut blueprint = load_blueprint(source.config.as_deref())?;
    apply_source_overrides(&mut blueprint, source);
    validated(blueprint)
}
