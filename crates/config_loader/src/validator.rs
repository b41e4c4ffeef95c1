//! 配置校验模块
//!
//! 校验规则：
//! - 注释前缀与分隔符为不同的单字符，且不会与数值字段冲突
//! - 位置标签非空且不含分隔符
//! - window_length > 0，channels 与张量契约一致
//! - 每个标签的步长 > 0，标签为 0-255 的整数，同一标签只能配置一次
//! - workers >= 1
//! - 输出目录不能与输入目录相同

use std::collections::{BTreeMap, HashSet};

use contracts::{ContractError, PipelineBlueprint, CHANNEL_COUNT};

/// 校验 PipelineBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    validate_format(blueprint)?;
    validate_dataset(blueprint)?;
    validate_location(blueprint)?;
    validate_windowing(blueprint)?;
    validate_batch(blueprint)?;
    Ok(())
}

/// 分隔符/注释前缀不能出现在数值字段中
fn is_reserved_char(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

fn validate_format(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let format = &blueprint.format;

    if format.comment_marker == format.delimiter {
        return Err(ContractError::config_validation(
            "format.comment_marker / format.delimiter",
            format!(
                "comment_marker and delimiter must differ, both are '{}'",
                format.delimiter
            ),
        ));
    }

    for (field, c) in [
        ("format.comment_marker", format.comment_marker),
        ("format.delimiter", format.delimiter),
    ] {
        if is_reserved_char(c) {
            return Err(ContractError::config_validation(
                field,
                format!("'{c}' collides with numeric field content"),
            ));
        }
    }

    Ok(())
}

fn validate_dataset(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let dataset = &blueprint.dataset;

    if dataset.extension.is_empty() || dataset.extension.starts_with('.') {
        return Err(ContractError::config_validation(
            "dataset.extension",
            format!(
                "extension must be non-empty and given without a dot, got '{}'",
                dataset.extension
            ),
        ));
    }

    if dataset.output_dir.as_ref() == Some(&dataset.input_dir) {
        return Err(ContractError::config_validation(
            "dataset.output_dir",
            "output_dir must differ from input_dir",
        ));
    }

    Ok(())
}

fn validate_location(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let Some(label) = blueprint.location_label() else {
        return Ok(());
    };

    if label.trim().is_empty() {
        return Err(ContractError::config_validation(
            "location.label",
            "location label cannot be empty",
        ));
    }

    if label.contains(blueprint.format.delimiter) {
        return Err(ContractError::config_validation(
            "location.label",
            format!(
                "location label '{}' contains the field delimiter '{}'",
                label, blueprint.format.delimiter
            ),
        ));
    }

    Ok(())
}

fn validate_windowing(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    let windowing = &blueprint.windowing;

    if windowing.window_length == 0 {
        return Err(ContractError::config_validation(
            "windowing.window_length",
            "window_length must be > 0",
        ));
    }

    if windowing.channels != CHANNEL_COUNT {
        return Err(ContractError::config_validation(
            "windowing.channels",
            format!(
                "only the {CHANNEL_COUNT}-channel single-device layout is supported, got {}",
                windowing.channels
            ),
        ));
    }

    if windowing.strides.is_empty() {
        return Err(ContractError::config_validation(
            "windowing.strides",
            "at least one label stride is required",
        ));
    }

    let mut labels: BTreeMap<u8, &str> = BTreeMap::new();
    for (label, stride) in &windowing.strides {
        let Ok(parsed) = label.trim().parse::<u8>() else {
            return Err(ContractError::config_validation(
                format!("windowing.strides[{label}]"),
                "label must be an integer in 0..=255",
            ));
        };
        if let Some(first) = labels.insert(parsed, label) {
            return Err(ContractError::config_validation(
                format!("windowing.strides[{label}]"),
                format!("label {parsed} is already configured by key '{first}'"),
            ));
        }
        if *stride <= 0 {
            return Err(ContractError::config_validation(
                format!("windowing.strides[{label}]"),
                format!("stride must be > 0, got {stride}"),
            ));
        }
    }

    if windowing.channel_columns.len() != windowing.channels {
        return Err(ContractError::config_validation(
            "windowing.channel_columns",
            format!(
                "expected {} channel columns, got {}",
                windowing.channels,
                windowing.channel_columns.len()
            ),
        ));
    }

    let mut seen = HashSet::new();
    for column in &windowing.channel_columns {
        if !seen.insert(column.as_str()) {
            return Err(ContractError::config_validation(
                format!("windowing.channel_columns[{column}]"),
                "duplicate channel column",
            ));
        }
    }

    if windowing.label_column.is_empty() || seen.contains(windowing.label_column.as_str()) {
        return Err(ContractError::config_validation(
            "windowing.label_column",
            "label column must be non-empty and distinct from channel columns",
        ));
    }

    Ok(())
}

fn validate_batch(blueprint: &PipelineBlueprint) -> Result<(), ContractError> {
    if blueprint.batch.workers == 0 {
        return Err(ContractError::config_validation(
            "batch.workers",
            "workers must be >= 1",
        ));
    }
    Ok(())
}
