use serde_json::Value;

use crate::errors::PolicyError;
use crate::model::{AgentPolicy, PolicySource};

/// Set one dotted policy path. Unknown paths and mistyped values are errors;
/// provenance is recorded only when the value actually changes.
pub fn apply_override(
    policy: &mut AgentPolicy,
    path: &str,
    value: &Value,
    source: PolicySource,
) -> Result<(), PolicyError> {
    let changed = match path {
        "filter.max_elements" => merge(&mut policy.filter.max_elements, to_usize(value)?),
        "filter.priorities.form" => merge(&mut policy.filter.priorities.form, to_i32(value)?),
        "filter.priorities.button" => merge(&mut policy.filter.priorities.button, to_i32(value)?),
        "filter.priorities.tab" => merge(&mut policy.filter.priorities.tab, to_i32(value)?),
        "filter.priorities.menu" => merge(&mut policy.filter.priorities.menu, to_i32(value)?),
        "filter.priorities.list" => merge(&mut policy.filter.priorities.list, to_i32(value)?),
        "filter.priorities.link" => merge(&mut policy.filter.priorities.link, to_i32(value)?),
        "filter.priorities.text" => merge(&mut policy.filter.priorities.text, to_i32(value)?),
        "filter.viewport.visible" => merge(&mut policy.filter.viewport.visible, to_i32(value)?),
        "filter.viewport.near" => merge(&mut policy.filter.viewport.near, to_i32(value)?),
        "filter.viewport.hidden" => merge(&mut policy.filter.viewport.hidden, to_i32(value)?),
        "filter.keyword_weight" => merge(&mut policy.filter.keyword_weight, to_i32(value)?),
        "filter.disabled_penalty" => merge(&mut policy.filter.disabled_penalty, to_i32(value)?),
        "filter.stop_words" => merge(&mut policy.filter.stop_words, to_string_list(value)?),
        "collection.near_viewport_margin" => merge(
            &mut policy.collection.near_viewport_margin,
            to_f64(value)?,
        ),
        "collection.max_identifier_len" => merge(
            &mut policy.collection.max_identifier_len,
            to_usize(value)?,
        ),
        "collection.max_near_elements" => merge(
            &mut policy.collection.max_near_elements,
            to_usize(value)?,
        ),
        "collection.max_parent_chain" => merge(
            &mut policy.collection.max_parent_chain,
            to_usize(value)?,
        ),
        "regions.header_max_y" => merge(&mut policy.regions.header_max_y, to_f64(value)?),
        "regions.footer_band" => merge(&mut policy.regions.footer_band, to_f64(value)?),
        "regions.sidebar_band" => merge(&mut policy.regions.sidebar_band, to_f64(value)?),
        "executor.batch_delay_ms" => merge(&mut policy.executor.batch_delay_ms, to_u64(value)?),
        "executor.wait_poll_ms" => merge(&mut policy.executor.wait_poll_ms, to_u64(value)?),
        "executor.wait_timeout_ms" => merge(&mut policy.executor.wait_timeout_ms, to_u64(value)?),
        "executor.type_delay_ms" => merge(&mut policy.executor.type_delay_ms, to_u64(value)?),
        "executor.drag_steps" => merge(&mut policy.executor.drag_steps, to_u32(value)?),
        "executor.drag_step_delay_ms" => merge(
            &mut policy.executor.drag_step_delay_ms,
            to_u64(value)?,
        ),
        "executor.scroll_fraction" => merge(&mut policy.executor.scroll_fraction, to_f64(value)?),
        "executor.highlight_color" => merge(
            &mut policy.executor.highlight_color,
            to_string(value)?,
        ),
        "executor.underline_color" => merge(
            &mut policy.executor.underline_color,
            to_string(value)?,
        ),
        "executor.allow_evaluate" => merge(&mut policy.executor.allow_evaluate, to_bool(value)?),
        "locator.valid_confidence" => merge(&mut policy.locator.valid_confidence, to_u8(value)?),
        "locator.proximity_px" => merge(&mut policy.locator.proximity_px, to_f64(value)?),
        path => return Err(PolicyError::UnsupportedPath(path.to_string())),
    };
    if changed {
        policy.set_provenance(path, source);
    }
    Ok(())
}

fn merge<T: PartialEq>(target: &mut T, candidate: T) -> bool {
    if *target == candidate {
        return false;
    }
    *target = candidate;
    true
}

fn to_u64(value: &Value) -> Result<u64, PolicyError> {
    value
        .as_u64()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected non-negative integer, got {value}")))
}

fn to_usize(value: &Value) -> Result<usize, PolicyError> {
    to_u64(value).and_then(|v| {
        usize::try_from(v).map_err(|_| PolicyError::InvalidValue(format!("value {v} exceeds usize")))
    })
}

fn to_u32(value: &Value) -> Result<u32, PolicyError> {
    to_u64(value).and_then(|v| {
        u32::try_from(v).map_err(|_| PolicyError::InvalidValue(format!("value {v} exceeds u32")))
    })
}

fn to_u8(value: &Value) -> Result<u8, PolicyError> {
    to_u64(value).and_then(|v| {
        u8::try_from(v).map_err(|_| PolicyError::InvalidValue(format!("value {v} exceeds u8")))
    })
}

fn to_i32(value: &Value) -> Result<i32, PolicyError> {
    value
        .as_i64()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected integer, got {value}")))
        .and_then(|v| {
            i32::try_from(v).map_err(|_| PolicyError::InvalidValue(format!("value {v} exceeds i32")))
        })
}

fn to_f64(value: &Value) -> Result<f64, PolicyError> {
    value
        .as_f64()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected number, got {value}")))
}

fn to_bool(value: &Value) -> Result<bool, PolicyError> {
    value
        .as_bool()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected bool, got {value}")))
}

fn to_string(value: &Value) -> Result<String, PolicyError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected string, got {value}")))
}

/// A YAML/JSON list of strings, or a comma-separated string from the env.
fn to_string_list(value: &Value) -> Result<Vec<String>, PolicyError> {
    match value {
        Value::Array(items) => items.iter().map(to_string).collect(),
        Value::String(raw) => Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()),
        other => Err(PolicyError::InvalidValue(format!(
            "expected list of strings, got {other}"
        ))),
    }
}
