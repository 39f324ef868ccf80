use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::apply::apply_override;
use crate::defaults::default_policy;
use crate::errors::PolicyError;
use crate::model::{AgentPolicy, PolicySource};

pub const ENV_PREFIX: &str = "PAGEPILOT__";
pub const ENV_JSON: &str = "PAGEPILOT_OVERRIDE_JSON";

#[derive(Debug, Default)]
pub struct LoadOptions {
    pub paths: Vec<PathBuf>,
    pub include_env: bool,
    /// `path=value` pairs from the command line, applied last.
    pub cli_overrides: Vec<String>,
}

impl LoadOptions {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
            include_env: true,
            cli_overrides: Vec::new(),
        }
    }
}

pub fn load_policy(path: Option<&Path>) -> Result<AgentPolicy, PolicyError> {
    let mut options = LoadOptions::default();
    if let Some(p) = path {
        options.paths.push(p.to_path_buf());
    }
    options.include_env = true;
    load_policy_with_options(&options)
}

pub fn load_policy_with_options(options: &LoadOptions) -> Result<AgentPolicy, PolicyError> {
    let mut policy = default_policy();
    bootstrap_builtin_provenance(&mut policy)?;

    for path in &options.paths {
        if path.exists() {
            let overlay = overlays_from_file(path)?;
            debug!(path = %path.display(), entries = overlay.len(), "policy file overlay");
            apply_overlays(&mut policy, overlay)?;
        } else {
            debug!(path = %path.display(), "policy file not found, skipped");
        }
    }

    if options.include_env {
        let env_overlays = overlays_from_env()?;
        apply_overlays(&mut policy, env_overlays)?;
    }

    let cli_overlays = overlays_from_cli(&options.cli_overrides)?;
    apply_overlays(&mut policy, cli_overlays)?;

    policy.validate()?;
    Ok(policy)
}

struct PolicyOverlay {
    path: String,
    value: Value,
    source: PolicySource,
}

fn apply_overlays(policy: &mut AgentPolicy, overlays: Vec<PolicyOverlay>) -> Result<(), PolicyError> {
    for overlay in overlays {
        apply_override(policy, &overlay.path, &overlay.value, overlay.source)?;
    }
    Ok(())
}

fn overlays_from_file(path: &Path) -> Result<Vec<PolicyOverlay>, PolicyError> {
    let content = fs::read_to_string(path).map_err(|err| PolicyError::Io(format!("{}", err)))?;
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|err| PolicyError::Invalid(format!("{}", err)))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| PolicyError::Invalid(format!("{}", err)))?;
    Ok(flatten_value(json_value, None, PolicySource::File))
}

fn overlays_from_env() -> Result<Vec<PolicyOverlay>, PolicyError> {
    let mut overlays = Vec::new();
    let mut vars: Vec<(String, String)> = env::vars().collect();
    vars.sort();
    for (key, raw) in vars {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let path = stripped
                .split("__")
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_ascii_lowercase())
                .collect::<Vec<_>>()
                .join(".");
            if path.is_empty() {
                continue;
            }
            let value = parse_env_value(&raw);
            overlays.push(PolicyOverlay {
                path,
                value,
                source: PolicySource::Env,
            });
        }
    }

    if let Ok(raw_json) = env::var(ENV_JSON) {
        if !raw_json.trim().is_empty() {
            let json_value: Value = serde_json::from_str(&raw_json)
                .map_err(|err| PolicyError::Invalid(format!("{}", err)))?;
            overlays.extend(flatten_value(json_value, None, PolicySource::Env));
        }
    }

    Ok(overlays)
}

fn overlays_from_cli(pairs: &[String]) -> Result<Vec<PolicyOverlay>, PolicyError> {
    let mut overlays = Vec::new();
    for token in pairs {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (path, value_raw) = trimmed.split_once('=').ok_or_else(|| {
            PolicyError::InvalidValue(format!("expected path=value, got {}", trimmed))
        })?;
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        overlays.push(PolicyOverlay {
            path: path.to_ascii_lowercase(),
            value: parse_env_value(value_raw.trim()),
            source: PolicySource::Cli,
        });
    }
    Ok(overlays)
}

/// JSON first, then bool, then integer, else the raw string.
pub(crate) fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    if let Ok(boolean) = raw.parse::<bool>() {
        return Value::Bool(boolean);
    }
    if let Ok(int_val) = raw.parse::<i64>() {
        return Value::Number(int_val.into());
    }
    Value::String(raw.to_string())
}

fn flatten_value(value: Value, prefix: Option<String>, source: PolicySource) -> Vec<PolicyOverlay> {
    match value {
        Value::Object(map) => {
            let mut result = Vec::new();
            for (key, value) in map {
                let key_segment = key.trim().to_ascii_lowercase();
                let next_prefix = match &prefix {
                    Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, key_segment),
                    _ => key_segment,
                };
                result.extend(flatten_value(value, Some(next_prefix), source));
            }
            result
        }
        other => match prefix {
            Some(prefix) => vec![PolicyOverlay {
                path: prefix,
                value: other,
                source,
            }],
            None => Vec::new(),
        },
    }
}

fn bootstrap_builtin_provenance(policy: &mut AgentPolicy) -> Result<(), PolicyError> {
    let sections = [
        ("filter", serde_json::to_value(&policy.filter)),
        ("collection", serde_json::to_value(&policy.collection)),
        ("regions", serde_json::to_value(&policy.regions)),
        ("executor", serde_json::to_value(&policy.executor)),
        ("locator", serde_json::to_value(&policy.locator)),
    ];
    let mut overlays = Vec::new();
    for (name, value) in sections {
        let value = value.map_err(|err| PolicyError::Invalid(format!("{}", err)))?;
        overlays.extend(flatten_value(value, Some(name.into()), PolicySource::Builtin));
    }
    for overlay in overlays {
        policy.set_provenance(&overlay.path, overlay.source);
    }
    Ok(())
}
