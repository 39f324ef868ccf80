use std::path::Path;

use anyhow::{Context, Result};
use pagepilot_policy_center::AgentPolicy;
use tracing::info;

use crate::config::load_agent_policy;
use crate::observability::init_tracing;

pub fn init_logging(level: &str, json: bool) -> Result<()> {
    init_tracing(level, json)
}

pub fn load_policy(path: Option<&Path>, overrides: &[String]) -> Result<AgentPolicy> {
    let policy = load_agent_policy(path, overrides).context("Failed to load policy")?;
    match path {
        Some(p) => info!("Loaded policy from: {}", p.display()),
        None => info!("Using default policy locations"),
    }
    Ok(policy)
}
