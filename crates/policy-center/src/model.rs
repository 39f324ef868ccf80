use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::PolicyError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentPolicy {
    pub rev: u64,
    pub filter: FilterPolicy,
    pub collection: CollectionPolicy,
    pub regions: RegionPolicy,
    pub executor: ExecutorPolicy,
    pub locator: LocatorPolicy,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub provenance: HashMap<String, PolicyProvenance>,
}

/// Relevance ranking knobs.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct FilterPolicy {
    pub max_elements: usize,
    pub priorities: TypePriorities,
    pub viewport: ViewportWeights,
    pub keyword_weight: i32,
    pub disabled_penalty: i32,
    pub stop_words: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct TypePriorities {
    pub form: i32,
    pub button: i32,
    pub tab: i32,
    pub menu: i32,
    pub list: i32,
    pub link: i32,
    pub text: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ViewportWeights {
    pub visible: i32,
    pub near: i32,
    pub hidden: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct CollectionPolicy {
    pub near_viewport_margin: f64,
    pub max_identifier_len: usize,
    pub max_near_elements: usize,
    pub max_parent_chain: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct RegionPolicy {
    pub header_max_y: f64,
    pub footer_band: f64,
    pub sidebar_band: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct ExecutorPolicy {
    pub batch_delay_ms: u64,
    pub wait_poll_ms: u64,
    pub wait_timeout_ms: u64,
    pub type_delay_ms: u64,
    pub drag_steps: u32,
    pub drag_step_delay_ms: u64,
    pub scroll_fraction: f64,
    pub highlight_color: String,
    pub underline_color: String,
    pub allow_evaluate: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct LocatorPolicy {
    pub valid_confidence: u8,
    pub proximity_px: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PolicyProvenance {
    pub path: String,
    pub source: PolicySource,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicySource {
    Builtin,
    File,
    Env,
    Cli,
}

impl Default for AgentPolicy {
    fn default() -> Self {
        crate::defaults::default_policy()
    }
}

impl AgentPolicy {
    pub fn set_provenance(&mut self, path: &str, source: PolicySource) {
        self.provenance.insert(
            path.to_string(),
            PolicyProvenance {
                path: path.to_string(),
                source,
            },
        );
    }

    pub fn source_of(&self, path: &str) -> Option<PolicySource> {
        self.provenance.get(path).map(|p| p.source)
    }

    /// Reject combinations the core cannot run with.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.filter.max_elements == 0 {
            return Err(PolicyError::Invalid(
                "filter.max_elements must be positive".into(),
            ));
        }
        if !(self.executor.scroll_fraction > 0.0 && self.executor.scroll_fraction <= 1.0) {
            return Err(PolicyError::Invalid(format!(
                "executor.scroll_fraction must be in (0, 1], got {}",
                self.executor.scroll_fraction
            )));
        }
        if self.executor.drag_steps == 0 {
            return Err(PolicyError::Invalid("executor.drag_steps must be positive".into()));
        }
        if self.executor.wait_poll_ms == 0 {
            return Err(PolicyError::Invalid("executor.wait_poll_ms must be positive".into()));
        }
        if self.locator.valid_confidence > 100 {
            return Err(PolicyError::Invalid(format!(
                "locator.valid_confidence must be at most 100, got {}",
                self.locator.valid_confidence
            )));
        }
        Ok(())
    }
}
