use std::path::{Path, PathBuf};

use pagepilot_policy_center::AgentPolicy;

use super::output::OutputFormat;

/// What every command needs beyond its own arguments.
pub struct CliContext {
    policy: AgentPolicy,
    policy_path: Option<PathBuf>,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(policy: AgentPolicy, policy_path: Option<PathBuf>, output: OutputFormat) -> Self {
        Self {
            policy,
            policy_path,
            output,
        }
    }

    pub fn policy(&self) -> &AgentPolicy {
        &self.policy
    }

    pub fn policy_path(&self) -> Option<&Path> {
        self.policy_path.as_deref()
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}
