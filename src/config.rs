//! Session configuration
//!
//! The agent policy itself lives in `pagepilot-policy-center`; this module
//! only carries what a host decides about the page it hands over.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use pagepilot_policy_center::{load_policy_with_options, AgentPolicy, LoadOptions};
use serde::{Deserialize, Serialize};

use crate::errors::{SessionError, SessionResult};

/// Viewport size in CSS pixels, written `WIDTHxHEIGHT` on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: pagepilot_dom_adapter::window::DEFAULT_VIEWPORT_WIDTH,
            height: pagepilot_dom_adapter::window::DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl FromStr for Viewport {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| SessionError::Config(format!("viewport must be WxH, got {:?}", s)))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(|| SessionError::Config(format!("invalid viewport dimension {:?}", part)))
        };
        Ok(Self {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

/// How a session sets up the window before the first perception pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub viewport: Viewport,

    /// Location reported in the page context; `about:blank` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SessionConfig {
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Default policy file locations, most specific first.
pub fn default_policy_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("config/pagepilot.yaml")]
}

/// Built-in defaults, then `path` (or the default locations), then
/// environment overlays, then `key=value` overrides.
pub fn load_agent_policy(path: Option<&Path>, overrides: &[String]) -> SessionResult<AgentPolicy> {
    let options = LoadOptions {
        paths: match path {
            Some(p) => vec![p.to_path_buf()],
            None => default_policy_paths(),
        },
        include_env: true,
        cli_overrides: overrides.to_vec(),
    };
    Ok(load_policy_with_options(&options)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_parses_width_by_height() {
        let viewport: Viewport = "1024x768".parse().unwrap();
        assert_eq!(viewport.width, 1024.0);
        assert_eq!(viewport.height, 768.0);
        assert!("1024".parse::<Viewport>().is_err());
        assert!("0x768".parse::<Viewport>().is_err());
    }

    #[test]
    fn builder_sets_url() {
        let config = SessionConfig::default().with_url("https://example.com/");
        assert_eq!(config.url.as_deref(), Some("https://example.com/"));
        assert_eq!(config.viewport, Viewport::default());
    }
}
