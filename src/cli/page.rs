//! Page loading shared by the page commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio::fs;

use crate::cli::context::CliContext;
use crate::config::{SessionConfig, Viewport};
use crate::session::PageSession;

#[derive(Args, Clone, Debug)]
pub struct PageArgs {
    /// HTML file to load
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Viewport size, e.g. 1280x800
    #[arg(long, value_name = "WxH")]
    pub viewport: Option<String>,

    /// Location reported for the page
    #[arg(long)]
    pub url: Option<String>,
}

impl PageArgs {
    pub fn session_config(&self) -> Result<SessionConfig> {
        let mut config = SessionConfig::default();
        if let Some(raw) = &self.viewport {
            let viewport: Viewport = raw.parse()?;
            config = config.with_viewport(viewport);
        }
        if let Some(url) = &self.url {
            config = config.with_url(url.clone());
        }
        Ok(config)
    }

    pub async fn open(&self, ctx: &CliContext) -> Result<PageSession> {
        let html = fs::read_to_string(&self.html)
            .await
            .with_context(|| format!("Failed to read {}", self.html.display()))?;
        let config = self.session_config()?;
        PageSession::from_html(&html, ctx.policy().clone(), &config)
            .with_context(|| format!("Failed to load page from {}", self.html.display()))
    }
}
