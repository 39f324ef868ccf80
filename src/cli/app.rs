use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use crate::cli::context::CliContext;
use crate::cli::dispatch::dispatch;
use crate::cli::env::CliArgs;
use crate::cli::runtime::{init_logging, load_policy};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.log_json)?;
    info!("Starting pagepilot v{}", env!("CARGO_PKG_VERSION"));

    let policy = load_policy(cli.config.as_deref(), &cli.overrides)?;
    let ctx = CliContext::new(policy, cli.config.clone(), cli.output);

    let result = dispatch(&cli, &ctx).await;
    match &result {
        Ok(_) => info!("Command completed successfully"),
        Err(e) => error!("Command failed: {}", e),
    }
    result
}
