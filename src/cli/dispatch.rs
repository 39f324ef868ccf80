use anyhow::Result;

use crate::cli::commands::Commands;
use crate::cli::config::cmd_config;
use crate::cli::context::CliContext;
use crate::cli::env::CliArgs;
use crate::cli::exec::cmd_exec;
use crate::cli::extract::cmd_extract;
use crate::cli::perceive::{cmd_context, cmd_more};

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Context(args) => cmd_context(args, ctx).await,
        Commands::More(args) => cmd_more(args, ctx).await,
        Commands::Exec(args) => cmd_exec(args, ctx).await,
        Commands::Extract(args) => cmd_extract(args, ctx).await,
        Commands::Config(args) => cmd_config(args, ctx).await,
    }
}
