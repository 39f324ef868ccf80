//! `config` - show the effective agent policy

use anyhow::Result;
use clap::Args;

use crate::cli::context::CliContext;
use crate::cli::output::{emit_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {}

pub async fn cmd_config(_args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    if let Some(path) = ctx.policy_path() {
        eprintln!("# policy file: {}", path.display());
    }
    let format = match ctx.output() {
        OutputFormat::Human => OutputFormat::Yaml,
        other => other,
    };
    emit_structured(ctx.policy(), format)?;
    Ok(())
}
