//! `exec` - run a batch of actions against a page

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pagepilot_core_types::{BatchActionResult, BatchEntry};
use serde::Deserialize;
use tokio::fs;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::emit_structured;
use crate::cli::page::PageArgs;

#[derive(Args, Clone, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// JSON file holding an array of actions or `{"actions": [...]}`
    #[arg(long, value_name = "FILE")]
    pub actions: PathBuf,

    /// Print the resulting document after the batch
    #[arg(long)]
    pub dump: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActionFile {
    List(Vec<BatchEntry>),
    Wrapped { actions: Vec<BatchEntry> },
}

/// Entries are decoded one by one, so a bad parameter in one action does not
/// reject the file.
pub fn parse_actions(raw: &str) -> Result<Vec<BatchEntry>> {
    let file: ActionFile = serde_json::from_str(raw).context("Invalid action file")?;
    Ok(match file {
        ActionFile::List(actions) | ActionFile::Wrapped { actions } => actions,
    })
}

fn print_batch(batch: &BatchActionResult) {
    for (index, result) in batch.results.iter().enumerate() {
        let status = if result.success { "ok" } else { "FAILED" };
        match &result.error {
            Some(code) => println!("{:>3} {:<6} {} ({})", index, status, result.message, code.as_str()),
            None => println!("{:>3} {:<6} {}", index, status, result.message),
        }
        if let Some(data) = &result.data {
            println!("           data: {}", data);
        }
    }
    println!("{}", batch.summary);
}

pub async fn cmd_exec(args: ExecArgs, ctx: &CliContext) -> Result<()> {
    let raw = fs::read_to_string(&args.actions)
        .await
        .with_context(|| format!("Failed to read {}", args.actions.display()))?;
    let actions = parse_actions(&raw)?;
    info!(count = actions.len(), "Executing action batch");

    let session = args.page.open(ctx).await?;
    let batch = session.execute_entries(&actions).await;

    if !emit_structured(&batch, ctx.output())? {
        print_batch(&batch);
    }
    if args.dump {
        println!("{}", session.to_html());
    }
    if !batch.success {
        anyhow::bail!("{}", batch.summary);
    }
    Ok(())
}
