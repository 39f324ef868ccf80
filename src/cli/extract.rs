//! `extract` - structured data from a page

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::cli::context::CliContext;
use crate::cli::output::{emit_structured, OutputFormat};
use crate::cli::page::PageArgs;
use crate::session::ExtractKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExtractTarget {
    Tables,
    Lists,
    Cards,
    Forms,
    Metadata,
    Summary,
}

impl From<ExtractTarget> for ExtractKind {
    fn from(target: ExtractTarget) -> Self {
        match target {
            ExtractTarget::Tables => ExtractKind::Tables,
            ExtractTarget::Lists => ExtractKind::Lists,
            ExtractTarget::Cards => ExtractKind::Cards,
            ExtractTarget::Forms => ExtractKind::Forms,
            ExtractTarget::Metadata => ExtractKind::Metadata,
            ExtractTarget::Summary => ExtractKind::Summary,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// What to extract
    #[arg(long, value_enum, default_value = "summary")]
    pub kind: ExtractTarget,
}

pub async fn cmd_extract(args: ExtractArgs, ctx: &CliContext) -> Result<()> {
    let session = args.page.open(ctx).await?;
    let value = session.extract(args.kind.into())?;
    // Extraction output is data; human mode prints it as JSON too.
    let format = match ctx.output() {
        OutputFormat::Human => OutputFormat::Json,
        other => other,
    };
    emit_structured(&value, format)?;
    Ok(())
}
