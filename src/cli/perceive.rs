//! `context` and `more` - what the agent would see

use anyhow::{Context, Result};
use clap::Args;
use pagepilot_core_types::{CompactElement, ElementTypeFilter, MoreElementsRequest, Region};

use crate::cli::context::CliContext;
use crate::cli::output::emit_structured;
use crate::cli::page::PageArgs;

#[derive(Args, Clone, Debug)]
pub struct ContextArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// User message used to rank elements
    #[arg(long, default_value = "")]
    pub message: String,
}

#[derive(Args, Clone, Debug)]
pub struct MoreArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Page region: form, header, sidebar, footer, below_viewport, tab_panel, modal, menu
    #[arg(long)]
    pub region: Option<String>,

    /// Element type: input, button, link, select, tab, menu, list, radio, checkbox, all
    #[arg(long)]
    pub element_type: Option<String>,

    /// Keyword the element must mention
    #[arg(long)]
    pub keyword: Option<String>,
}

fn print_elements(elements: &[CompactElement]) {
    for element in elements {
        let mut line = format!("{:>8}  {}", element.id, element.desc);
        if let Some(ctx) = &element.ctx {
            let parts: Vec<&str> = [&ctx.section, &ctx.nearby, &ctx.path]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect();
            if !parts.is_empty() {
                line.push_str(&format!("  [{}]", parts.join(" | ")));
            }
        }
        println!("{}", line);
    }
}

pub async fn cmd_context(args: ContextArgs, ctx: &CliContext) -> Result<()> {
    let session = args.page.open(ctx).await?;
    let context = session.get_page_context(&args.message);
    if emit_structured(&context, ctx.output())? {
        return Ok(());
    }

    println!("{} ({})", context.title, context.url);
    println!(
        "viewport {}x{} at scrollY {}",
        context.viewport.width, context.viewport.height, context.viewport.scroll_y
    );
    if let Some(selected) = &context.selected_text {
        println!("selected: {:?}", selected);
    }
    println!(
        "{} of {} elements",
        context.elements.len(),
        context.total_elements
    );
    print_elements(&context.elements);
    Ok(())
}

pub async fn cmd_more(args: MoreArgs, ctx: &CliContext) -> Result<()> {
    let request = MoreElementsRequest {
        region: args
            .region
            .as_deref()
            .map(str::parse::<Region>)
            .transpose()
            .context("Invalid --region")?,
        element_type: args
            .element_type
            .as_deref()
            .map(str::parse::<ElementTypeFilter>)
            .transpose()
            .context("Invalid --element-type")?,
        keyword: args.keyword.clone(),
    };

    let session = args.page.open(ctx).await?;
    let elements = session.request_more_elements(&request);
    if emit_structured(&elements, ctx.output())? {
        return Ok(());
    }
    println!("{} elements", elements.len());
    print_elements(&elements);
    Ok(())
}
