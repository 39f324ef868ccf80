use clap::Subcommand;

use crate::cli::config::ConfigArgs;
use crate::cli::exec::ExecArgs;
use crate::cli::extract::ExtractArgs;
use crate::cli::perceive::{ContextArgs, MoreArgs};

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Show the page context an agent would receive
    Context(ContextArgs),

    /// Request more elements by region, type or keyword
    More(MoreArgs),

    /// Execute a batch of actions
    Exec(ExecArgs),

    /// Extract tables, lists, cards, forms, metadata or a summary
    Extract(ExtractArgs),

    /// Print the effective policy
    Config(ConfigArgs),
}
