pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod exec;
pub mod extract;
pub mod output;
pub mod page;
pub mod perceive;
pub mod runtime;

pub use app::run;
pub use env::CliArgs;
pub use output::OutputFormat;
