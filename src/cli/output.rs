use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Print `payload` as JSON or YAML. Returns `false` for human output so the
/// caller can render its own text.
pub fn emit_structured<T: Serialize>(payload: &T, output: OutputFormat) -> Result<bool> {
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(payload)?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(payload)?);
            Ok(true)
        }
        OutputFormat::Human => Ok(false),
    }
}
