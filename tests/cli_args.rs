use clap::Parser;
use pagepilot::cli::commands::Commands;
use pagepilot::cli::{CliArgs, OutputFormat};

#[test]
fn exec_command_with_globals() {
    let cli = CliArgs::try_parse_from([
        "pagepilot",
        "exec",
        "--html",
        "page.html",
        "--actions",
        "actions.json",
        "-o",
        "json",
        "--set",
        "executor.batch_delay_ms=0",
    ])
    .expect("valid args");

    assert_eq!(cli.output, OutputFormat::Json);
    assert_eq!(cli.overrides, vec!["executor.batch_delay_ms=0"]);
    assert_eq!(cli.log_level, "warn");
    match cli.command {
        Commands::Exec(args) => {
            assert_eq!(args.actions.to_str(), Some("actions.json"));
            assert!(!args.dump);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn page_commands_require_html() {
    assert!(CliArgs::try_parse_from(["pagepilot", "context"]).is_err());
}

#[test]
fn viewport_flag_feeds_session_config() {
    let cli = CliArgs::try_parse_from([
        "pagepilot",
        "context",
        "--html",
        "page.html",
        "--viewport",
        "800x600",
    ])
    .expect("valid args");
    let Commands::Context(args) = cli.command else {
        panic!("expected context command");
    };
    let config = args.page.session_config().expect("viewport parses");
    assert_eq!(config.viewport.width, 800.0);
    assert_eq!(config.viewport.height, 600.0);
}
