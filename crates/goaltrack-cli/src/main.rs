//! `goaltrack` command-line driver

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod settings;

fn cli() -> Command {
    Command::new("goaltrack")
        .version(goaltrack_sync::VERSION)
        .about("Goal, todo and time-log client core")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with client limits and sync options"),
        )
        .subcommand(
            Command::new("aggregate")
                .about("Compute per-goal progress from a JSON export")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file with `goals` and `todos` arrays"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("demo")
                .about("Run a scripted session against an in-memory store")
                .arg(
                    Arg::new("fail-writes")
                        .long("fail-writes")
                        .action(ArgAction::SetTrue)
                        .help("Take store writes offline midway to show rollback"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let config = settings::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    let output = match matches.subcommand() {
        Some(("aggregate", args)) => {
            let input = args
                .get_one::<PathBuf>("input")
                .ok_or_else(|| anyhow::anyhow!("--input is required"))?;
            commands::aggregate_file(input, args.get_flag("json"))?
        }
        Some(("demo", args)) => commands::demo(config, args.get_flag("fail-writes")).await?,
        _ => anyhow::bail!("unknown subcommand"),
    };
    print!("{output}");
    Ok(())
}
