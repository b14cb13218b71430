//! `hgive`: console front end for the HederaGive dashboard.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{value_parser, Arg, ArgAction, Command};
use hgive_app::{AppContext, Command as ConsoleCommand, CommandError, Console};
use hgive_core::GiveConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli() -> Command {
    Command::new("hgive")
        .version(hgive_app::VERSION)
        .about("HederaGive donation dashboard console")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding campaigns.json and donations.json"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("today")
                .long("today")
                .value_parser(value_parser!(NaiveDate))
                .help("Date used for deadlines and new records (YYYY-MM-DD)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
}

fn init_tracing(default_filter: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GiveConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GiveConfig::default(),
    }
    .with_env_overrides();
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config = config.with_data_dir(dir);
    }

    init_tracing(&config.log_filter, matches.get_flag("log-json"));

    let fixed_today = matches.get_one::<NaiveDate>("today").copied();
    let data_dir = config.data_dir.clone();
    let ctx = AppContext::open(config)
        .with_context(|| format!("opening data directory {}", data_dir.display()))?;
    info!(data_dir = %data_dir.display(), ledger = ctx.ledger.name(), "hgive ready");

    let mut console = Console::new(Arc::new(ctx));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let today = fixed_today.unwrap_or_else(|| chrono::Local::now().date_naive());

        let command = match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => command,
            Err(e) => {
                eprintln!("error: {e}");
                continue;
            }
        };

        match console.execute(command, today).await {
            Ok(serde_json::Value::String(text)) => println!("{text}"),
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(CommandError::Give(e)) if !e.is_user_facing() => {
                warn!(error = %e, "command failed");
                eprintln!("error: {e}");
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }

    info!("bye");
    Ok(())
}
