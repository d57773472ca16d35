//! Tusk - open what a Mastodon post points at
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tusk::launch::{self, NoTui, ProcessRunner};
use tusk::{Config, Post, Router};

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug for verbose output)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match parse_args()? {
        Command::Show { path } => show(&path),
        Command::Open { url } => open_url(&url),
        Command::Date { timestamp } => print_date(&timestamp),
        Command::Config => init_config(),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
    }
}

/// CLI commands
enum Command {
    Show { path: PathBuf },
    Open { url: String },
    Date { timestamp: String },
    Config,
    Help,
    Version,
}

fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-v" | "--version" | "version" => Ok(Command::Version),

        "show" => {
            let path = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing status file"))?;
            Ok(Command::Show {
                path: PathBuf::from(path),
            })
        }

        "open" => {
            let url = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing URL"))?
                .clone();
            Ok(Command::Open { url })
        }

        "date" => {
            let timestamp = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Missing RFC 3339 timestamp"))?
                .clone();
            Ok(Command::Date { timestamp })
        }

        "config" => Ok(Command::Config),

        other => Err(anyhow::anyhow!(
            "Unknown command: {other}\nRun 'tusk --help' for usage"
        )),
    }
}

fn print_help() {
    let config_path = Config::default_path()
        .map_or_else(|_| "Unknown".to_string(), |p| p.display().to_string());

    println!(
        r#"🐘 Tusk - open what a Mastodon post points at

USAGE:
    tusk <COMMAND>

COMMANDS:
    show <status.json>                 Read a post in the pager
    open <url>                         Open a URL with the configured program
    date <rfc3339>                     Print a timestamp as the pager would
    config                             Print the config path, create it if missing

OPTIONS:
    -h, --help                         Show this help message
    -v, --version                      Show version information

KEYBINDINGS (pager):
    j/k           Select link
    Enter, 1-9    Open link
    c then 1-5    Open selected link with a custom opener
    m             Download and open attachments
    e             Draft a reply in $EDITOR
    ?             Help
    q             Quit

CONFIG:
    {}
"#,
        config_path
    );
}

fn print_version() {
    println!("tusk {}", tusk::VERSION);
}

fn show(path: &PathBuf) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let post = Post::from_status_json(&json).context("Not a Mastodon status")?;
    let config = Config::load()?;
    tusk::app::run(config, post)
}

fn open_url(url: &str) -> Result<()> {
    let config = Config::load()?;
    let router = Router::from_config(&config)?;
    let request = router.route(url);
    println!("Opening {} with {}", url, request.program);
    launch::execute(&mut ProcessRunner::new(&mut NoTui), &[request])?;
    Ok(())
}

fn print_date(timestamp: &str) -> Result<()> {
    let status = DateTime::parse_from_rfc3339(timestamp)
        .with_context(|| format!("Invalid timestamp: {timestamp}"))?
        .with_timezone(&Local);
    let config = Config::load()?;
    let policy = config.general.date_policy();
    println!("{}", tusk::date::format(&status, &Local::now(), &policy));
    Ok(())
}

fn init_config() -> Result<()> {
    let path = Config::default_path()?;
    if path.exists() {
        println!("Config: {}", path.display());
    } else {
        Config::default().save_to(&path)?;
        println!("Created default config: {}", path.display());
    }
    Ok(())
}
