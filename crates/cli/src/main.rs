//! `microwave` command line entry point.
//!
//! Without a subcommand the terminal UI is launched for the project in
//! `--root`. The other subcommands scaffold a project, list its items, or
//! run one cook cycle headless and print the events.

mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "microwave", version, about = "Drive a simulated microwave appliance")]
struct Cli {
    /// Project root containing the `.microwave/` directory.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Maximum log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    /// Log file for the terminal UI. Headless commands log to stderr.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Launch the terminal UI (the default).
    Tui,

    /// Create a `.microwave/` project from the built-in templates.
    Init {
        /// Overwrite an existing `.microwave/` directory.
        #[arg(long)]
        force: bool,

        /// Only write a single item.
        #[arg(long)]
        minimal: bool,
    },

    /// List the item catalog.
    Items {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Run one cook cycle without the UI and print its events.
    Cook {
        /// Item to place in the appliance before cooking.
        #[arg(long)]
        item: Option<String>,

        /// Cook duration; defaults to the configured one.
        #[arg(long)]
        seconds: Option<u64>,

        /// Press stop this many seconds after starting.
        #[arg(long)]
        stop_after: Option<u64>,

        /// Print events as JSON lines.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            let log_file = cli
                .log_file
                .unwrap_or_else(|| logging::default_log_file(&cli.root));
            logging::init_file(cli.log_level, &log_file)?;
            commands::tui::run(&cli.root).await
        }
        Command::Init { force, minimal } => {
            logging::init_stderr(cli.log_level)?;
            commands::init::run(&cli.root, force, minimal).await
        }
        Command::Items { json } => {
            logging::init_stderr(cli.log_level)?;
            commands::items::run(&cli.root, json).await
        }
        Command::Cook {
            item,
            seconds,
            stop_after,
            json,
        } => {
            logging::init_stderr(cli.log_level)?;
            let options = commands::cook::CookOptions {
                item,
                seconds,
                stop_after,
                json,
            };
            commands::cook::run(&cli.root, options).await
        }
    }
}
