use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deskctl::args::CommonArgs;
use deskctl::config::Config;
use deskctl::logging::{self, LogConfig};
use deskctl::panel::{Outcome, Panel};
use deskctl::system_action::SystemAction;
use deskctl::theme as t;
use tokio::io::BufReader;

// ── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "deskctl",
    version,
    about = "deskctl: code checker and system control panel"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check a .java or .py file for syntax and compile errors
    Check {
        /// File to check
        path: String,
        /// Print the checker command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Search the web, search YouTube ("youtube <terms>"), or open a URL
    Search {
        /// Query text; words are joined with single spaces
        query: Vec<String>,
        /// Print the destination instead of opening it
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a system action (shutdown, log-off, sleep, open-notepad, ...)
    Action {
        /// Action name or menu label
        name: String,
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
        /// Print the command line instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// List the available system actions
    Actions {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare a file's MD5 digest against the known-threat list
    Scan {
        /// File to scan
        path: PathBuf,
    },
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Interactive control panel (default when no subcommand is given)
    Panel {
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
        /// Print commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    t::init_color(cli.common.no_color);
    logging::init(if cli.common.verbose {
        LogConfig::debug()
    } else {
        LogConfig::from_env()
    });

    let config = cli
        .common
        .load_config()
        .context("Failed to load configuration")?;

    let command = cli.command.unwrap_or(Commands::Panel {
        yes: false,
        dry_run: false,
    });
    let config_file = cli.common.config.clone().unwrap_or_else(|| config.file_path());
    let outcome = run(command, &config, config_file).await?;
    io::stdout().flush()?;
    std::process::exit(outcome.exit_code());
}

async fn run(command: Commands, config: &Config, config_file: PathBuf) -> Result<Outcome> {
    let panel = Panel::new(config, BufReader::new(tokio::io::stdin()), io::stdout());

    match command {
        Commands::Check { path, dry_run } => {
            let mut panel = panel.dry_run(dry_run);
            panel.check(&path).await
        }
        Commands::Search { query, dry_run } => {
            let mut panel = panel.dry_run(dry_run);
            panel.search(&query.join(" "))
        }
        Commands::Action { name, yes, dry_run } => {
            let action = SystemAction::from_label(&name);
            tracing::debug!(name, %action, "resolved action");
            let mut panel = panel.dry_run(dry_run).assume_yes(yes);
            panel.action(action).await
        }
        Commands::Actions { json } => {
            list_actions(json)?;
            Ok(Outcome::Done)
        }
        Commands::Scan { path } => {
            let mut panel = panel;
            panel.scan(&path)
        }
        Commands::Init { force } => init_config(config, config_file, force),
        Commands::Panel { yes, dry_run } => {
            let mut panel = panel.dry_run(dry_run).assume_yes(yes);
            panel.run().await?;
            Ok(Outcome::Done)
        }
    }
}

fn init_config(config: &Config, path: PathBuf, force: bool) -> Result<Outcome> {
    if path.exists() && !force {
        println!(
            "{}",
            t::icon_warn(&format!(
                "{} already exists; pass --force to overwrite",
                path.display()
            ))
        );
        return Ok(Outcome::Warning);
    }
    config
        .save(Some(path.clone()))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{}", t::icon_ok(&format!("Wrote {}", path.display())));
    Ok(Outcome::Done)
}

fn list_actions(json: bool) -> Result<()> {
    let actions: Vec<_> = SystemAction::menu()
        .filter_map(|action| action.command().map(|command| (action, command)))
        .collect();

    if json {
        let entries: Vec<serde_json::Value> = actions
            .iter()
            .map(|(action, command)| {
                serde_json::json!({
                    "name": action.cli_name(),
                    "label": action.label(),
                    "command_line": command.command_line,
                    "requires_confirmation": command.requires_confirmation,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", t::heading("System actions"));
    for (action, command) in &actions {
        let confirm = if command.requires_confirmation {
            t::warn(" (asks first)")
        } else {
            String::new()
        };
        println!(
            "  {:<16} {:<16} {}{}",
            t::accent(action.cli_name()),
            action.label(),
            t::muted(&command.command_line),
            confirm
        );
    }
    Ok(())
}
