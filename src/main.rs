//! lpcheck - landing page conversion-readiness checker

use clap::Parser;
use colored::Colorize;

use lpcheck::cli::{Cli, Commands, ConfigCommands};
use lpcheck::error::Result;

mod commands;
mod utils;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(hint) = e.hint() {
            eprintln!("  {} {}", "Hint:".yellow(), hint);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            url,
            html,
            json,
            features,
            votes,
            any_status,
        } => commands::cmd_analyze(&url, html, json, features, votes, any_status),

        Commands::Serve { addr, any_status } => commands::cmd_serve(addr, any_status),
        Commands::Learn { csv, save, json } => commands::cmd_learn(&csv, save, json),

        Commands::Config(ConfigCommands::Show) => commands::cmd_config_show(),
        Commands::Config(ConfigCommands::Path) => commands::cmd_config_path(),
        Commands::Config(ConfigCommands::Init { force }) => commands::cmd_config_init(force),

        Commands::Completions { shell } => commands::cmd_completions(shell),
    }
}
