use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use colored::Colorize;

use lpcheck::cli::{Cli, CompletionShell};
use lpcheck::config::Config;
use lpcheck::error::Result;

/// Print the active configuration as TOML
pub fn cmd_config_show() -> Result<()> {
    let path = Config::config_path()?;
    let config = Config::load()?;

    let origin = if path.exists() {
        path.display().to_string()
    } else {
        "built-in defaults".to_string()
    };
    println!("{}", format!("# {}", origin).dimmed());
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn cmd_config_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}

/// Write the default policy to the config file
pub fn cmd_config_init(force: bool) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        println!(
            "{} Config already exists at {} (use --force to overwrite)",
            "!".yellow(),
            path.display()
        );
        return Ok(());
    }

    Config::default().save()?;
    println!("{} Wrote default config to {}", "✓".green(), path.display());
    Ok(())
}

/// Generate shell completions
pub fn cmd_completions(shell: CompletionShell) -> Result<()> {
    let mut cmd = Cli::command();
    let shell = match shell {
        CompletionShell::Bash => Shell::Bash,
        CompletionShell::Zsh => Shell::Zsh,
        CompletionShell::Fish => Shell::Fish,
        CompletionShell::Powershell => Shell::PowerShell,
    };
    generate(shell, &mut cmd, "lpcheck", &mut io::stdout());
    Ok(())
}
