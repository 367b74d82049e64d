use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Shell types for completion generation
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Parser)]
#[command(name = "lpcheck")]
#[command(author, version, about = "Landing page conversion-readiness checker", long_about = None)]
#[command(after_help = r#"Examples:
  lpcheck analyze https://example.com/pricing          Score a live landing page
  lpcheck analyze https://example.com/lp --html lp.html  Score a saved copy
  lpcheck analyze https://example.com/lp --json        Machine-readable result
  lpcheck serve                                        Run the JSON API locally
  lpcheck learn labelled.csv --save                    Fit blend weights from data

Logging:
  RUST_LOG=debug lpcheck analyze <url>                 Show applied caps and the gate
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a landing page
    #[command(after_help = r#"Examples:
  lpcheck analyze https://example.com/crm-software
  lpcheck analyze https://example.com/crm-software --features
  lpcheck analyze https://example.com/crm-software --html saved.html
  lpcheck analyze https://example.com/lp --votes votes.jsonl
  lpcheck analyze https://blocked.example.com --any-status
"#)]
    Analyze {
        /// Page URL (must start with http:// or https://)
        url: String,

        /// Score a local HTML file instead of fetching; the URL still drives
        /// HTTPS and message-match checks
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Also print the extracted feature record
        #[arg(long)]
        features: bool,

        /// Adjust the overall score with votes from a JSON Lines file
        #[arg(long, value_name = "FILE")]
        votes: Option<PathBuf>,

        /// Score non-2xx responses instead of failing
        #[arg(long)]
        any_status: bool,
    },

    /// Serve the analyzer as a JSON API
    #[command(after_help = r#"Examples:
  lpcheck serve
  lpcheck serve --addr 0.0.0.0:8080
  curl 'http://127.0.0.1:3000/api/analyze?url=https://example.com'
"#)]
    Serve {
        /// Listen address (defaults to server.addr from the config file)
        #[arg(long)]
        addr: Option<String>,

        /// Score non-2xx responses instead of failing
        #[arg(long)]
        any_status: bool,
    },

    /// Fit overall blend weights from a labelled CSV
    #[command(after_help = r#"CSV columns (header required, any order):
  bofu,convincing,technical,target_score

Examples:
  lpcheck learn labelled.csv
  lpcheck learn labelled.csv --save    Write the weights to the config file
"#)]
    Learn {
        /// CSV file with pillar scores and a target score per row
        csv: PathBuf,

        /// Store the learned weights in the config file
        #[arg(long)]
        save: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(after_help = r#"Examples:
  lpcheck completions bash > ~/.local/share/bash-completion/completions/lpcheck
  lpcheck completions zsh > ~/.zfunc/_lpcheck
  lpcheck completions fish > ~/.config/fish/completions/lpcheck.fish
"#)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the active configuration as TOML
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with the default scoring policy
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::parse_from([
            "lpcheck",
            "analyze",
            "https://example.com/lp",
            "--json",
            "--any-status",
            "--votes",
            "votes.jsonl",
        ]);
        match cli.command {
            Commands::Analyze {
                url,
                json,
                any_status,
                votes,
                html,
                features,
            } => {
                assert_eq!(url, "https://example.com/lp");
                assert!(json && any_status && !features);
                assert_eq!(votes, Some(PathBuf::from("votes.jsonl")));
                assert!(html.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::parse_from(["lpcheck", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigCommands::Init { force: true })
        ));
    }
}
