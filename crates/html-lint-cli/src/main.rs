//! html-lint CLI tool.
//!
//! Usage:
//! ```bash
//! html-lint check [OPTIONS] [PATHS]...
//! html-lint dump-tokens <FILE>
//! html-lint dump-events <FILE>
//! html-lint dump-tree <FILE>
//! html-lint list-rules
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// HTML linter with content-model validation
#[derive(Parser)]
#[command(name = "html-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "HTML_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint HTML files
    Check {
        /// Files or directories to lint (default: current directory)
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Exit with an error code on warnings too
        #[arg(long)]
        max_warnings_zero: bool,
    },

    /// Print the token stream of a file
    DumpTokens {
        /// File to tokenize
        file: PathBuf,
    },

    /// Print the event stream of a file
    DumpEvents {
        /// File to parse
        file: PathBuf,
    },

    /// Print the element tree of a file
    DumpTree {
        /// File to parse
        file: PathBuf,
    },

    /// List available rules
    ListRules,
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable diagnostics with source excerpts.
    #[default]
    Text,
    /// JSON report.
    Json,
    /// One line per message.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            paths,
            format,
            rules,
            exclude,
            max_warnings_zero,
        } => {
            let options = commands::check::CheckOptions {
                format,
                rules,
                exclude,
                max_warnings_zero,
            };
            let passed = commands::check::run(&paths, &options, cli.config.as_deref())?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::DumpTokens { file } => commands::dump::tokens(&file, cli.config.as_deref()),
        Commands::DumpEvents { file } => commands::dump::events(&file, cli.config.as_deref()),
        Commands::DumpTree { file } => commands::dump::tree(&file, cli.config.as_deref()),
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
    }
}
