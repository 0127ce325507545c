/// xignore: classify a directory tree against ignorefile rules.
///
/// Build tools, packagers and file collectors each invent their own
/// `.something-ignore` file. This binary runs the shared matcher over a
/// directory so the rules can be checked before a tool relies on them.
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use xignore::builders::reporter::ExportFormat;
use xignore::utils::{self, MatchesArgs};

#[derive(Parser)]
#[command(name = "xignore")]
#[command(about = "Classify files and directories against ignorefile glob rules")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every entry under a directory
    Matches {
        /// Directory to classify
        dir: PathBuf,
        /// Ignorefile name (defaults to .xignore or the configured name)
        #[arg(long)]
        ignorefile: Option<String>,
        /// Also apply ignorefiles found in subdirectories
        #[arg(long)]
        nested: bool,
        /// Rule evaluated before the ignorefile's rules (repeatable)
        #[arg(long = "before", value_name = "PATTERN")]
        before: Vec<String>,
        /// Rule evaluated after the ignorefile's rules (repeatable)
        #[arg(long = "after", value_name = "PATTERN")]
        after: Vec<String>,
        /// TOML config file with default options
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format: text, json, yaml or toml
        #[arg(long, default_value = "text")]
        format: ExportFormat,
        /// Write the report to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Validate an ignorefile and list its issues
    Check {
        /// Ignorefile to validate
        file: PathBuf,
    },
    /// Write a default configuration file
    Init {
        /// Where to write it (defaults to ./xignore.toml)
        path: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Matches {
            dir,
            ignorefile,
            nested,
            before,
            after,
            config,
            format,
            output,
        } => {
            let args = MatchesArgs {
                ignorefile,
                nested,
                before,
                after,
                config,
                format,
                output,
                verbose: cli.verbose > 0,
            };
            utils::run_matches(&dir, &args)
        }
        Commands::Check { file } => utils::check_ignorefile(&file),
        Commands::Init { path } => utils::initialize_config(path.as_deref()),
    }
}
