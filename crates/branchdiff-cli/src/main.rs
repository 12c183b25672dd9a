mod commands;
mod config;
mod formatters;

use std::path::PathBuf;
use std::time::Duration;

use branchdiff_core::{GitBridge, GitRunner};
use clap::{Parser, Subcommand};
use commands::branches::branches_command;
use commands::changes::{changes_command, ChangesOptions};
use commands::default::{default_command, DefaultOptions};
use commands::open::{open_command, OpenOptions};
use commands::show::{show_command, ShowOptions};
use commands::Context;
use formatters::OutputFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "branchdiff",
    version,
    about = "Compare the working tree against the merge-base of a branch"
)]
struct Cli {
    /// Run as if started in this directory
    #[arg(short = 'C', long = "cwd", global = true)]
    cwd: Option<PathBuf>,

    /// git executable to invoke
    #[arg(long, global = true, default_value = "git")]
    git: String,

    /// Kill any git call that runs longer than this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Preferences file (default: $BRANCHDIFF_CONFIG or the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every git invocation to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List local and remote branches, default first
    Branches {
        /// Output format: terminal or json
        #[arg(long, default_value = "terminal")]
        format: String,
    },
    /// List files changed since the merge-base with a branch
    Changes {
        /// Branch or ref to compare against (default: the default branch)
        branch: Option<String>,

        /// Output format: terminal or json
        #[arg(long, default_value = "terminal")]
        format: String,
    },
    /// Print a file as it was at the merge-base with a branch
    Show {
        branch: String,
        /// Repository-relative path as listed by `changes`
        path: String,
    },
    /// Open a file in the diff viewer against its merge-base version
    Open {
        branch: String,
        /// Repository-relative path as listed by `changes`
        path: String,

        /// Viewer command; the base and working files are appended
        #[arg(long, num_args = 1.., allow_hyphen_values = true)]
        tool: Vec<String>,
    },
    /// Show or save the default branch for this repository
    Default {
        branch: Option<String>,

        /// Forget the saved default
        #[arg(long, conflicts_with = "branch")]
        clear: bool,
    },
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut runner = GitRunner::new().with_program(cli.git);
    if let Some(secs) = cli.timeout {
        runner = runner.with_timeout(Duration::from_secs(secs));
    }

    let ctx = Context {
        cwd: cli
            .cwd
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default()),
        bridge: GitBridge::with_runner(runner),
        config_path: cli.config,
    };

    match cli.command {
        Some(Commands::Branches { format }) => {
            branches_command(&ctx, OutputFormat::parse(&format)).await;
        }
        Some(Commands::Changes { branch, format }) => {
            changes_command(
                &ctx,
                ChangesOptions {
                    branch,
                    format: OutputFormat::parse(&format),
                },
            )
            .await;
        }
        Some(Commands::Show { branch, path }) => {
            show_command(&ctx, ShowOptions { branch, path }).await;
        }
        Some(Commands::Open { branch, path, tool }) => {
            open_command(&ctx, OpenOptions { branch, path, tool }).await;
        }
        Some(Commands::Default { branch, clear }) => {
            default_command(&ctx, DefaultOptions { branch, clear }).await;
        }
        None => {
            // Default to the change list against the default branch
            changes_command(
                &ctx,
                ChangesOptions {
                    branch: None,
                    format: OutputFormat::Terminal,
                },
            )
            .await;
        }
    }
}
