mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "homeward",
    about = "Stage-gated home-building roadmap — track tasks, verify stages, gate features",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .homeward/ or .git/)
    #[arg(long, global = true, env = "HOMEWARD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize homeward in the current project
    Init,

    /// Show the configured roadmap (stages and required tasks)
    Roadmap,

    /// Show a user's per-stage status
    Status { user: String },

    /// Mark a task complete for a user
    Verify {
        user: String,
        stage: u32,
        task: String,
    },

    /// Move a user's stage ceiling
    Advance {
        user: String,
        target: u32,
        /// Skip ordering checks (administrative override)
        #[arg(long)]
        force: bool,
    },

    /// Show which product features are unlocked for a user
    Features { user: String },

    /// Reset a user's progress to the beginning
    Reset {
        user: String,
        /// Required; resets are irreversible
        #[arg(long)]
        yes: bool,
    },

    /// List known users
    Users,

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Roadmap => cmd::roadmap::run(&root, cli.json),
        Commands::Status { user } => cmd::status::run(&root, &user, cli.json),
        Commands::Verify { user, stage, task } => {
            cmd::verify::run(&root, &user, stage, &task, cli.json)
        }
        Commands::Advance {
            user,
            target,
            force,
        } => cmd::advance::run(&root, &user, target, force, cli.json),
        Commands::Features { user } => cmd::features::run(&root, &user, cli.json),
        Commands::Reset { user, yes } => cmd::reset::run(&root, &user, yes, cli.json),
        Commands::Users => cmd::users::run(&root, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
