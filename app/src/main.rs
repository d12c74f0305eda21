#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use chatctl_config::Config;
use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, InfoStrategy, InitStrategy, ServeInput, ServeStrategy, SimulateInput,
    SimulateStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "chatctl")]
#[command(about = "Conversation execution control plane", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run background maintenance until Ctrl+C
    Serve {
        /// Run the maintenance job once immediately
        #[arg(long)]
        run_now: bool,
    },
    /// Run a scripted conversation turn and optionally stop it part-way
    Simulate {
        /// Conversation id (generated when omitted)
        #[arg(short = 'c', long)]
        conversation: Option<String>,

        /// Number of steps in the turn
        #[arg(short = 's', long, default_value_t = 5)]
        steps: usize,

        /// Duration of each step in milliseconds
        #[arg(long, default_value_t = 200)]
        step_ms: u64,

        /// Request a stop this many milliseconds after the turn starts
        #[arg(long)]
        stop_after_ms: Option<u64>,

        /// Make this step (1-based) fail
        #[arg(long)]
        fail_at: Option<usize>,
    },
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = Config::load_or_default()
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    init_tracing(&level)?;

    match cli.command {
        Commands::Serve { run_now } => ServeStrategy.execute(ServeInput { run_now }).await,
        Commands::Simulate {
            conversation,
            steps,
            step_ms,
            stop_after_ms,
            fail_at,
        } => {
            SimulateStrategy
                .execute(SimulateInput {
                    conversation,
                    steps,
                    step_ms,
                    stop_after_ms,
                    fail_at,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
