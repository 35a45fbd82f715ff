use std::path::PathBuf;

use acbo_core::config::AcboConfig;
use acbo_infrastructure::ConfigService;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "acbo")]
#[command(about = "ACBO pilot - side-by-side playback of baseline and quality-first RAG", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/acbo/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Email to sign in with
    #[arg(long, global = true, default_value = "demo@acbo.ai")]
    user: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List demo scenarios and domains
    Scenarios,
    /// Play a demo scenario on both tracks
    Run {
        /// Scenario id, e.g. insurance-claim
        scenario_id: String,
    },
    /// Play a free-form query on a single track
    Query {
        text: String,
        /// Use the baseline track instead of the optimized one
        #[arg(long)]
        baseline: bool,
        /// Ask the RAG backend at backend.base_url instead of playing a canned answer
        #[arg(long)]
        remote: bool,
    },
    /// Run documents through the processing pipeline
    Upload {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Show learning insights and the accuracy history
    Insights,
    /// Show the quality-gate timeline
    Quality,
    /// Select chunks under a token budget
    Budget {
        /// Token budget (defaults to budget.token_limit)
        #[arg(long)]
        tokens: Option<u32>,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

fn init_tracing(config: &AcboConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = config_service.get_config().context("Failed to load configuration")?;
    init_tracing(&config);

    let ctx = commands::Context::new(config, cli.user, cli.json);

    match cli.command {
        Commands::Scenarios => commands::catalog::scenarios(&ctx)?,
        Commands::Run { scenario_id } => commands::run::scenario(&ctx, &scenario_id).await?,
        Commands::Query { text, baseline, remote } => {
            if remote {
                commands::run::remote_query(&ctx, &text, baseline).await?
            } else {
                commands::run::query(&ctx, &text, baseline).await?
            }
        }
        Commands::Upload { names } => commands::upload::run(&ctx, names).await?,
        Commands::Insights => commands::catalog::insights(&ctx)?,
        Commands::Quality => commands::catalog::quality(&ctx)?,
        Commands::Budget { tokens } => commands::catalog::budget(&ctx, tokens)?,
        Commands::Config { init } => commands::config::run(&ctx, &config_service, init)?,
    }

    Ok(())
}
