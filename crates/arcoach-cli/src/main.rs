mod nudge;
mod report;
mod services;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "arcoach")]
#[command(about = "Agentic Recruiter Coach: AI-interview adoption nudges")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the daily nudge batch
    Run {
        /// Run even on a Saturday or Sunday
        #[arg(long)]
        force: bool,

        /// Plan decisions without generating, sending, or recording anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Show every recruiter's nudge decision and the reason for it
    Audit {
        /// Print the full audit report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print adoption metrics as JSON
    Metrics {
        /// Restrict output to one recruiter
        #[arg(long)]
        recruiter: Option<String>,
    },
    /// Send a test nudge for one recruiter to the reviewer, ignoring the gate
    Preview {
        #[arg(long)]
        recruiter: String,
    },
    /// Send a fixed prompt to the language model and print the reply
    LlmCheck,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = arcoach_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, "arcoach starting");
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Run { force, dry_run } => {
            // Batch failures are logged, not returned. Sends made before the
            // failure stay recorded.
            if let Err(e) = nudge::run_nudges(&config, force, dry_run).await {
                tracing::error!(error = %format!("{e:#}"), "nudge run aborted");
            }
        }
        Commands::Audit { json } => report::run_audit(&config, json).await?,
        Commands::Metrics { recruiter } => {
            report::run_metrics(&config, recruiter.as_deref()).await?;
        }
        Commands::Preview { recruiter } => nudge::run_preview(&config, &recruiter).await?,
        Commands::LlmCheck => report::run_llm_check(&config).await?,
    }

    Ok(())
}
