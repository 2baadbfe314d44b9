use std::{fs, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use deepbrief_core::{Config, ConfigLoader, require_env};
use deepbrief_providers::run_research_pipeline;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "deepbrief",
    version,
    about = "Two-stage web research and report generation"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Research a topic and produce a markdown report.
    Run(RunArgs),
    /// Verify configuration and provider credentials without running.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Topic to research.
    #[arg(long, default_value = "The impact of 5G technology on IoT in 2025")]
    topic: String,

    /// Path to a configuration file (defaults to DEEPBRIEF_CONFIG or ./config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the report to a file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Path to a configuration file (defaults to DEEPBRIEF_CONFIG or ./config.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Command::Run(args) => ConfigLoader::load(args.config.clone())?,
        Command::Check(args) => ConfigLoader::load(args.config.clone())?,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let rt = Runtime::new()?;
    rt.block_on(async move {
        match cli.command {
            Command::Run(args) => run_command(&config, args).await?,
            Command::Check(_) => check_command(&config)?,
        }
        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}

async fn run_command(config: &Config, args: RunArgs) -> Result<()> {
    info!(topic = %args.topic, "starting research run");

    let document = run_research_pipeline(config, &args.topic).await;

    match args.output {
        Some(path) => {
            fs::write(&path, &document)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!(path = %path.display(), chars = document.chars().count(), "report written");
        }
        None => println!("{}", document),
    }

    Ok(())
}

fn check_command(config: &Config) -> Result<()> {
    let sections = [
        ("search", &config.search.api_key_env),
        ("research_model", &config.research_model.api_key_env),
        ("report_model", &config.report_model.api_key_env),
    ];

    let mut missing = Vec::new();
    for (section, var) in sections {
        match require_env(var) {
            Ok(_) => info!(section, var = %var, "credential present"),
            Err(err) => {
                eprintln!("{section}: {err}");
                missing.push(var.clone());
            }
        }
    }

    if !missing.is_empty() {
        bail!("missing credentials: {}", missing.join(", "));
    }

    info!(
        search = %config.search.depth,
        research_model = %config.research_model.model,
        report_model = %config.report_model.model,
        "configuration is ready"
    );
    Ok(())
}
