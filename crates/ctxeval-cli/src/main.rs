//! CLI entrypoint for the context evaluator.

mod cli;

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use ctxeval_core::EvaluationRequest;
use ctxeval_runtime::{health, ContextEvaluator, ProviderRegistry, Settings};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, EvaluateArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }

    match cli.command {
        Command::Health { provider: false } => print_json(&health(), false),
        Command::Health { provider: true } => {
            let settings = load_settings(&cli)?;
            let report = ContextEvaluator::from_settings(&settings)?.health().await;
            print_json(&report, false)?;
            if !report.is_healthy() {
                bail!("Provider {} is not usable", settings.default_llm_provider);
            }
            Ok(())
        }
        Command::Example => print_json(&EvaluationRequest::example(), false),
        Command::Config => {
            let settings = load_settings(&cli)?;
            let registry = ProviderRegistry::with_defaults();
            let kind = settings.default_llm_provider;
            println!("{:#?}", settings);
            match registry.validate(kind, &settings) {
                Ok(()) => println!("provider: {} (ready)", kind),
                Err(e) => println!("provider: {} (not ready: {})", kind, e),
            }
            Ok(())
        }
        Command::Evaluate(ref args) => {
            let settings = load_settings(&cli)?;
            evaluate(args, &settings).await
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    debug!(?settings, "Settings resolved");
    Ok(settings)
}

async fn evaluate(args: &EvaluateArgs, settings: &Settings) -> Result<()> {
    let request = args.to_request()?;
    request.validate()?;

    let evaluator = ContextEvaluator::from_settings(settings)?;
    info!(context_type = %request.context_type, "Evaluating request");

    let result = evaluator.evaluate_request(&request).await;
    print_json(&result, args.compact)
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let output = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", output);
    Ok(())
}
