//! Secret Friend CLI entry point.
//!
//! Provides `status`, `draw`, and `insights` subcommands over the library's
//! draw workflow. Every failure is reported as a short status message.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use secret_friend::config::{default_config_path, load_config, Config};
use secret_friend::credentials::{load_default_credentials, Credentials};
use secret_friend::insights::gemini::GeminiInsightGenerator;
use secret_friend::insights::{DisabledInsights, InsightGenerator};
use secret_friend::service::{DrawService, SessionError};
use secret_friend::store::rest::RestStore;

/// Secret Friend: draw your gift-exchange recipient.
#[derive(Parser)]
#[command(name = "secret-friend", version, about)]
struct Cli {
    /// Config file path (default: ~/.secret-friend/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Show who has drawn and who can still log in.
    Status,
    /// Log in as NAME, draw a recipient, save it and reveal it.
    Draw {
        /// Your name as it appears in the group.
        #[arg(long)]
        name: String,
    },
    /// Ask the insight service for a summary of the group.
    Insights,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.json_logs {
        secret_friend::logging::init_json();
    } else {
        secret_friend::logging::init_cli();
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let config = load_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    let credentials = load_default_credentials().context("failed to load credentials")?;

    let mut service = build_service(&config, &credentials)?;

    let outcome = match cli.command {
        Command::Status => handle_status(&mut service).await,
        Command::Draw { name } => handle_draw(&mut service, &name).await,
        Command::Insights => handle_insights(&mut service).await,
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Wire the REST store and insight generator into a draw service.
fn build_service(config: &Config, credentials: &Credentials) -> anyhow::Result<DrawService> {
    let api_key = credentials.require(&config.store.api_key_env)?;
    let store = RestStore::new(
        &config.store.url,
        &config.store.table,
        api_key,
        config.store.write_columns(),
        config.store.timeout(),
    )
    .context("failed to create participant store")?;

    Ok(
        DrawService::new(Arc::new(store), build_insights(config, credentials))
            .with_max_redraw_attempts(config.draw.max_redraw_attempts),
    )
}

/// Pick the insight generator; insights never prevent startup.
fn build_insights(config: &Config, credentials: &Credentials) -> Arc<dyn InsightGenerator> {
    let settings = &config.insights;
    if !settings.enabled {
        info!("insights disabled in config");
        return Arc::new(DisabledInsights);
    }
    let Some(api_key) = credentials.resolve(&settings.api_key_env) else {
        info!(env = %settings.api_key_env, "no insight API key, insights disabled");
        return Arc::new(DisabledInsights);
    };
    match GeminiInsightGenerator::new(
        settings.model.clone(),
        &settings.base_url,
        api_key,
        settings.timeout(),
    ) {
        Ok(generator) => Arc::new(generator),
        Err(e) => {
            warn!(error = %e, "failed to create insight generator, insights disabled");
            Arc::new(DisabledInsights)
        }
    }
}

/// Print the group status without revealing any recipient.
async fn handle_status(service: &mut DrawService) -> Result<(), SessionError> {
    let participants = service.refresh().await?;

    println!("Group status ({})", participants.len());
    for p in participants {
        let marker = if p.has_drawn() { "OK" } else { "-" };
        println!("  {marker:>2}  {}", p.name);
    }

    let waiting: Vec<&str> = service
        .login_candidates()
        .into_iter()
        .map(|p| p.name.as_str())
        .collect();
    if waiting.is_empty() {
        println!("Everyone has drawn.");
    } else {
        println!("Still to draw: {}", waiting.join(", "));
    }
    Ok(())
}

/// Log in, draw, persist and reveal.
async fn handle_draw(service: &mut DrawService, name: &str) -> Result<(), SessionError> {
    service.refresh().await?;
    service.login_by_name(name)?;
    service.draw()?;
    let recipient = service.confirm().await?.name.clone();
    service.logout();

    println!("Draw confirmed! Your secret friend is: {recipient}");
    println!("Keep it to yourself so the next person can draw.");
    Ok(())
}

/// Print a best-effort insight.
async fn handle_insights(service: &mut DrawService) -> Result<(), SessionError> {
    service.refresh().await?;
    match service.insights().await {
        Some(insight) => {
            println!("{}", insight.summary);
            println!();
            println!("Funny fact: {}", insight.funny_fact);
            println!("Recommendation: {}", insight.recommendation);
        }
        None => println!("No insights available right now."),
    }
    Ok(())
}
