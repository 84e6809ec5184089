//! Market Predictor service entry point.

use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use market_predictor::api::{create_router, AppState};
use market_predictor::config::Config;
use market_predictor::error::StartupError;
use market_predictor::metrics;
use market_predictor::utils::shutdown_signal;

/// Market Predictor HTTP service.
#[derive(Parser, Debug)]
#[command(name = "market-predictor")]
#[command(about = "HTTP service with health, status, metrics, and addition endpoints")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default).
    Run,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Run) | None => cmd_run(args.verbose).await,
    }
}

/// Initialize the tracing subscriber. LOG_LEVEL seeds the filter;
/// RUST_LOG and --verbose override it.
fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("market_predictor=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Run the HTTP service.
async fn cmd_run(verbose: bool) -> anyhow::Result<()> {
    // Fail fast before anything else starts; the error enumerates
    // every missing required variable.
    let config = Config::load().context("configuration load failed")?;

    init_tracing(&config, verbose);

    let prometheus_handle =
        metrics::install_recorder().context("failed to install Prometheus recorder")?;
    metrics::init_metrics();

    info!(
        "starting {} v{}",
        config.service_name, config.service_version
    );
    info!("environment: {}", config.environment);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = TcpListener::bind((config.api_host.as_str(), config.api_port))
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;
    let local_addr: SocketAddr = listener.local_addr()?;

    info!("HTTP server listening on {}", local_addr);
    info!("metrics available at /metrics");
    info!("API docs available at /docs");

    let service_name = config.service_name.clone();
    let state = AppState::new(config, prometheus_handle);
    let router = create_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("{} shut down", service_name);
    Ok(())
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("MARKET PREDICTOR - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Service: {} v{}", config.service_name, config.service_version);
    println!("  Environment: {}", config.environment);
    println!("  Bind Address: {}:{}", config.api_host, config.api_port);
    println!("  API Prefix: {}", config.api_prefix);
    println!("  Log Level: {}", config.log_level);
    println!("  Debug: {}", config.debug);
    println!("  Model Type: {}", config.model_type);
    println!("  Cache TTL: {}s", config.cache_ttl);
    println!("  Metrics Enabled: {}", config.metrics_enabled);
    println!("  Health Check Interval: {}s", config.health_check_interval);
    println!("  Request Timeout: {}s", config.request_timeout);
    println!("  Max Concurrent Requests: {}", config.max_concurrent_requests);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}
