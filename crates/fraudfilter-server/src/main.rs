//! FraudFilter Server
//!
//! HTTP front end for fake product review detection. Accepts CSV uploads
//! or product URLs (via an external scraping service), runs the reviews
//! through the detection pipeline and returns per-product summaries.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

mod config;
mod ingest;
mod routes;
mod scraper;
mod state;

use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "fraudfilter-server")]
#[command(about = "Fake product review detection service", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FRAUDFILTER_CONFIG", default_value = "config.yaml")]
    config: String,

    /// Directory holding vectorizer.json and classifier.json
    #[arg(short, long, env = "FRAUDFILTER_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    /// Scraping service endpoint used by /analyze
    #[arg(short, long, env = "FRAUDFILTER_SCRAPER_URL")]
    scraper_url: Option<String>,

    /// Listen address
    #[arg(short = 'l', long, default_value = "0.0.0.0")]
    listen: String,

    /// Listen port
    #[arg(short = 'P', long, env = "FRAUDFILTER_PORT", default_value = "5000")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    info!("Starting FraudFilter server");

    // Load configuration
    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded");
    info!("Model source: {:?}", config.model.source);
    info!("Review column: {}", config.ingest.text_column);

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Load models and build the pipeline
    let state = state::AppState::new(config, metrics_handle)?;

    let addr: SocketAddr = format!("{}:{}", cli.listen, cli.port).parse()?;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Shutdown signal received, stopping server...");
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("fraudfilter=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fraudfilter=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "fraudfilter_requests_total",
        "Total number of analysis requests by route"
    );
    metrics::describe_counter!(
        "fraudfilter_reviews_classified_total",
        "Reviews classified, by label"
    );
    metrics::describe_counter!(
        "fraudfilter_reviews_skipped_total",
        "Rows dropped for blank review text"
    );
    metrics::describe_counter!(
        "fraudfilter_reviews_failed_total",
        "Reviews that could not be classified"
    );
    metrics::describe_histogram!(
        "fraudfilter_batch_latency_us",
        metrics::Unit::Microseconds,
        "Batch classification latency in microseconds"
    );
    metrics::describe_counter!("fraudfilter_errors_total", "Total number of errors by kind");

    info!("Metrics exporter initialized");
    Ok(handle)
}
