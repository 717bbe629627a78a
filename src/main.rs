use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_verdict::{
    artifacts::ModelArtifacts, config::Config, extract::PageFetcher, stopwords, AppContext,
    Analyzer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_verdict=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    info!("Loaded configuration: {:?}", config);

    // Artifacts are loaded once; any failure stops the process before it serves.
    let stop_words = match &config.stopwords_path {
        Some(path) => stopwords::load_from_file(path)
            .with_context(|| format!("failed to read stopwords from {}", path.display()))?,
        None => stopwords::spanish(),
    };
    let artifacts = ModelArtifacts::load(&config.artifact_dir)
        .with_context(|| format!("failed to load model from {}", config.artifact_dir.display()))?;
    let analyzer = Analyzer::from_artifacts(artifacts, stop_words);

    let fetcher = PageFetcher::new(&config.user_agent, config.fetch_timeout())?;

    let metrics = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    let state = Arc::new(AppContext {
        analyzer,
        fetcher,
        metrics: Some(metrics),
    });
    let app = news_verdict::router(state);

    let addr = config.bind_addr()?;
    info!("Starting news verdict service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Shutdown signal received, starting graceful shutdown");
}
