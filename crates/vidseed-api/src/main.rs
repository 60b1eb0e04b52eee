//! Axum API server binary.

use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vidseed_api::{create_router, ApiConfig, AppState};
use vidseed_pipeline::{init_static_assets, PipelineConfig};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("vidseed=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    info!("Starting vidseed-api");

    let config = ApiConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    info!(
        "config: host={}, port={}, data_root={}, domain={}",
        config.host,
        config.port,
        pipeline_config.data_root.display(),
        pipeline_config.domain
    );

    // One-time static asset init, locked against sibling instances sharing
    // the deploy directory.
    if let Err(e) = init_static_assets(
        &pipeline_config.www_root,
        &pipeline_config.startup_lock_path(),
    ) {
        error!("Failed to initialize static assets: {e}");
        std::process::exit(1);
    }

    let state = match AppState::new(config.clone(), pipeline_config).await {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create application state: {e}");
            std::process::exit(1);
        }
    };

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid bind address");

    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal");
}
