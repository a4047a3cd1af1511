//! NFT Gallery binary.

use nft_gallery::{create_router, AppState, Config};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting NFT Gallery");

    let config: Config = config::Config::builder()
        .add_source(config::File::with_name("gallery").required(false))
        .add_source(config::Environment::with_prefix("GALLERY").try_parsing(true))
        .build()
        .and_then(|c| c.try_deserialize())
        .unwrap_or_else(|e| {
            error!(error = %e, "FATAL: Config error, fix env vars or gallery.toml");
            std::process::exit(1);
        });

    if let Err(e) = config.validate() {
        error!(error = %e, "FATAL: Invalid configuration");
        std::process::exit(1);
    }

    if config.crossmint_api_key.is_none() {
        warn!("GALLERY_CROSSMINT_API_KEY not set, /catalog is disabled");
    }

    info!(
        contract = %config.contract_address,
        rest = %config.rest_url,
        fallback = %config.fallback_url(),
        page_limit = config.page_limit,
        "Configuration loaded"
    );

    let bind_address = config.bind_address.clone();
    let refresh_interval = config.refresh_interval_secs;
    let state = Arc::new(AppState::new(config)?);

    let cancel = CancellationToken::new();
    let refresher = (refresh_interval > 0).then(|| {
        let state_bg = Arc::clone(&state);
        let cancel_bg = cancel.clone();
        tokio::spawn(async move {
            run_refresher(&state_bg, Duration::from_secs(refresh_interval), cancel_bg).await;
        })
    });

    let app = create_router(state.clone());

    info!(address = %bind_address, "Listening");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, stopping catalog refresher...");
    cancel.cancel();
    if let Some(handle) = refresher {
        if let Err(e) = handle.await {
            warn!(error = %e, "Catalog refresher ended abnormally");
        }
    }

    info!("Gallery shut down gracefully");
    Ok(())
}

/// Refresh the contract catalog every `period` until cancelled.
async fn run_refresher(state: &AppState, period: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(period_secs = period.as_secs(), "Catalog refresher started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = state.refresh_catalog().await {
                    warn!(error = %e, "Background catalog refresh failed");
                }
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
