//! # reels-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the reels audio asset service.
//! Binds to a configurable port (default 8080).

use std::path::PathBuf;

use reels_api::auth::SecretToken;
use reels_api::state::{AppConfig, AppState, DEFAULT_AUDIO_DIR};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let audio_dir = std::env::var("REELS_AUDIO_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_AUDIO_DIR));

    let auth_token = std::env::var("REELS_AUTH_TOKEN").ok().map(SecretToken::new);
    if auth_token.is_none() {
        tracing::info!("REELS_AUTH_TOKEN not set: API authentication disabled");
    }

    let config = AppConfig {
        port,
        audio_dir,
        auth_token,
    };
    tracing::info!(
        audio_dir = %config.audio_dir.display(),
        "storing audio assets on the filesystem"
    );

    let state = AppState::with_config(config);
    let app = reels_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("reels-api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
