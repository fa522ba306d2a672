//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. There is deliberately no in-process cache or
//! index: the [`AudioStore`] directory scan is the source of truth and call
//! volume is low, so `AppState` holds only the store handle and the
//! configuration.

use std::path::PathBuf;

use crate::auth::SecretToken;
use crate::storage::AudioStore;

/// Default storage directory, matching the layout the browser client
/// expects (`/audio/*` maps 1:1 onto files under `public/audio`).
pub const DEFAULT_AUDIO_DIR: &str = "public/audio";

/// Application configuration, assembled from the environment in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Directory audio assets are written to and listed from.
    pub audio_dir: PathBuf,
    /// Static bearer token. `None` disables authentication.
    pub auth_token: Option<SecretToken>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            audio_dir: PathBuf::from(DEFAULT_AUDIO_DIR),
            auth_token: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: the store is just a path handle and every request is an
/// independent filesystem interaction, so no locks are held here.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: AudioStore,
    pub config: AppConfig,
}

impl AppState {
    /// Create application state with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create application state from the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            store: AudioStore::new(config.audio_dir.clone()),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
