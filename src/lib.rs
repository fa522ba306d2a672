//! # reels-api: Audio Asset Service for the Reels Viewer
//!
//! File-backed HTTP service behind the browser-based "reels" viewer for
//! Japanese sentence flashcards. Two endpoints manage per-card audio clips;
//! a flat directory of immutable files, named to encode the card id and the
//! upload timestamp, is the only persistent state.
//!
//! ## API Surface
//!
//! | Method | Path                | Module             | Auth |
//! |--------|---------------------|--------------------|------|
//! | `GET`  | `/api/get-audio`    | [`routes::audio`]  | yes  |
//! | `POST` | `/api/upload-audio` | [`routes::audio`]  | yes  |
//! | `GET`  | `/audio/*`          | static `ServeDir`  | no   |
//! | `GET`  | `/health/liveness`  | `lib.rs`           | no   |
//! | `GET`  | `/health/readiness` | `lib.rs`           | no   |
//! | `GET`  | `/metrics`          | `lib.rs`           | no   |
//! | `GET`  | `/openapi.json`     | [`openapi`]        | no   |
//!
//! "Auth" applies only when `REELS_AUTH_TOKEN` is configured; by default
//! the API is open, matching the browser client which ships without
//! credentials.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod storage;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Check if metrics are enabled via the `REELS_METRICS_ENABLED` env var.
/// Defaults to `true` when the variable is absent or set to anything other
/// than `"false"`.
fn metrics_enabled() -> bool {
    std::env::var("REELS_METRICS_ENABLED")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true)
}

/// Assemble the full application router with all routes and middleware.
///
/// Health probes, `/metrics`, `/openapi.json`, and the static `/audio/*`
/// files are mounted outside the auth middleware so the browser can reach
/// them without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();
    let metrics_on = metrics_enabled();

    // API routes.
    //
    // Body size limit: 16 MiB, above the writer's own 10 MiB ceiling so an
    // oversized upload reaches the storage-layer FileTooLarge check and the
    // client gets the documented 400 instead of a bare 413.
    let mut api = Router::new()
        .merge(routes::audio::router())
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .layer(from_fn(auth::auth_middleware));

    // Only register the metrics middleware when metrics are enabled.
    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .layer(Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated surface: health probes, the OpenAPI spec, and the
    // asset directory served statically (1:1 path-to-filename mapping).
    let mut unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .merge(openapi::router())
        .nest_service("/audio", ServeDir::new(state.store.dir()));

    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics: Prometheus metrics scrape endpoint.
///
/// Refreshes the asset gauges from the storage directory on each scrape
/// (pull model), then encodes the registry in text exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    match state.store.list(None).await {
        Ok(assets) => {
            let bytes: u64 = assets.iter().map(|a| a.size_bytes).sum();
            metrics.audio_assets_total().set(assets.len() as f64);
            metrics.audio_bytes_total().set(bytes as f64);
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to refresh asset gauges");
        }
    }

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: verifies the storage directory is usable.
///
/// A missing directory is the expected first-run state (the writer creates
/// it lazily), so only an existing non-directory path or an unreadable path
/// makes the probe fail.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::fs::metadata(state.store.dir()).await {
        Ok(meta) if meta.is_dir() => (StatusCode::OK, "ready").into_response(),
        Ok(_) => {
            tracing::warn!(dir = %state.store.dir().display(), "audio path is not a directory");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "audio path is not a directory",
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::OK, "ready").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "audio directory health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "audio directory unreachable").into_response()
        }
    }
}
