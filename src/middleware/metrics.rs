//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. The domain gauges (asset count and total bytes on disk) are
//! updated on each `/metrics` scrape (pull model), see the metrics handler
//! in `lib.rs`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prometheus::core::Collector;
use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    // -- HTTP middleware metrics (push model) --
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    // -- Domain gauges (pull model, updated on /metrics scrape) --
    audio_assets_total: prometheus::Gauge,
    audio_bytes_total: prometheus::Gauge,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("reels_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "reels_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new(
                "reels_http_errors_total",
                "Total HTTP errors (4xx and 5xx)",
            ),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let audio_assets_total = prometheus::Gauge::new(
            "reels_audio_assets_total",
            "Audio assets currently on disk",
        )
        .expect("metric can be created");

        let audio_bytes_total = prometheus::Gauge::new(
            "reels_audio_bytes_total",
            "Total bytes of audio assets on disk",
        )
        .expect("metric can be created");

        // Register all metrics.
        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_errors_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(audio_assets_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(audio_bytes_total.clone()))
            .expect("metric can be registered");

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                audio_assets_total,
                audio_bytes_total,
            }),
        }
    }

    /// Return current total request count (sum across all labels).
    pub fn requests(&self) -> u64 {
        let mut total = 0u64;
        for mf in &self.inner.http_requests_total.collect() {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// Return current total error count (sum across all labels).
    pub fn errors(&self) -> u64 {
        let mut total = 0u64;
        for mf in &self.inner.http_errors_total.collect() {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// Record an HTTP request (called by the middleware).
    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    /// Access the asset count gauge for updating.
    pub fn audio_assets_total(&self) -> &prometheus::Gauge {
        &self.inner.audio_assets_total
    }

    /// Access the asset byte total gauge for updating.
    pub fn audio_bytes_total(&self) -> &prometheus::Gauge {
        &self.inner.audio_bytes_total
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer)
            .map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware that records HTTP request metrics via Prometheus.
///
/// The API surface has fixed paths (no path parameters), so the raw request
/// path is safe to use as a label without cardinality concerns.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        let status = response.status().as_u16();
        m.record_request(&method, &path, status, duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_metrics_new_starts_at_zero() {
        let m = ApiMetrics::new();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
    }

    #[test]
    fn requests_increments() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/api/get-audio", 200, 0.01);
        assert_eq!(m.requests(), 1);
        m.record_request("POST", "/api/upload-audio", 200, 0.02);
        assert_eq!(m.requests(), 2);
    }

    #[test]
    fn errors_count_4xx_and_5xx() {
        let m = ApiMetrics::new();
        m.record_request("POST", "/api/upload-audio", 400, 0.01);
        m.record_request("GET", "/api/get-audio", 500, 0.01);
        m.record_request("GET", "/api/get-audio", 200, 0.01);
        assert_eq!(m.requests(), 3);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn gauges_appear_in_encoded_output() {
        let m = ApiMetrics::new();
        m.audio_assets_total().set(3.0);
        m.audio_bytes_total().set(6144.0);
        let text = m.gather_and_encode().unwrap();
        assert!(text.contains("reels_audio_assets_total 3"));
        assert!(text.contains("reels_audio_bytes_total 6144"));
    }

    #[test]
    fn clone_shares_registry() {
        let m = ApiMetrics::new();
        let clone = m.clone();
        clone.record_request("GET", "/api/get-audio", 200, 0.01);
        assert_eq!(m.requests(), 1);
    }
}
