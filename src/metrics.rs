//! Prometheus metrics.
//!
//! Counter helpers are no-ops until [`init_metrics`] installs a recorder,
//! so services and tests can call them unconditionally.

use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Installs the Prometheus recorder and spawns its upkeep task.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(handle)
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_code_sent() {
    counter!("auth_codes_sent_total").increment(1);
}

pub fn track_code_delivery_failure() {
    counter!("auth_code_delivery_failures_total").increment(1);
}

pub fn track_code_verification(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("auth_code_verifications_total", "status" => status).increment(1);
}

pub fn track_tokens_issued() {
    counter!("auth_token_pairs_issued_total").increment(1);
}

pub fn track_token_refresh(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("auth_token_refreshes_total", "status" => status).increment(1);
}

pub fn track_cleanup(success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("event_cleanups_total", "status" => status).increment(1);
}
