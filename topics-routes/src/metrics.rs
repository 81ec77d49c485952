//! Prometheus metrics: request count and latency per route, and what each topic write did.
use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use error_stack::{Report, ResultExt};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::time::Instant;
use topics_core::model::TopicUpdate;

const HTTP_REQUESTS: &str = "http_requests_total";
const HTTP_REQUEST_DURATION: &str = "http_requests_duration_seconds";

const TOPICS_RETRIEVED: &str = "topics_retrieved";
const TOPICS_CREATED: &str = "num_topics_created";
const TOPICS_UPDATED: &str = "num_topics_updated";
const TOPICS_DELETED: &str = "num_topics_deleted";

const DURATION_BUCKETS_SECONDS: &[f64] = &[0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Writes against an id that does not exist still succeed, so the outcome tells them apart.
const OUTCOME_APPLIED: &str = "applied";
const OUTCOME_MISSING: &str = "missing";

const REPLACE_MODE: &str = "replace";

#[derive(Debug, thiserror::Error)]
#[error("failed to set up the metrics recorder")]
pub struct MetricsSetupError;

/// Installs the process-wide recorder. A second call fails.
pub fn setup_recorder() -> Result<PrometheusHandle, Report<MetricsSetupError>> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(HTTP_REQUEST_DURATION.to_string()),
            DURATION_BUCKETS_SECONDS,
        )
        .change_context(MetricsSetupError)?
        .install_recorder()
        .change_context(MetricsSetupError)
}

/// Route layer. Scrapes of the metrics endpoint itself are not counted.
pub async fn track_http(req: Request, next: Next) -> Response {
    let route = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };
    if route.ends_with("/metrics") {
        return next.run(req).await;
    }
    let method = req.method().to_string();

    let started = Instant::now();
    let response = next.run(req).await;
    let elapsed = started.elapsed().as_secs_f64();

    let labels = [
        ("method", method),
        ("path", route),
        ("status", response.status().as_u16().to_string()),
    ];
    metrics::counter!(HTTP_REQUESTS, &labels).increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION, &labels).record(elapsed);

    response
}

fn outcome(rows: u64) -> &'static str {
    if rows == 0 {
        OUTCOME_MISSING
    } else {
        OUTCOME_APPLIED
    }
}

/// `views`, `helpful` or `replace`.
pub fn update_mode(update: &TopicUpdate) -> &'static str {
    match update {
        TopicUpdate::Increment(counter) => counter.column(),
        TopicUpdate::Replace(_) => REPLACE_MODE,
    }
}

pub fn record_retrieved(count: usize) {
    metrics::counter!(TOPICS_RETRIEVED).increment(count as u64);
}

pub fn record_created() {
    metrics::counter!(TOPICS_CREATED).increment(1);
}

pub fn record_update(mode: &'static str, touched: u64) {
    metrics::counter!(TOPICS_UPDATED, "mode" => mode, "outcome" => outcome(touched)).increment(1);
}

pub fn record_delete(removed: u64) {
    metrics::counter!(TOPICS_DELETED, "outcome" => outcome(removed)).increment(1);
}
