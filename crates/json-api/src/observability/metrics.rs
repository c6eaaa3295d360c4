//! Prometheus collectors and the `/metrics` exposition handler.
//!
//! Collectors live in a private registry built on first use. If building it
//! fails, recording becomes a no-op and `/metrics` answers 500; requests are
//! never failed because of metrics.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const DURATION_BUCKETS: [f64; 13] = [
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    community_lifecycle_total: IntCounterVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

fn metrics() -> Option<&'static Metrics> {
    METRICS.get_or_init(Metrics::build).as_ref()
}

/// Create `collector` and register it, logging whichever step failed.
fn register<C>(registry: &Registry, name: &str, collector: prometheus::Result<C>) -> Option<C>
where
    C: Collector + Clone + 'static,
{
    let collector = collector
        .inspect_err(|source| error!(metric = name, "failed to create metric: {source}"))
        .ok()?;

    registry
        .register(Box::new(collector.clone()))
        .inspect_err(|source| error!(metric = name, "failed to register metric: {source}"))
        .ok()?;

    Some(collector)
}

impl Metrics {
    fn build() -> Option<Self> {
        let registry = Registry::new();

        let requests_total = register(
            &registry,
            "requests_total",
            IntCounterVec::new(
                Opts::new(
                    "townhall_json_http_requests_total",
                    "HTTP requests by method, route, status class and status code.",
                ),
                &["method", "route", "status_class", "status_code"],
            ),
        )?;

        let request_duration_seconds = register(
            &registry,
            "request_duration_seconds",
            HistogramVec::new(
                HistogramOpts::new(
                    "townhall_json_http_request_duration_seconds",
                    "HTTP request duration in seconds by method and route.",
                )
                .buckets(DURATION_BUCKETS.to_vec()),
                &["method", "route"],
            ),
        )?;

        let requests_in_flight = register(
            &registry,
            "requests_in_flight",
            IntGauge::new(
                "townhall_json_http_requests_in_flight",
                "HTTP requests currently being served.",
            ),
        )?;

        let community_lifecycle_total = register(
            &registry,
            "community_lifecycle_total",
            IntCounterVec::new(
                Opts::new(
                    "townhall_json_community_lifecycle_total",
                    "Community delete and restore attempts by operation and outcome.",
                ),
                &["operation", "outcome"],
            ),
        )?;

        Some(Self {
            registry,
            requests_total,
            request_duration_seconds,
            requests_in_flight,
            community_lifecycle_total,
        })
    }

    fn encode(&self) -> prometheus::Result<(Vec<u8>, String)> {
        let encoder = TextEncoder::new();
        let mut body = Vec::new();

        encoder.encode(&self.registry.gather(), &mut body)?;

        Ok((body, encoder.format_type().to_owned()))
    }
}

/// Holds the in-flight gauge up for as long as it lives.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard(Option<&'static IntGauge>);

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let gauge = metrics().map(|metrics| &metrics.requests_in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self(gauge)
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.0 {
            gauge.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class(status_code), &code])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a delete or restore attempt by outcome.
pub(crate) fn observe_lifecycle(operation: &str, outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .community_lifecycle_total
            .with_label_values(&[operation, outcome])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let (body, format) = match metrics.encode() {
        Ok(encoded) => encoded,
        Err(source) => {
            error!("failed to encode metrics: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    if let Ok(content_type) = HeaderValue::from_str(&format) {
        res.headers_mut().insert(CONTENT_TYPE, content_type);
    }

    res.render(String::from_utf8_lossy(&body).into_owned());
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[test]
    fn status_codes_group_by_class() {
        assert_eq!(status_class(204), "2xx");
        assert_eq!(status_class(403), "4xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(99), "other");
    }

    #[test]
    fn in_flight_guard_releases_on_drop() {
        let gauge = &metrics().expect("metrics should build").requests_in_flight;
        let guard = InFlightRequestGuard::track();

        assert!(gauge.get() >= 1);

        drop(guard);
    }

    #[tokio::test]
    async fn exposition_lists_recorded_series() -> TestResult {
        observe_request("DELETE", "/communities/{uuid}", 200, 0.042);
        observe_lifecycle("restore", "failure");

        let service = Service::new(Router::with_path("metrics").get(metrics_handler));

        let body = TestClient::get("http://localhost/metrics")
            .send(&service)
            .await
            .take_string()
            .await?;

        for name in [
            "townhall_json_http_requests_total",
            "townhall_json_http_request_duration_seconds",
            "townhall_json_http_requests_in_flight",
        ] {
            assert!(body.contains(name), "missing {name}");
        }

        assert!(
            body.contains(
                r#"townhall_json_community_lifecycle_total{operation="restore",outcome="failure"}"#
            ),
            "lifecycle counter should carry operation and outcome labels"
        );

        Ok(())
    }
}
