//! Per-request span, request id and completion logging.

mod parent_context;
mod request_ids;
mod spans;

use std::time::Instant;

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use townhall_app::auth::AdminRecord;

use super::{metrics, settings};

pub(crate) const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Probe endpoints scraped on a timer; logging them only adds noise.
const UNLOGGED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

/// Attach the authenticated admin, if any, to the request span.
fn record_admin(span: &Span, depot: &Depot) {
    if let Ok(admin) = depot.obtain::<AdminRecord>() {
        span.record("admin", tracing::field::display(admin.uuid));
        span.record("role", admin.role.as_str());
    }
}

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNLOGGED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let remote_addr = req.remote_addr().to_string();
    let route = spans::route_template(&path);
    let tuning = settings::current();
    let _in_flight_request = metrics::InFlightRequestGuard::track();

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %spans::span_name(&method, &route),
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        admin = tracing::field::Empty,
        role = tracing::field::Empty,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if tuning.continue_remote_traces
        && let Some(parent_context) = parent_context::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent_context)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let duration = started.elapsed();
    let status = request_ids::response_status_or_ok(res.status_code);
    let duration_ms = duration.as_millis();
    let threshold_ms = u128::from(tuning.slow_request_threshold_ms);

    metrics::observe_request(&method, &route, status.as_u16(), duration.as_secs_f64());

    record_admin(&span, depot);
    span.record("status", status.as_u16());
    span.record("duration_ms", duration_ms);

    span.in_scope(|| log_completion(status, duration_ms, threshold_ms));
}

/// One completion event, raised to `warn` for client errors and slow
/// requests and to `error` for server errors. Method, path and request id
/// come from the enclosing span.
fn log_completion(status: StatusCode, duration_ms: u128, threshold_ms: u128) {
    let status = status.as_u16();
    let slow = duration_ms > threshold_ms;

    match status {
        500.. => error!(status, duration_ms, slow, "request failed"),
        400..=499 => warn!(status, duration_ms, slow, "request rejected"),
        _ if slow => warn!(status, duration_ms, threshold_ms, "slow request"),
        _ => info!(status, duration_ms, "request completed"),
    }
}
