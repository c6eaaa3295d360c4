//! Low-cardinality span and metric names.

use uuid::Uuid;

/// `path` with every uuid segment replaced by `{uuid}`, so
/// `/communities/<id>/delete-preview` groups under one route.
pub(super) fn route_template(path: &str) -> String {
    let segments: Vec<&str> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| {
            if Uuid::try_parse(segment).is_ok() {
                "{uuid}"
            } else {
                segment
            }
        })
        .collect();

    format!("/{}", segments.join("/"))
}

/// OpenTelemetry HTTP server span name: `{method} {route}`.
pub(super) fn span_name(method: &str, route: &str) -> String {
    format!("{method} {route}")
}
