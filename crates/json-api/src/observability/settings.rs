//! Request-logging knobs read on every request, fixed at startup.

use std::sync::OnceLock;

use crate::config::ServerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RequestSettings {
    pub(super) slow_request_threshold_ms: u64,

    /// Continue an incoming `traceparent`. Only meaningful with export on.
    pub(super) continue_remote_traces: bool,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            slow_request_threshold_ms: 1_000,
            continue_remote_traces: false,
        }
    }
}

impl From<&ServerConfig> for RequestSettings {
    fn from(config: &ServerConfig) -> Self {
        let observability = &config.observability;

        Self {
            slow_request_threshold_ms: observability.slow_request_threshold_ms,
            continue_remote_traces: observability.otel_enabled
                && observability.otel_parent_propagation_enabled,
        }
    }
}

static SETTINGS: OnceLock<RequestSettings> = OnceLock::new();

/// First call wins; later calls are ignored.
pub(super) fn install(settings: RequestSettings) {
    SETTINGS.get_or_init(|| settings);
}

/// Installed settings, or defaults when the server was never initialised
/// (handler tests).
pub(super) fn current() -> RequestSettings {
    SETTINGS.get().copied().unwrap_or_default()
}
