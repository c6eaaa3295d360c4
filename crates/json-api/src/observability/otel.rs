//! OTLP span export.

use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, SdkTracerProvider},
};

use crate::config::{ServerConfig, observability::ObservabilityConfig};

use super::ObservabilityError;

fn resource(config: &ObservabilityConfig) -> Resource {
    Resource::builder_empty()
        .with_service_name(config.otel_service_name.clone())
        .with_attributes([
            KeyValue::new("service.version", config.otel_service_version.clone()),
            KeyValue::new(
                "deployment.environment.name",
                config.otel_deployment_environment.clone(),
            ),
        ])
        .build()
}

/// Respect the caller's sampling decision, otherwise sample `ratio` of roots.
fn sampler(ratio: f64) -> Sampler {
    let ratio = if ratio.is_nan() { 1.0 } else { ratio.clamp(0.0, 1.0) };

    Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(ratio)))
}

pub(super) fn build_tracer_provider(
    config: &ServerConfig,
) -> Result<SdkTracerProvider, ObservabilityError> {
    let config = &config.observability;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(config.otel_exporter_otlp_endpoint.clone())
        .with_timeout(Duration::from_secs(config.otel_exporter_otlp_timeout_seconds))
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_sampler(sampler(config.otel_trace_sample_ratio))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource(config))
        .with_batch_exporter(exporter)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_ratio(sampler: &Sampler) -> Option<f64> {
        match sampler {
            Sampler::ParentBased(root) => match root.as_ref() {
                Sampler::TraceIdRatioBased(ratio) => Some(*ratio),
                _ => None,
            },
            _ => None,
        }
    }

    fn samples(ratio: f64, expected: f64) -> bool {
        root_ratio(&sampler(ratio)).is_some_and(|actual| (actual - expected).abs() < f64::EPSILON)
    }

    #[test]
    fn out_of_range_ratios_are_clamped() {
        assert!(samples(1.5, 1.0), "ratio above 1");
        assert!(samples(-0.5, 0.0), "ratio below 0");
        assert!(samples(0.25, 0.25), "ratio in range");
        assert!(samples(f64::NAN, 1.0), "nan samples everything");
    }
}
