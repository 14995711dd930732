use color_eyre::Result;
use color_eyre::eyre::Context;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// Spans are also exported over OTLP when an endpoint is given; the returned
/// provider must be shut down before exit to flush them.
pub fn init_tracing(
    service_name: &str,
    otlp_endpoint: Option<&str>,
    tracing_level: &str,
) -> Result<Option<SdkTracerProvider>> {
    let filter_layer = level_filter(tracing_level)?;
    let fmt_layer = tracing_subscriber::fmt::layer().pretty();

    let Some(otlp_endpoint) = otlp_endpoint else {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
        return Ok(None);
    };

    let resource = Resource::builder()
        .with_attributes(vec![KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            service_name.to_string(),
        )])
        .build();

    let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_endpoint)
        .build()
        .wrap_err("Failed to create OTLP span exporter")?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(otlp_exporter)
        .with_resource(resource)
        .build();
    opentelemetry::global::set_tracer_provider(tracer_provider.clone());
    let tracer = opentelemetry::global::tracer("spotify-chat-commands");

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .init();

    Ok(Some(tracer_provider))
}

fn level_filter(tracing_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(tracing_level).wrap_err("Failed to create tracing filter")
}
