//! Log output and optional OTLP trace export.
//!
//! Spans are exported only when a collector endpoint is configured. Exported
//! spans carry the deployment domain as `webpay.domain`.

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use opentelemetry::{KeyValue, global, trace::TracerProvider as _};
use opentelemetry_otlp::{Compression, WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    trace::{SdkTracerProvider, Tracer},
};
use std::time::Duration;
use tonic::{
    metadata::{Ascii, MetadataKey, MetadataMap, MetadataValue},
    transport::ClientTlsConfig,
};
use tracing::{Level, debug};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt};
use ulid::Ulid;
use url::Url;

use crate::cli::commands::logging::{LogFormat, Options};

static TRACER_PROVIDER: OnceCell<SdkTracerProvider> = OnceCell::new();

/// Collector address and, for `https`, the name to verify its certificate against.
#[derive(Debug, PartialEq, Eq)]
struct Collector {
    endpoint: String,
    tls_domain: Option<String>,
}

impl Collector {
    /// A bare `host:port` is taken as `https`.
    fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim().trim_end_matches('/');
        let url = if raw.contains("://") {
            Url::parse(raw)
        } else {
            Url::parse(&format!("https://{raw}"))
        }
        .with_context(|| format!("invalid OTLP endpoint: {raw}"))?;

        let tls_domain = match url.scheme() {
            "https" => url.host_str().map(str::to_string),
            "http" => None,
            scheme => return Err(anyhow!("unsupported OTLP endpoint scheme: {scheme}")),
        };

        Ok(Self {
            endpoint: url.as_str().trim_end_matches('/').to_string(),
            tls_domain,
        })
    }
}

/// Build exporter metadata from `key=value` pairs separated by commas.
fn exporter_metadata(raw: &str) -> Result<MetadataMap> {
    let mut metadata = MetadataMap::new();
    for pair in raw.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("OTLP header without '=': {pair}"))?;
        let key = key.trim().to_ascii_lowercase();
        let name = MetadataKey::<Ascii>::from_bytes(key.as_bytes())
            .map_err(|err| anyhow!("invalid OTLP header name {key}: {err}"))?;
        let value: MetadataValue<Ascii> = value
            .trim()
            .parse()
            .map_err(|err| anyhow!("invalid OTLP header value for {key}: {err}"))?;
        metadata.insert(name, value);
    }
    Ok(metadata)
}

fn resource(domain: Option<&str>) -> Resource {
    let mut attributes = vec![
        KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new("service.instance.id", Ulid::new().to_string()),
        KeyValue::new("vcs.commit", crate::GIT_COMMIT_HASH),
    ];
    if let Some(domain) = domain {
        attributes.push(KeyValue::new("webpay.domain", domain.to_string()));
    }
    Resource::builder_empty().with_attributes(attributes).build()
}

fn init_tracer(endpoint: &str, headers: Option<&str>, domain: Option<&str>) -> Result<Tracer> {
    let collector = Collector::parse(endpoint)?;

    let mut builder = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&collector.endpoint)
        .with_compression(Compression::Gzip)
        .with_timeout(Duration::from_secs(3));

    if let Some(tls_domain) = collector.tls_domain {
        builder = builder.with_tls_config(
            ClientTlsConfig::new()
                .domain_name(tls_domain)
                .with_native_roots(),
        );
    }
    if let Some(headers) = headers {
        builder = builder.with_metadata(exporter_metadata(headers)?);
    }

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(builder.build()?)
        .with_resource(resource(domain))
        .build();

    let _ = TRACER_PROVIDER.set(provider.clone());
    global::set_tracer_provider(provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());

    debug!("Exporting traces to {}", collector.endpoint);
    Ok(provider.tracer(env!("CARGO_PKG_NAME")))
}

fn filter(level: Option<Level>) -> Result<EnvFilter> {
    Ok(EnvFilter::builder()
        .with_default_directive(level.unwrap_or(Level::ERROR).into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the collector settings are invalid or a subscriber is
/// already installed.
pub fn init(options: &Options, domain: Option<&str>) -> Result<()> {
    let fmt_layer = match options.format {
        LogFormat::Pretty => fmt::layer().with_target(false).pretty().boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    };

    let otel_layer = match options.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let tracer = init_tracer(endpoint, options.otlp_headers.as_deref(), domain)?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let subscriber = Registry::default()
        .with(fmt_layer)
        .with(otel_layer)
        .with(filter(options.level)?);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Flush pending spans. Does nothing when export is off.
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(err) = provider.shutdown() {
            debug!("Tracer provider shutdown failed: {err}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use opentelemetry::{Key, Value};

    #[test]
    fn bare_collector_address_uses_tls() {
        let collector = Collector::parse("otel.web.pay:4317/").unwrap();
        assert_eq!(collector.endpoint, "https://otel.web.pay:4317");
        assert_eq!(collector.tls_domain.as_deref(), Some("otel.web.pay"));
    }

    #[test]
    fn plain_http_collector_skips_tls() {
        let collector = Collector::parse("http://localhost:4317").unwrap();
        assert_eq!(collector.endpoint, "http://localhost:4317");
        assert_eq!(collector.tls_domain, None);
    }

    #[test]
    fn collector_scheme_is_checked() {
        let err = Collector::parse("udp://localhost:4317").unwrap_err();
        assert!(err.to_string().contains("unsupported OTLP endpoint scheme"));
    }

    #[test]
    fn exporter_metadata_reads_pairs() {
        let metadata =
            exporter_metadata("Authorization=Bearer abc, x-scope = webpay,").unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(
            metadata.get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer abc")
        );
        assert_eq!(
            metadata.get("x-scope").and_then(|v| v.to_str().ok()),
            Some("webpay")
        );
    }

    #[test]
    fn exporter_metadata_rejects_pairs_without_value() {
        let err = exporter_metadata("authorization").unwrap_err();
        assert!(err.to_string().contains("without '='"));
    }

    #[test]
    fn resource_carries_deployment_domain() {
        let resource = resource(Some("web.pay"));
        assert_eq!(
            resource.get(&Key::new("service.name")),
            Some(Value::from(env!("CARGO_PKG_NAME")))
        );
        assert_eq!(
            resource.get(&Key::new("webpay.domain")),
            Some(Value::from("web.pay"))
        );
        assert_eq!(super::resource(None).get(&Key::new("webpay.domain")), None);
    }

    #[test]
    fn shutdown_without_export_is_noop() {
        shutdown_tracer();
    }
}
