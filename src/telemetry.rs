use crate::config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` (default `info`), with `sqlx` held at `warn` so
/// per-statement logging does not drown the service's own events.
///
/// # Errors
/// Returns an error if a filter directive fails to parse or a subscriber is already set.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into())
        .add_directive("sqlx=warn".parse()?)
        .add_directive("hyper=warn".parse()?);

    let registry = Registry::default().with(filter);

    match config.log_format {
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer()).try_init()?;
        }
        LogFormat::Json => {
            registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
        }
    }

    Ok(())
}
