use std::error::Error;

pub use tracing;
use tracing::subscriber;
use tracing_subscriber::{EnvFilter, Layer, registry};
use tracing_subscriber::fmt::{self, time::OffsetTime};
use tracing_subscriber::layer::SubscriberExt;

/// Builds the filter from `RUST_LOG`, falling back to `level` for `application_name`.
pub fn build_filter(application_name: &str, level: &str) -> Result<EnvFilter, Box<dyn Error + Send + Sync>> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let filter = EnvFilter::try_new(level)?
        .add_directive(format!("{}={}", application_name, level).parse()?);
    Ok(filter)
}

/// Installs the global subscriber. Logs go to stderr so stdout stays free for the wrapped tool.
pub fn init_logger(application_name: &str, level: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = build_filter(application_name, level)?;
    let timer = OffsetTime::new(time::UtcOffset::UTC, time::format_description::well_known::Rfc3339);
    let filtered = fmt::layer()
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(filter);
    let subscriber = registry::Registry::default()
        .with(filtered);
    subscriber::set_global_default(subscriber)?;
    Ok(())
}
