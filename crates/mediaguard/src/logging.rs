// Logging setup.
//
// Pipeline code emits `tracing` spans and events, the job store uses the
// `log` macros. `tracing_log::LogTracer` forwards the latter into the same
// subscriber so both end up in one stream.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::MediaGuardError;

/// Builds the filter: `RUST_LOG` wins, `level` is the fallback.
pub fn build_env_filter(level: &str) -> Result<EnvFilter, MediaGuardError> {
    let default_level: LevelFilter = level
        .parse()
        .map_err(|e| MediaGuardError::Logging(format!("Invalid log level '{}': {}", level, e)))?;

    Ok(EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy())
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), MediaGuardError> {
    let filter = build_env_filter(&config.level)?;

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_span_list(true)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
    };

    let subscriber = Registry::default().with(fmt_layer).with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| MediaGuardError::Logging(e.to_string()))?;

    // Bridge `log` records; ok() in case a logger was already installed.
    tracing_log::LogTracer::init().ok();

    tracing::debug!(
        "Logging initialized: level={}, format={:?}",
        config.level,
        config.format
    );

    Ok(())
}
