use crate::config::LoggingConfig;
use crate::error::{FinderError, Result};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with both console and file output.
///
/// `RUST_LOG` wins over the configured default directive. The returned guard
/// flushes the file writer when dropped, so keep it alive for the life of the
/// process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    fs::create_dir_all(&config.dir)?;

    // Daily rotation, written off the request path
    let file_appender = tracing_appender::rolling::daily(&config.dir, &config.file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    let directive: Directive = config.default_directive.parse().map_err(|e| {
        FinderError::Config(format!(
            "Invalid log directive '{}': {}",
            config.default_directive, e
        ))
    })?;

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(directive))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| FinderError::Config(format!("Logging already initialized: {e}")))?;

    Ok(guard)
}

/// Console-only logging for short-lived commands.
pub fn init_console_logging(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
