//! Logging Module
//!
//! Structured logging for diagnostics: daily-rolling file output under the
//! app data dir, plus a pretty console layer in debug builds.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber
pub fn init() {
    let log_dir = log_directory();
    let _ = std::fs::create_dir_all(&log_dir);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(RollingFileAppender::new(Rotation::DAILY, &log_dir, "motoconnect.log"));

    #[cfg(debug_assertions)]
    let console_layer = Some(fmt::layer().with_target(true).pretty());
    #[cfg(not(debug_assertions))]
    let console_layer: Option<fmt::Layer<_>> = None;

    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer),
    );
}

fn default_filter() -> EnvFilter {
    #[cfg(debug_assertions)]
    {
        EnvFilter::new("debug,hyper=warn,reqwest=warn")
    }
    #[cfg(not(debug_assertions))]
    {
        EnvFilter::new("info,hyper=warn,reqwest=warn")
    }
}

fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("MotoConnect")
        .join("logs")
}
