use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::{format::FmtSpan, writer::MakeWriterExt};

pub const CLI_PREFIX: &str = "cli";

/// Amount of rotated log files kept around.
const MAX_LOG_FILES: usize = 5;

#[derive(Debug, Clone)]
pub struct LoggingOptions<'a> {
    /// Prefix of the rolling log file names.
    pub prefix: &'a str,
    /// Overrides `RUST_LOG`.
    pub level: Option<LevelFilter>,
    /// Mirror logs to stdout. Files under `logs` are always written.
    pub show_std: bool,
}

/// Sets up the global subscriber. Logs go into `<application_data_path>/logs`, rotated daily.
pub fn enable_logging(application_data_path: &Path, options: LoggingOptions) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(options.prefix)
        .build(application_data_path.join("logs"))?;

    let show_std = options.show_std;
    let stdout = std::io::stdout.with_filter(move |_| show_std);

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter_directive(
            options.level,
            std::env::var("RUST_LOG").ok(),
        )))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .init();
    Ok(())
}

/// Only events of this crate are let through. Explicit level first, then `RUST_LOG`, then debug.
fn filter_directive(level: Option<LevelFilter>, env_level: Option<String>) -> String {
    let level = level
        .map(|v| v.to_string())
        .or(env_level)
        .unwrap_or_else(|| "debug".into());
    format!("{}={level}", env!("CARGO_PKG_NAME").replace("-", "_"))
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
