//! Process-wide tracing setup.

use std::path::PathBuf;

use miette::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// How the CLI should log. Built from flags in `main` and handed to
/// [`init_logging`]; nothing is read from the environment here except
/// `RUST_LOG`, which overrides `debug`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub debug: bool,
    pub file: Option<PathBuf>,
}

impl LogConfig {
    pub fn default_directive(&self) -> &'static str {
        if self.debug { "debug" } else { "error" }
    }
}

/// Install the global subscriber. The returned guard flushes the file
/// writer on drop and must live until the process exits.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let (writer, guard) = match &config.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path.file_name().ok_or_else(|| {
                miette::miette!("Log file path {} has no file name", path.display())
            })?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.file.is_none())
        .with_writer(writer)
        .try_init()
        .map_err(|e| miette::miette!("Could not install log subscriber: {e}"))?;

    Ok(guard)
}
