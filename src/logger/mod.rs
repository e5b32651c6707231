//! Logger Module
//!
//! Logging built on `tracing-subscriber`:
//! - Console output with color control and a selectable format
//! - Optional file output (Full, Compact or JSON)
//! - Level filtering with `EnvFilter` directives
//!
//! The logger is created once at process start by [`init_logger`]. The
//! returned handle must be kept alive by the caller and shut down on exit so
//! buffered file output reaches the disk.

pub mod config;
pub mod error;
pub(crate) mod writer;

pub use config::*;
pub use error::LoggerError;

use std::io::IsTerminal;

use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, MakeWriter},
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
};
use writer::LogFileWriter;

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Owner of the process-wide logging pipeline.
///
/// Dropping the handle flushes the file output; [`LoggerHandle::shutdown`]
/// does the same and reports the flush result.
pub struct LoggerHandle {
    pub(crate) file: Option<LogFileWriter>,
}

impl LoggerHandle {
    /// Flush pending file output
    pub fn flush(&self) -> Result<(), LoggerError> {
        if let Some(file) = &self.file {
            file.flush()?;
        }
        Ok(())
    }

    /// Flush and release the logger at process exit
    pub fn shutdown(self) -> Result<(), LoggerError> {
        self.flush()
    }
}

impl Drop for LoggerHandle {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = file.flush();
        }
    }
}

/// Initialize the global subscriber with the given configuration
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<LoggerHandle> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    // File layer goes first so console ANSI settings don't leak into span fields
    // written to the file (tokio-rs/tracing#1817).
    let file = if config.file.enabled {
        let writer = LogFileWriter::new(&config.file)?;
        layers.push(format_layer(config.file.format, false, writer.clone()));
        Some(writer)
    } else {
        None
    };

    if config.console.enabled {
        let use_ansi = config.console.colored && std::io::stdout().is_terminal();
        layers.push(format_layer(config.console.format, use_ansi, std::io::stdout));
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()?;

    Ok(LoggerHandle { file })
}

fn format_layer<W>(format: LogFormat, ansi: bool, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Full => fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_writer(writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .compact()
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_writer(writer)
            .boxed(),
    }
}
