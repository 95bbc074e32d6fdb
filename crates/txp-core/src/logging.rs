//! Tracing integration for structured logging.
//!
//! Shared by the client and server binaries: configurable verbosity,
//! optional file output, text or JSON format.

use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::Result;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

/// Initialize the logging system.
///
/// * `verbosity` - verbosity level (0=error, 1=warn, 2=info, 3=debug, 4+=trace)
/// * `log_file` - optional path to write logs to instead of stderr
/// * `format` - output format (text or JSON)
///
/// `RUST_LOG` overrides the verbosity-derived filter when set.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>, format: LogFormat) -> Result<()> {
    let level = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "txp_core={level},txp_client={level},txp_server={level}"
        ))
    });

    match (log_file, format) {
        (None, LogFormat::Text) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_file(verbosity >= 3)
                        .with_line_number(verbosity >= 3),
                )
                .try_init()
                .map_err(init_failure)?;
        }
        (None, LogFormat::Json) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .try_init()
                .map_err(init_failure)?;
        }
        (Some(path), LogFormat::Text) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(file)
                        .with_ansi(false)
                        .with_target(true),
                )
                .try_init()
                .map_err(init_failure)?;
        }
        (Some(path), LogFormat::Json) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(file))
                .try_init()
                .map_err(init_failure)?;
        }
    }

    Ok(())
}

fn init_failure(e: impl std::fmt::Display) -> crate::Error {
    crate::Error::Io(std::io::Error::other(e.to_string()))
}
