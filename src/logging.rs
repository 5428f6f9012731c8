//! Logging setup.
//!
//! `info` by default, `debug` with `--debug`; `RUST_LOG` takes precedence
//! over both. Events go to stderr so they stay out of the CLI's stdout
//! output. With `--log` every event is also appended to [`LOG_FILE`].

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::XlBarcodeError;

/// Log file written with `--log`, relative to the working directory.
pub const LOG_FILE: &str = "logfile.log";

/// Default filter directive for the given verbosity.
pub fn default_directive(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Install the global subscriber. Call once at startup.
pub fn init(debug: bool, log_file: Option<&Path>) -> Result<(), XlBarcodeError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| XlBarcodeError::Io(std::io::Error::other(e.to_string())))
}
