//! Diagnostics setup.
//!
//! The full-screen display owns the terminal, so log output goes to a file
//! when one is configured, to stderr in batch mode, and nowhere otherwise.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, `warn` when unset or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

pub fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Plain-text subscriber appending to `file`.
pub fn file_subscriber(file: File, filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish()
}

/// Installs the global subscriber. Returns whether one was installed.
pub fn init(log_file: Option<&Path>, batch: bool) -> io::Result<bool> {
    let installed = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing::subscriber::set_global_default(file_subscriber(file, env_filter()))
        }
        None if batch => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .with_writer(io::stderr)
                .finish(),
        ),
        None => return Ok(false),
    };
    installed.map_err(io::Error::other)?;
    Ok(true)
}
