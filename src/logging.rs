//! Tracing subscriber setup.
//!
//! Filter priority: `YANK_LOG`, then `RUST_LOG`, then the `--verbose` default.
//! With `--log-file` diagnostics go to that file through a non-blocking writer;
//! otherwise they go to stderr, held back while the terminal UI owns the screen.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "YANK_LOG";

/// Stderr output buffered between [`hold_stderr`] and [`release_stderr`].
static HELD_STDERR: Mutex<Option<Vec<u8>>> = Mutex::new(None);

/// Stderr writer for the fmt layer. Writes go to the hold buffer while one is active.
pub struct DeferredStderr;

impl Write for DeferredStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut guard) = HELD_STDERR.lock()
            && let Some(held) = guard.as_mut()
        {
            held.extend_from_slice(buf);
            return Ok(buf.len());
        }
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Start buffering stderr diagnostics, e.g. while the alternate screen is shown.
pub fn hold_stderr() {
    if let Ok(mut guard) = HELD_STDERR.lock() {
        guard.get_or_insert_with(Vec::new);
    }
}

/// Stop buffering and print whatever was held.
pub fn release_stderr() -> io::Result<()> {
    match take_held() {
        Some(held) if !held.is_empty() => io::stderr().write_all(&held),
        _ => Ok(()),
    }
}

fn take_held() -> Option<Vec<u8>> {
    HELD_STDERR.lock().ok().and_then(|mut guard| guard.take())
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = build_env_filter(verbose);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file '{}'", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .context("installing tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            let use_ansi = io::IsTerminal::is_terminal(&io::stderr());
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(|| DeferredStderr)
                        .with_ansi(use_ansi)
                        .without_time()
                        .compact(),
                )
                .try_init()
                .context("installing tracing subscriber")?;
            Ok(None)
        }
    }
}

fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    for var in [LOG_ENV, "RUST_LOG"] {
        if let Ok(directives) = std::env::var(var)
            && let Ok(filter) = EnvFilter::try_new(&directives)
        {
            return filter;
        }
    }
    EnvFilter::new(default_level(verbose).as_str().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_lowers_default_level() {
        assert_eq!(default_level(false), Level::WARN);
        assert_eq!(default_level(true), Level::DEBUG);
    }

    #[test]
    fn held_output_is_buffered_until_released() -> io::Result<()> {
        hold_stderr();
        DeferredStderr.write_all(b"WARN export: read error\n")?;
        DeferredStderr.write_all(b"WARN export: stat error\n")?;
        assert_eq!(
            take_held(),
            Some(b"WARN export: read error\nWARN export: stat error\n".to_vec())
        );

        // Nothing held any more, so this goes straight to stderr.
        DeferredStderr.write_all(b"")?;
        assert_eq!(take_held(), None);
        release_stderr()
    }
}
