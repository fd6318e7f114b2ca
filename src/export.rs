//! Export: turn a snapshot of selected paths into a clipboard payload and a saved selection.
//!
//! Per-file problems are counted, never fatal. The clipboard is only invoked when
//! at least one file was read, and the selection is saved no matter what, so the
//! user's intent survives files that vanished or could not be copied.

use crate::clipboard::ClipboardSink;
use crate::persistence;
use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, bounded};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What happened to the clipboard step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClipboardOutcome {
    /// Nothing was readable, so the tool was never run.
    #[default]
    NotAttempted,
    Delivered,
    Failed(String),
}

/// The single result of one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Paths in the snapshot, which is also what got saved.
    pub requested: usize,
    /// Paths whose content made it into the payload.
    pub copied: usize,
    pub stat_errors: usize,
    pub read_errors: usize,
    pub clipboard: ClipboardOutcome,
    pub save_error: Option<String>,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        !matches!(self.clipboard, ClipboardOutcome::Failed(_)) && self.save_error.is_none()
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.is_success() {
            parts.push(if self.requested == 0 {
                "Selection cleared.".to_string()
            } else if self.copied > 0 {
                format!("Copied {} file(s), saved selection.", self.copied)
            } else {
                format!(
                    "Saved selection ({}), but no content read/processed.",
                    self.requested
                )
            });
        }
        if let ClipboardOutcome::Failed(e) = &self.clipboard {
            parts.push(format!("Clipboard Error: {}.", e));
        }
        if let Some(e) = &self.save_error {
            parts.push(format!("Save Error: {}.", e));
        }
        if self.read_errors > 0 {
            parts.push(format!("{} read err(s).", self.read_errors));
        }
        if self.stat_errors > 0 {
            parts.push(format!("{} stat err(s).", self.stat_errors));
        }
        f.write_str(&parts.join(" "))
    }
}

/// The aggregated clipboard text plus per-file bookkeeping.
#[derive(Debug, Default)]
pub struct Payload {
    pub content: Vec<u8>,
    pub copied: usize,
    pub stat_errors: usize,
    pub read_errors: usize,
}

/// Read every path under `root` and concatenate header + content blocks.
///
/// Each block is `--- FILENAME: <path> | Modified: <time> | Size: <n> bytes ---`,
/// a newline, the raw bytes, then a blank line.
pub fn build_payload(root: &Path, paths: &[String]) -> Payload {
    let mut payload = Payload::default();
    for relative in paths {
        let full_path = root.join(relative);
        let metadata = match fs::metadata(&full_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("stat error {}: {}", relative, e);
                payload.stat_errors += 1;
                continue;
            }
        };
        let content = match fs::read(&full_path) {
            Ok(content) => content,
            Err(e) => {
                warn!("read error {}: {}", relative, e);
                payload.read_errors += 1;
                continue;
            }
        };

        let modified = metadata
            .modified()
            .map(|time| DateTime::<Local>::from(time).format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let header = format!(
            "--- FILENAME: {} | Modified: {} | Size: {} bytes ---\n",
            relative,
            modified,
            metadata.len()
        );
        payload.content.extend_from_slice(header.as_bytes());
        payload.content.extend_from_slice(&content);
        payload.content.extend_from_slice(b"\n\n");
        payload.copied += 1;
    }
    payload
}

/// Run the whole export synchronously.
pub fn export(root: &Path, paths: &[String], clipboard: &dyn ClipboardSink) -> ExportReport {
    let started = Instant::now();
    let payload = build_payload(root, paths);

    let clipboard_outcome = if payload.copied > 0 {
        match clipboard.copy(&payload.content) {
            Ok(()) => ClipboardOutcome::Delivered,
            Err(e) => {
                warn!("clipboard error: {}", e);
                ClipboardOutcome::Failed(e.to_string())
            }
        }
    } else {
        if !paths.is_empty() {
            info!("skip clipboard: no content could be read/processed");
        }
        ClipboardOutcome::NotAttempted
    };

    let save_error = persistence::save(root, paths).err().map(|e| {
        warn!("{}", e);
        e.to_string()
    });

    let report = ExportReport {
        requested: paths.len(),
        copied: payload.copied,
        stat_errors: payload.stat_errors,
        read_errors: payload.read_errors,
        clipboard: clipboard_outcome,
        save_error,
    };
    info!("{} ({:.2}s)", report, started.elapsed().as_secs_f64());
    report
}

/// Run [`export`] on its own thread. The receiver yields exactly one report.
pub fn spawn_export(
    root: PathBuf,
    paths: Vec<String>,
    clipboard: Arc<dyn ClipboardSink>,
) -> io::Result<Receiver<ExportReport>> {
    let (tx, rx) = bounded(1);
    thread::Builder::new()
        .name("export".to_string())
        .spawn(move || {
            let report = export(&root, &paths, clipboard.as_ref());
            // The receiver is gone only if the user already quit.
            let _ = tx.send(report);
        })?;
    Ok(rx)
}
