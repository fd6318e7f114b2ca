use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard OS unsupported: {0}")]
    Unsupported(String),

    #[error("clipboard dependency missing: requires {0}")]
    ToolMissing(&'static str),

    #[error("failed to start {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("failed get stdin pipe for {0}")]
    NoStdin(String),

    #[error("failed waiting for {program}: {source}")]
    Wait { program: String, source: io::Error },

    #[error("{program} command failed: {status}{}", output_suffix(.output))]
    Failed {
        program: String,
        status: ExitStatus,
        /// Combined stdout/stderr of the tool, trimmed.
        output: String,
    },
}

fn output_suffix(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!("; output: {output}")
    }
}

/// Anything that can take the export payload.
pub trait ClipboardSink: Send + Sync {
    fn copy(&self, payload: &[u8]) -> Result<(), ClipboardError>;
}

/// An external program that reads the clipboard contents from stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandClipboard {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<PathBuf>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Pick the clipboard tool for the host platform.
    pub fn detect() -> Result<Self, ClipboardError> {
        match std::env::consts::OS {
            "macos" => Ok(Self::new("pbcopy", &[])),
            "windows" => Ok(Self::new("clip.exe", &[])),
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Self::detect_unix(),
            other => Err(ClipboardError::Unsupported(other.to_string())),
        }
    }

    fn detect_unix() -> Result<Self, ClipboardError> {
        let wayland = std::env::var_os("WAYLAND_DISPLAY").is_some();
        let candidates: [(&str, &[&str], bool); 3] = [
            ("wl-copy", &[], wayland),
            ("xclip", &["-selection", "clipboard"], true),
            ("xsel", &["--clipboard", "--input"], true),
        ];
        for (name, args, usable) in candidates {
            if !usable {
                continue;
            }
            if let Ok(path) = which::which(name) {
                debug!("using clipboard tool {}", path.display());
                return Ok(Self::new(path, args));
            }
        }
        warn!(
            "clipboard requires 'wl-copy', 'xclip' or 'xsel'; install one via your package manager"
        );
        Err(ClipboardError::ToolMissing("'wl-copy', 'xclip' or 'xsel'"))
    }

    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }
}

impl ClipboardSink for CommandClipboard {
    fn copy(&self, payload: &[u8]) -> Result<(), ClipboardError> {
        let program = self.program_name();
        let spawn_error = |source: io::Error| ClipboardError::Spawn {
            program: program.clone(),
            source,
        };
        // xclip and wl-copy fork a background owner that inherits stdio, so a pipe
        // would never reach EOF. A file holds the output instead.
        let mut output_file = tempfile::tempfile().map_err(spawn_error)?;
        let stdout = output_file.try_clone().map_err(spawn_error)?;
        let stderr = output_file.try_clone().map_err(spawn_error)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(spawn_error)?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClipboardError::NoStdin(program.clone()))?;

        // Feed stdin from its own thread so a tool with a small input buffer
        // cannot deadlock us; dropping the handle closes the pipe.
        let status = thread::scope(|s| {
            let writer = s.spawn(move || {
                let result = stdin.write_all(payload).and_then(|()| stdin.flush());
                drop(stdin);
                result
            });
            let status = child.wait();
            if let Ok(Err(e)) = writer.join() {
                warn!("error writing to {} stdin: {}", program, e);
            }
            status
        })
        .map_err(|source| ClipboardError::Wait {
            program: program.clone(),
            source,
        })?;

        if status.success() {
            return Ok(());
        }
        Err(ClipboardError::Failed {
            program,
            status,
            output: read_output(&mut output_file),
        })
    }
}

/// Whatever the tool wrote so far. Unreadable output counts as none.
fn read_output(file: &mut File) -> String {
    let mut buf = Vec::new();
    match file
        .seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_end(&mut buf))
    {
        Ok(_) => String::from_utf8_lossy(&buf).trim().to_string(),
        Err(e) => {
            debug!("cannot read clipboard tool output: {}", e);
            String::new()
        }
    }
}

/// Detects the platform tool on each copy, so a missing tool is an ordinary copy failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn copy(&self, payload: &[u8]) -> Result<(), ClipboardError> {
        CommandClipboard::detect()?.copy(payload)
    }
}
