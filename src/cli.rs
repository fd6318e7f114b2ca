use clap::Parser;
use std::path::PathBuf;

const KEYBINDINGS_HELP: &str = "\
Keybindings (within the TUI):
  --- Browse mode ---
  j, k, ↓, ↑          Move cursor down/up (PgUp/PgDn page, g/G first/last)
  space, m            Toggle selection for the focused file
  c, C                Clear selection
  .                   Toggle hidden paths (selected hidden paths stay visible)
  /                   Enter filter mode (fuzzy search)
  y, enter            Copy selected files to the clipboard, save selection, quit
  q, ctrl+c           Quit without copying

  --- Filter mode ---
  (type)              Edit the fuzzy query
  backspace           Delete the last query character
  ctrl+j, ctrl+k      Move cursor down/up
  enter               Toggle selection for the focused file
  ctrl+y              Copy selected files, save selection, quit
  esc                 Leave filter mode and clear the query
  ctrl+c              Quit without copying

Each copied file is preceded by a header:
  --- FILENAME: path/to/file.txt | Modified: YYYY-MM-DD HH:MM:SS | Size: NNN bytes ---

The selection is remembered in a '.yank' file in the target directory.
'.git' directories and that '.yank' file are never listed.

Diagnostics raised while the TUI is open are printed after it closes;
use --log-file to keep them in a file instead.";

/// yank – pick files interactively and copy their contents to the clipboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, after_long_help = KEYBINDINGS_HELP)]
pub struct Cli {
    /// Directory to list files from
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Write diagnostics to this file instead of stderr (stderr output is held until the TUI exits)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log debug-level diagnostics (overridden by YANK_LOG / RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}
