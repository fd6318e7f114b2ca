//! yank: pick files in a directory tree, remember the pick, and copy the files'
//! paths, metadata and contents to the clipboard as one text blob.

pub mod cli;
pub mod clipboard;
pub mod export;
pub mod file_scanner;
pub mod fuzzy;
pub mod logging;
pub mod persistence;
pub mod selection;
pub mod tui;
pub mod utils;
pub mod workflow;
