use crate::clipboard::{ClipboardSink, SystemClipboard};
use crate::selection::SelectionModel;
use crate::{cli, file_scanner, tui};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Make `dir` absolute and check that it exists before the terminal is taken over.
pub fn resolve_target_dir(dir: &Path) -> Result<PathBuf> {
    let target = std::path::absolute(dir)
        .with_context(|| format!("resolving directory path '{}'", dir.display()))?;
    let metadata = fs::metadata(&target)
        .with_context(|| format!("target directory '{}'", target.display()))?;
    if !metadata.is_dir() {
        bail!("target directory '{}' is not a directory", target.display());
    }
    Ok(target)
}

/// Scan `root` into a ready model, or a model showing why the scan failed.
pub fn build_model(root: &Path) -> SelectionModel {
    match file_scanner::load_files_and_selection(root) {
        Ok(scan) => {
            info!(
                files = scan.inventory.len(),
                selected = scan.selected.len(),
                "loaded {}",
                root.display()
            );
            SelectionModel::new(scan.inventory, scan.selected)
        }
        Err(e) => {
            error!("failed initial load: {}", e);
            SelectionModel::failed(format!("failed initial load: {}", e))
        }
    }
}

// Main orchestrator: resolve the target, scan it, run the TUI, report the export.
pub fn run_yank(cli_args: cli::Cli) -> Result<()> {
    let root = resolve_target_dir(&cli_args.dir)?;
    let model = build_model(&root);
    let clipboard: Arc<dyn ClipboardSink> = Arc::new(SystemClipboard);

    if let Some(report) = tui::run_tui(model, root, clipboard)? {
        println!("{}", report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Phase;
    use tempfile::tempdir;

    #[test]
    fn resolves_relative_dir_to_absolute() -> Result<()> {
        let resolved = resolve_target_dir(Path::new("."))?;
        assert!(resolved.is_absolute());
        Ok(())
    }

    #[test]
    fn missing_target_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let err = resolve_target_dir(&dir.path().join("missing"))
            .expect_err("missing directory should fail");
        assert!(err.to_string().contains("target directory"));
        Ok(())
    }

    #[test]
    fn file_target_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("file.txt");
        fs::write(&file, "x")?;
        assert!(resolve_target_dir(&file).is_err());
        Ok(())
    }

    #[test]
    fn scan_failure_becomes_failed_model() -> Result<()> {
        let dir = tempdir()?;
        let model = build_model(&dir.path().join("vanished"));
        assert!(matches!(model.phase(), Phase::Failed(msg) if msg.starts_with("failed initial load")));
        Ok(())
    }

    #[test]
    fn builds_model_from_directory() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("a.txt"), "a")?;
        fs::write(dir.path().join(crate::persistence::RECORD_FILE_NAME), "a.txt\n")?;
        let model = build_model(dir.path());
        assert_eq!(model.inventory(), ["a.txt".to_string()]);
        assert_eq!(model.selected_paths(), vec!["a.txt"]);
        Ok(())
    }
}
