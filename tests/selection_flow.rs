use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;
use yank::clipboard::{ClipboardError, ClipboardSink};
use yank::export::{ClipboardOutcome, export};
use yank::file_scanner::load_files_and_selection;
use yank::persistence::{self, RECORD_FILE_NAME};
use yank::selection::{Action, Effect, SelectionModel};

#[derive(Default)]
struct RecordingClipboard {
    payloads: Mutex<Vec<Vec<u8>>>,
}

impl ClipboardSink for RecordingClipboard {
    fn copy(&self, payload: &[u8]) -> Result<(), ClipboardError> {
        self.payloads
            .lock()
            .map_err(|_| ClipboardError::NoStdin("poisoned".to_string()))?
            .push(payload.to_vec());
        Ok(())
    }
}

fn write(root: &Path, rel: &str, content: &str) -> std::io::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

fn focus(model: &mut SelectionModel, path: &str) {
    model.handle(Action::MoveToFirst);
    for _ in 0..model.view_len() {
        if model.focused_path() == Some(path) {
            return;
        }
        model.handle(Action::Move(1));
    }
    assert_eq!(model.focused_path(), Some(path), "{path} not in view");
}

fn confirm(model: &mut SelectionModel) -> Vec<String> {
    match model.handle(Action::Confirm).as_slice() {
        [Effect::StartExport(paths)] => paths.clone(),
        other => panic!("confirm produced {other:?}"),
    }
}

#[test]
fn select_export_and_restore_next_run() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "a.txt", "0123456789")?;
    write(dir.path(), ".hidden/b.txt", "secret")?;
    write(dir.path(), "src/c.go", "package main")?;
    write(dir.path(), ".git/HEAD", "ref: refs/heads/main")?;

    let scan = load_files_and_selection(dir.path())?;
    assert_eq!(scan.inventory, vec![".hidden/b.txt", "a.txt", "src/c.go"]);
    assert!(scan.selected.is_empty());

    let mut model = SelectionModel::new(scan.inventory, scan.selected);
    assert_eq!(model.visible_paths(), vec!["a.txt", "src/c.go"]);

    model.handle(Action::ToggleShowHidden);
    focus(&mut model, ".hidden/b.txt");
    model.handle(Action::ToggleFocused);
    model.handle(Action::ToggleShowHidden);
    assert_eq!(model.visible_paths(), vec![".hidden/b.txt", "a.txt", "src/c.go"]);

    model.handle(Action::StartFilter);
    for c in "a.txt".chars() {
        model.handle(Action::Input(c));
    }
    model.handle(Action::ToggleFocused);
    assert!(model.is_selected("a.txt"));

    let snapshot = confirm(&mut model);
    assert_eq!(snapshot, vec![".hidden/b.txt", "a.txt"]);

    let clipboard = RecordingClipboard::default();
    let report = export(dir.path(), &snapshot, &clipboard);
    assert_eq!(report.copied, 2);
    assert_eq!(report.clipboard, ClipboardOutcome::Delivered);

    let payloads = clipboard.payloads.lock().map_err(|_| "poisoned")?;
    let text = String::from_utf8(payloads[0].clone())?;
    assert!(text.contains("--- FILENAME: a.txt | Modified: "));
    assert!(text.contains(" | Size: 10 bytes ---\n0123456789\n\n"));
    assert!(text.contains(" | Size: 6 bytes ---\nsecret\n\n"));

    // Next run starts from the saved selection.
    let rescan = load_files_and_selection(dir.path())?;
    let mut saved = rescan.selected.clone();
    saved.sort();
    assert_eq!(saved, vec![".hidden/b.txt", "a.txt"]);
    assert!(!rescan.inventory.contains(&RECORD_FILE_NAME.to_string()));

    let model = SelectionModel::new(rescan.inventory, rescan.selected);
    assert_eq!(model.visible_paths(), vec![".hidden/b.txt", "a.txt", "src/c.go"]);
    Ok(())
}

#[test]
fn deleted_selection_keeps_intent() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "missing.txt", "soon gone")?;

    let scan = load_files_and_selection(dir.path())?;
    let mut model = SelectionModel::new(scan.inventory, scan.selected);
    model.handle(Action::ToggleFocused);
    fs::remove_file(dir.path().join("missing.txt"))?;

    let snapshot = confirm(&mut model);
    let clipboard = RecordingClipboard::default();
    let report = export(dir.path(), &snapshot, &clipboard);

    assert_eq!(report.stat_errors, 1);
    assert_eq!(report.clipboard, ClipboardOutcome::NotAttempted);
    assert!(clipboard.payloads.lock().map_err(|_| "poisoned")?.is_empty());
    assert_eq!(persistence::load(dir.path())?, vec!["missing.txt"]);

    // The stale entry is dropped on the following run.
    let rescan = load_files_and_selection(dir.path())?;
    assert!(rescan.selected.is_empty());
    Ok(())
}

#[test]
fn clearing_everything_removes_record() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write(dir.path(), "a.txt", "a")?;
    persistence::save(dir.path(), &["a.txt".to_string()])?;

    let scan = load_files_and_selection(dir.path())?;
    let mut model = SelectionModel::new(scan.inventory, scan.selected);
    assert!(model.is_selected("a.txt"));
    model.handle(Action::ClearAll);

    let snapshot = confirm(&mut model);
    assert!(snapshot.is_empty());
    let report = export(dir.path(), &snapshot, &RecordingClipboard::default());
    assert_eq!(report.to_string(), "Selection cleared.");
    assert!(!persistence::record_path(dir.path()).exists());
    Ok(())
}

#[test]
fn persisted_set_round_trips_through_scan() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let paths = ["z.rs", "a/b/c.rs", ".env", "docs/readme.md"];
    for p in paths {
        write(dir.path(), p, p)?;
    }
    let list: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
    persistence::save(dir.path(), &list)?;

    let mut loaded = load_files_and_selection(dir.path())?.selected;
    let mut expected = list.clone();
    loaded.sort();
    expected.sort();
    assert_eq!(loaded, expected);
    Ok(())
}
