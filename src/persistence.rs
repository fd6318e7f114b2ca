//! The per-directory selection record.
//!
//! The record is a plain text file named [`RECORD_FILE_NAME`] directly under the
//! scanned root, holding one relative path per line. An empty selection removes it.
//! Writes go to a sibling temp file that is renamed over the record.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const RECORD_FILE_NAME: &str = ".yank";

const TEMP_SUFFIX: &str = ".tmp";

/// Owner read/write, group read, nothing for others.
#[cfg(unix)]
const RECORD_MODE: u32 = 0o640;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reading persistence file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed write persistence file '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed remove persistence file '{}': {source}", path.display())]
    Remove { path: PathBuf, source: io::Error },
}

pub fn record_path(root: &Path) -> PathBuf {
    root.join(RECORD_FILE_NAME)
}

/// Read the saved selection for `root`. A missing record is an empty selection.
///
/// Entries are returned as written, minus surrounding whitespace and blank lines;
/// validation against the current inventory is the scanner's job. Invalid UTF-8
/// is decoded lossily, so such a line simply matches nothing.
pub fn load(root: &Path) -> Result<Vec<String>, StoreError> {
    let path = record_path(root);
    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(StoreError::Read { path, source }),
    };
    Ok(content
        .split(|&b| b == b'\n')
        .map(String::from_utf8_lossy)
        .map(|line| line.trim().to_owned())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Replace the saved selection for `root` with `paths`, or delete it when `paths` is empty.
pub fn save(root: &Path, paths: &[String]) -> Result<(), StoreError> {
    let path = record_path(root);
    if paths.is_empty() {
        return match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Remove { path, source }),
        };
    }

    let content = paths.join("\n");
    let temp_path = temp_path(&path);
    let result = write_record(&temp_path, content.as_bytes())
        .and_then(|()| fs::rename(&temp_path, &path));
    if let Err(source) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::Write { path, source });
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn write_record(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(RECORD_MODE);
    }

    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // `mode` only applies on creation; tighten a temp file left by a crashed run.
        file.set_permissions(fs::Permissions::from_mode(RECORD_MODE))?;
    }
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn owned(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn missing_record_loads_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        assert!(load(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn save_then_load_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let paths = owned(&["a.txt", "src/c.go", ".hidden/b.txt"]);
        save(dir.path(), &paths)?;
        assert_eq!(load(dir.path())?, paths);

        let raw = fs::read_to_string(record_path(dir.path()))?;
        assert_eq!(raw, "a.txt\nsrc/c.go\n.hidden/b.txt");
        Ok(())
    }

    #[test]
    fn save_overwrites_previous_record() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        save(dir.path(), &owned(&["one", "two", "three"]))?;
        save(dir.path(), &owned(&["four"]))?;
        assert_eq!(load(dir.path())?, owned(&["four"]));
        Ok(())
    }

    #[test]
    fn empty_save_deletes_record() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        save(dir.path(), &owned(&["a.txt"]))?;
        assert!(record_path(dir.path()).exists());

        save(dir.path(), &[])?;
        assert!(!record_path(dir.path()).exists());

        // Deleting an absent record is fine.
        save(dir.path(), &[])?;
        Ok(())
    }

    #[test]
    fn load_skips_blank_lines_and_whitespace() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(record_path(dir.path()), "  a.txt \n\n\r\nsrc/c.go\r\n")?;
        assert_eq!(load(dir.path())?, owned(&["a.txt", "src/c.go"]));
        Ok(())
    }

    #[test]
    fn invalid_utf8_lines_load_lossily() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(record_path(dir.path()), b"a.txt\n\xff\xfe.txt")?;
        assert_eq!(
            load(dir.path())?,
            owned(&["a.txt", "\u{FFFD}\u{FFFD}.txt"])
        );
        Ok(())
    }

    #[test]
    fn save_replaces_record_without_leaving_temp_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        save(dir.path(), &owned(&["one", "two"]))?;
        save(dir.path(), &owned(&["three"]))?;

        assert_eq!(fs::read_to_string(record_path(dir.path()))?, "three");
        let names = fs::read_dir(dir.path())?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        assert_eq!(names, vec![std::ffi::OsString::from(RECORD_FILE_NAME)]);
        Ok(())
    }

    #[test]
    fn stale_temp_file_is_overwritten() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let stale = temp_path(&record_path(dir.path()));
        fs::write(&stale, "half-written garbage that is longer")?;

        save(dir.path(), &owned(&["a.txt"]))?;
        assert_eq!(load(dir.path())?, owned(&["a.txt"]));
        assert!(!stale.exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn record_has_no_world_access() -> Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        fs::write(record_path(dir.path()), "stale")?;
        fs::set_permissions(record_path(dir.path()), fs::Permissions::from_mode(0o666))?;

        save(dir.path(), &owned(&["a.txt"]))?;
        let mode = fs::metadata(record_path(dir.path()))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
        Ok(())
    }
}
