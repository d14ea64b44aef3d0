use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};

/// write a file atomically
///
/// content goes to a scratch file next to `path`, which is fsynced and then
/// renamed over `path`. the original stays untouched until the rename, and
/// the scratch file is removed again if anything fails before it.
///
/// returns whatever `write` reports (bytes written by convention).
pub fn write_atomic<F>(path: &Path, write: F) -> Result<u64>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<u64>,
{
    let dir = parent_dir(path);
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidEntryName(path.display().to_string()))?;
    let tmp_path = dir.join(format!(
        ".{}.{}.tmp",
        file_name.to_string_lossy(),
        uuid::Uuid::new_v4()
    ));

    let mut scratch = ScratchFile::new(tmp_path.clone());

    let written = {
        let file = File::create(&tmp_path).with_path(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        let written = write(&mut writer)?;
        let file = writer.into_inner().map_err(|e| Error::Io {
            path: tmp_path.clone(),
            source: e.into_error(),
        })?;
        file.sync_all().with_path(&tmp_path)?;
        written
    };

    // keep the original's permissions when replacing it
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(&tmp_path, meta.permissions()).with_path(&tmp_path)?;
    }

    fs::rename(&tmp_path, path).with_path(path)?;
    scratch.persist();

    fsync_dir(&dir)?;

    Ok(written)
}

/// sync a directory to disk
pub fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// removes the scratch file on drop unless it was renamed into place
struct ScratchFile {
    path: PathBuf,
    persisted: bool,
}

impl ScratchFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    fn persist(&mut self) {
        self.persisted = true;
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn dir_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_write_atomic_creates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.lbr");

        let written = write_atomic(&path, |w| {
            w.write_all(b"hello").with_path("new.lbr")?;
            Ok(5)
        })
        .unwrap();

        assert_eq!(written, 5);
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert_eq!(dir_names(dir.path()), vec!["new.lbr"]);
    }

    #[test]
    fn test_write_atomic_replaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.lbr");
        fs::write(&path, "old content").unwrap();

        write_atomic(&path, |w| {
            w.write_all(b"new").with_path("a.lbr")?;
            Ok(3)
        })
        .unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_write_atomic_failure_keeps_original() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.lbr");
        fs::write(&path, "original").unwrap();

        let result = write_atomic(&path, |w| {
            w.write_all(b"partial").with_path("a.lbr")?;
            Err(Error::EntryNotFound("X".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(fs::read(&path).unwrap(), b"original");
        assert_eq!(dir_names(dir.path()), vec!["a.lbr"]);
    }
}
