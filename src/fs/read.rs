use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::types::EntryType;

/// a host file to be stored in an archive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// where to read the content from (empty for padding placeholders)
    pub path: PathBuf,
    /// host file name, extension included
    pub name: String,
    /// size measured when the source was collected
    pub length: u64,
}

impl SourceFile {
    /// measure a host file
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::MissingInput(path.to_path_buf())
            } else {
                Error::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidEntryName(path.display().to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            name,
            length: meta.len(),
        })
    }

    /// zero-length stand-in used when padding a numbered sequence
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            path: PathBuf::new(),
            name: name.into(),
            length: 0,
        }
    }

    /// extension of the host name, if any
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }

    /// name as stored in the directory, before native conversion
    pub fn entry_name(&self, strip_extension: bool) -> &str {
        if strip_extension {
            if let Some(dot) = self.name.rfind('.') {
                return &self.name[..dot];
            }
        }
        &self.name
    }

    /// type tag derived from length and extension
    pub fn entry_type(&self) -> EntryType {
        EntryType::for_file(self.length, self.extension())
    }

    /// read the whole file, checking it still has the measured size
    pub fn read(&self) -> Result<Vec<u8>> {
        let data = fs::read(&self.path).with_path(&self.path)?;
        if data.len() as u64 != self.length {
            return Err(Error::SourceChanged(self.path.clone()));
        }
        Ok(data)
    }
}

/// measure input paths in order
///
/// a directory contributes its regular files (one level, sorted by name).
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|e| Error::Io {
                    path: e.path().map_or_else(|| path.clone(), Path::to_path_buf),
                    source: e.into(),
                })?;
                if entry.file_type().is_file() {
                    sources.push(SourceFile::from_path(entry.path())?);
                }
            }
        } else {
            sources.push(SourceFile::from_path(path)?);
        }
    }
    Ok(sources)
}
