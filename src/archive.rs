use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::text::to_host;
use crate::types::{ArchiveEntry, EntrySpan};

/// an archive file loaded whole, with its parsed directory
///
/// built fresh for every operation and dropped at its end.
#[derive(Debug)]
pub struct Archive {
    path: PathBuf,
    data: Vec<u8>,
    directory: Directory,
}

/// where a named entry lives inside an archive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Located {
    /// position in directory order
    pub index: usize,
    /// declared payload length
    pub length: u64,
    /// absolute offset of the first payload byte
    pub payload_offset: u64,
    /// directory positions of the entry's fields
    pub span: EntrySpan,
}

impl Located {
    /// offset one past the last payload byte
    pub fn payload_end(&self) -> u64 {
        self.payload_offset + self.length
    }
}

impl Archive {
    /// read and parse an archive file
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::ArchiveNotFound(path.to_path_buf())
            } else {
                Error::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::from_bytes(path, data, config)
    }

    /// parse an archive already held in memory
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>, config: &Config) -> Result<Self> {
        let path = path.into();
        let directory = Directory::parse(data.as_slice(), &path, config)?;
        Ok(Self {
            path,
            data,
            directory,
        })
    }

    /// path the archive was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// raw archive bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// archive size in bytes
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// is the archive file empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        self.directory.entries()
    }

    /// find the first entry whose host name equals `name`
    ///
    /// the payload offset is the running sum of every earlier entry's length.
    /// with `skip_deleted`, deleted entries never match. a directory holding
    /// any bad length is rejected since offsets past it cannot be derived.
    pub fn locate(&self, name: &str, skip_deleted: bool, config: &Config) -> Result<Located> {
        if let Some(bad) = self.directory.first_bad_length() {
            return Err(Error::BadLength {
                name: to_host(&bad.name, config.text_mode),
                length: bad.length_text.clone(),
            });
        }

        let mut offset = self.directory.payload_base();
        for (index, entry) in self.entries().iter().enumerate() {
            let matches = to_host(&entry.name, config.text_mode) == name
                && !(skip_deleted && entry.entry_type.is_deleted());
            if matches {
                return Ok(Located {
                    index,
                    length: entry.length,
                    payload_offset: offset,
                    span: entry.span,
                });
            }
            offset += entry.length;
        }

        Err(Error::EntryNotFound(name.to_string()))
    }

    /// bytes in `[start, start + length)`, failing if the file ends early
    pub fn slice(&self, start: u64, length: u64, what: &str) -> Result<&[u8]> {
        let truncated = || Error::Truncated {
            what: what.to_string(),
        };
        let start = usize::try_from(start).map_err(|_| truncated())?;
        let length = usize::try_from(length).map_err(|_| truncated())?;
        let end = start.checked_add(length).ok_or_else(truncated)?;
        self.data.get(start..end).ok_or_else(truncated)
    }

    /// payload of a located entry
    pub fn payload(&self, located: &Located) -> Result<&[u8]> {
        self.slice(located.payload_offset, located.length, "entry payload")
    }
}
