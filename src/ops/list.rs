use std::fmt;
use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::directory::Directory;
use crate::error::Result;
use crate::order::numeric_order;
use crate::text::to_host;
use crate::types::{ArchiveEntry, EntryType};

/// list options
#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    /// leave out deleted entries
    pub skip_deleted: bool,
    /// order by (name length, name) instead of directory order
    pub numerical_sort: bool,
}

/// one listed entry, rendered for the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub entry_type: EntryType,
    /// type tag as host text
    pub type_name: String,
    pub length: u64,
    pub bad_length: bool,
    length_text: String,
}

impl ListEntry {
    fn new(entry: &ArchiveEntry, config: &Config) -> Self {
        Self {
            name: to_host(&entry.name, config.text_mode),
            entry_type: entry.entry_type.clone(),
            type_name: to_host(entry.entry_type.tag(), config.text_mode),
            length: entry.length,
            bad_length: entry.bad_length,
            length_text: entry.length_text.clone(),
        }
    }
}

/// list the entries of an archive, reading only its directory
pub fn list(archive_path: &Path, options: &ListOptions, config: &Config) -> Result<Vec<ListEntry>> {
    let directory = Directory::read_from_path(archive_path, config)?;
    let basename = archive_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("{} {} entries", basename, directory.len());

    Ok(list_directory(&directory, options, config))
}

/// render a parsed directory
pub fn list_directory(
    directory: &Directory,
    options: &ListOptions,
    config: &Config,
) -> Vec<ListEntry> {
    let mut entries: Vec<&ArchiveEntry> = directory.entries().iter().collect();
    if options.numerical_sort {
        entries.sort_by(|a, b| numeric_order(&a.name, &b.name));
    }

    entries
        .into_iter()
        .filter(|entry| {
            let skip = options.skip_deleted && entry.entry_type.is_deleted();
            if skip {
                info!("[deleted]");
            }
            !skip
        })
        .map(|entry| ListEntry::new(entry, config))
        .collect()
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bad_length {
            write!(f, "{} ({}) {} (bad)", self.name, self.type_name, self.length_text)
        } else {
            write!(f, "{} ({}) {}", self.name, self.type_name, self.length)
        }
    }
}
