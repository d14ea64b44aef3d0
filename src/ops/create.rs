//! build a new archive from host files

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{Config, MAX_PAD_ENTRIES};
use crate::directory::{encode_header, encode_source};
use crate::error::{Error, IoResultExt, Result};
use crate::fs::{collect_sources, write_atomic, SourceFile};
use crate::order::{leading_number, numeric_order};

/// create options
#[derive(Clone, Debug, Default)]
pub struct CreateOptions {
    /// sort entries by (name length, name)
    pub numerical_sort: bool,
    /// fill gaps in a numbered sequence with deleted entries (needs sort)
    pub numerical_pad: bool,
    /// drop the extension from stored names
    pub strip_extension: bool,
}

/// create statistics
#[derive(Debug, Default)]
pub struct CreateStats {
    pub entries: usize,
    pub placeholders: usize,
    pub payload_bytes: u64,
    pub archive_bytes: u64,
}

/// create an archive at `dest` from the given files and directories
pub fn create(
    dest: &Path,
    inputs: &[PathBuf],
    options: &CreateOptions,
    config: &Config,
) -> Result<CreateStats> {
    let sources = collect_sources(inputs)?;
    create_from_sources(dest, sources, options, config)
}

/// create an archive from already measured sources
pub fn create_from_sources(
    dest: &Path,
    mut sources: Vec<SourceFile>,
    options: &CreateOptions,
    config: &Config,
) -> Result<CreateStats> {
    let mut placeholders = 0;
    if options.numerical_sort {
        sources.sort_by(|a, b| numeric_order(a.name.as_bytes(), b.name.as_bytes()));
        if options.numerical_pad {
            let before = sources.len();
            sources = pad_numeric(sources)?;
            placeholders = sources.len() - before;
        }
    }

    let mut directory = encode_header(sources.len());
    for source in &sources {
        info!("+ {}", source.name);
        directory.extend(encode_source(source, options.strip_extension, config));
    }

    let payload_bytes: u64 = sources.iter().map(|s| s.length).sum();

    let archive_bytes = write_atomic(dest, |out| {
        out.write_all(&directory).with_path(dest)?;
        let mut written = directory.len() as u64;
        for source in sources.iter().filter(|s| s.length > 0) {
            let data = source.read()?;
            out.write_all(&data).with_path(dest)?;
            written += data.len() as u64;
        }
        Ok(written)
    })?;

    Ok(CreateStats {
        entries: sources.len(),
        placeholders,
        payload_bytes,
        archive_bytes,
    })
}

/// insert zero-length entries for every number missing from a sorted sequence
///
/// the first and last names bound the range; both are read as leading digits.
/// ranges longer than `MAX_PAD_ENTRIES` are refused before anything is allocated.
fn pad_numeric(sources: Vec<SourceFile>) -> Result<Vec<SourceFile>> {
    let first = sources.first().map_or(0, |s| leading_number(&s.name));
    let last = sources.last().map_or(0, |s| leading_number(&s.name));
    if last <= first {
        return Err(Error::PadDirection { first, last });
    }
    if last - first >= MAX_PAD_ENTRIES {
        return Err(Error::PadRange {
            first,
            last,
            limit: MAX_PAD_ENTRIES,
        });
    }

    let mut padded = Vec::with_capacity(sources.len());
    let mut next = first;
    for source in sources {
        let number = leading_number(&source.name);
        while next < number && next < last {
            padded.push(SourceFile::placeholder(next.to_string()));
            next += 1;
        }
        next = next.max(number.saturating_add(1));
        padded.push(source);
    }
    Ok(padded)
}
