//! extract archive entries to host files

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::archive::Archive;
use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::text::to_host;

/// extract options
#[derive(Clone, Debug, Default)]
pub struct ExtractOptions {
    /// leave out deleted entries
    pub skip_deleted: bool,
    /// add a host extension derived from the entry type
    pub add_extension: bool,
}

/// extract statistics
#[derive(Debug, Default)]
pub struct ExtractStats {
    pub files_written: usize,
    pub bytes_written: u64,
    /// a bad length stopped structured extraction
    pub used_blob_fallback: bool,
}

/// extract entries of the archive at `archive_path` into `dest`
///
/// with non-empty `targets` only entries whose host name equals a target, or
/// matches it as a glob pattern, are written.
pub fn extract(
    archive_path: &Path,
    dest: &Path,
    targets: &[String],
    options: &ExtractOptions,
    config: &Config,
) -> Result<ExtractStats> {
    let archive = Archive::open(archive_path, config)?;
    extract_archive(&archive, dest, targets, options, config)
}

/// extract entries of an archive already in memory
///
/// an entry with a bad length ends structured extraction: every byte from
/// that point to the end of the file goes into one output named after it.
pub fn extract_archive(
    archive: &Archive,
    dest: &Path,
    targets: &[String],
    options: &ExtractOptions,
    config: &Config,
) -> Result<ExtractStats> {
    let matcher = TargetMatcher::new(targets);
    fs::create_dir_all(dest).with_path(dest)?;

    let mut stats = ExtractStats::default();
    let mut cursor = archive.directory().payload_base();

    for entry in archive.entries() {
        let host_name = to_host(&entry.name, config.text_mode);

        if entry.bad_length {
            warn!(
                "entry {} has bad length {:?}, writing the rest of the archive to it",
                host_name, entry.length_text
            );
            let rest = archive.slice(cursor, archive.len().saturating_sub(cursor), &host_name)?;
            let out_path = dest.join(output_name(&host_name)?);
            fs::write(&out_path, rest).with_path(&out_path)?;
            stats.files_written += 1;
            stats.bytes_written += rest.len() as u64;
            stats.used_blob_fallback = true;
            break;
        }

        let start = cursor;
        cursor += entry.length;

        if entry.length == 0 {
            continue;
        }
        if options.skip_deleted && entry.entry_type.is_deleted() {
            continue;
        }
        if !matcher.matches(&host_name) {
            continue;
        }

        let payload = archive.slice(start, entry.length, &host_name)?;

        let mut file_name = output_name(&host_name)?;
        if options.add_extension {
            if let Some(ext) = entry.entry_type.extension() {
                file_name.push('.');
                file_name.push_str(ext);
            }
        }

        let out_path = dest.join(&file_name);
        info!("- {}", file_name);
        fs::write(&out_path, payload).with_path(&out_path)?;
        stats.files_written += 1;
        stats.bytes_written += payload.len() as u64;
    }

    Ok(stats)
}

/// host file name for an entry, with path separators neutralized
fn output_name(host_name: &str) -> Result<String> {
    let name: String = host_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::InvalidEntryName(host_name.to_string()));
    }
    Ok(name)
}

/// selects entries by exact name or glob pattern
struct TargetMatcher {
    targets: Vec<(String, Option<glob::Pattern>)>,
}

impl TargetMatcher {
    fn new(targets: &[String]) -> Self {
        Self {
            targets: targets
                .iter()
                .map(|t| (t.clone(), glob::Pattern::new(t).ok()))
                .collect(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.targets.is_empty()
            || self.targets.iter().any(|(target, pattern)| {
                target == name || pattern.as_ref().is_some_and(|p| p.matches(name))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{encode_entry, encode_header};
    use crate::types::EntryType;
    use tempfile::tempdir;

    fn sample() -> Archive {
        let mut data = encode_header(4);
        data.extend(encode_entry(b"GAME", &EntryType::Program, 3));
        data.extend(encode_entry(b"GONE", &EntryType::Deleted, 0));
        data.extend(encode_entry(b"NOTES", &EntryType::Sequential, 5));
        data.extend(encode_entry(b"DATA", &EntryType::Relative, 2));
        data.extend(b"abcHELLOzz");
        Archive::from_bytes("test.lbr", data, &Config::default()).unwrap()
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_extract_all() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");

        let stats =
            extract_archive(&sample(), &out, &[], &ExtractOptions::default(), &Config::default())
                .unwrap();

        assert_eq!(stats.files_written, 3);
        assert_eq!(stats.bytes_written, 10);
        assert!(!stats.used_blob_fallback);
        assert_eq!(listing(&out), vec!["DATA", "GAME", "NOTES"]);
        assert_eq!(fs::read(out.join("GAME")).unwrap(), b"abc");
        assert_eq!(fs::read(out.join("NOTES")).unwrap(), b"HELLO");
        assert_eq!(fs::read(out.join("DATA")).unwrap(), b"zz");
    }

    #[test]
    fn test_extract_targets() {
        let dir = tempdir().unwrap();
        let targets = vec!["NOTES".to_string(), "D*".to_string()];

        extract_archive(
            &sample(),
            dir.path(),
            &targets,
            &ExtractOptions::default(),
            &Config::default(),
        )
        .unwrap();

        assert_eq!(listing(dir.path()), vec!["DATA", "NOTES"]);
        assert_eq!(fs::read(dir.path().join("DATA")).unwrap(), b"zz");
    }

    #[test]
    fn test_extract_add_extension() {
        let dir = tempdir().unwrap();
        let options = ExtractOptions {
            add_extension: true,
            ..Default::default()
        };

        extract_archive(&sample(), dir.path(), &[], &options, &Config::default()).unwrap();

        assert_eq!(
            listing(dir.path()),
            vec!["DATA.rel", "GAME.prg", "NOTES.seq"]
        );
    }

    #[test]
    fn test_extract_blob_fallback() {
        let mut data = encode_header(3);
        data.extend(encode_entry(b"FIRST", &EntryType::Program, 2));
        data.extend(encode_entry(b"HUGE", &EntryType::Sequential, 2_000_000));
        data.extend(encode_entry(b"LAST", &EntryType::Sequential, 1));
        data.extend(b"12remaining bytes");
        let archive = Archive::from_bytes("bad.lbr", data, &Config::default()).unwrap();
        let dir = tempdir().unwrap();

        let stats =
            extract_archive(&archive, dir.path(), &[], &ExtractOptions::default(), &Config::default())
                .unwrap();

        assert!(stats.used_blob_fallback);
        assert_eq!(listing(dir.path()), vec!["FIRST", "HUGE"]);
        assert_eq!(fs::read(dir.path().join("FIRST")).unwrap(), b"12");
        assert_eq!(
            fs::read(dir.path().join("HUGE")).unwrap(),
            b"remaining bytes"
        );
    }

    #[test]
    fn test_extract_truncated_payload() {
        let mut data = encode_header(1);
        data.extend(encode_entry(b"SHORT", &EntryType::Program, 10));
        data.extend(b"abc");
        let archive = Archive::from_bytes("short.lbr", data, &Config::default()).unwrap();
        let dir = tempdir().unwrap();

        let result =
            extract_archive(&archive, dir.path(), &[], &ExtractOptions::default(), &Config::default());
        assert!(matches!(result, Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_extract_deleted_with_payload_skipped() {
        let mut data = encode_header(2);
        data.extend(b"ODD\rD\r 2 \r");
        data.extend(encode_entry(b"KEEP", &EntryType::Sequential, 1));
        data.extend(b"xxk");
        let archive = Archive::from_bytes("odd.lbr", data, &Config::default()).unwrap();
        let dir = tempdir().unwrap();

        let options = ExtractOptions {
            skip_deleted: true,
            ..Default::default()
        };
        extract_archive(&archive, dir.path(), &[], &options, &Config::default()).unwrap();

        assert_eq!(listing(dir.path()), vec!["KEEP"]);
        assert_eq!(fs::read(dir.path().join("KEEP")).unwrap(), b"k");
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name("A/B").unwrap(), "A_B");
        assert!(matches!(output_name(".."), Err(Error::InvalidEntryName(_))));
        assert!(matches!(output_name(""), Err(Error::InvalidEntryName(_))));
    }
}
