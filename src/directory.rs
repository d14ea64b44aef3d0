//! the directory block at the head of every archive
//!
//! ```text
//! "DWB" SP <count> SP CR
//! { <name> CR <type> CR SP <length> SP CR } x count
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::Path;

use tracing::warn;

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::fs::SourceFile;
use crate::text::{to_host, to_native};
use crate::types::{ArchiveEntry, EntrySpan, EntryType};

/// archive signature
pub const MAGIC: &[u8; 3] = b"DWB";

/// field terminator
pub const CR: u8 = 0x0D;

const SP: u8 = b' ';

/// parsed directory of an archive
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directory {
    entries: Vec<ArchiveEntry>,
    header_end: u64,
    payload_base: u64,
}

impl Directory {
    /// parse a directory from the start of an archive
    ///
    /// `source` names the input in error messages. entries with a bad length
    /// are kept and flagged; callers decide whether that is fatal.
    pub fn parse<R: BufRead>(reader: R, source: &Path, config: &Config) -> Result<Self> {
        let mut fields = FieldReader {
            reader,
            pos: 0,
            source,
            limit: config.max_field_length,
        };

        let mut magic = [0u8; 3];
        match fields.reader.read_exact(&mut magic) {
            Ok(()) => fields.pos += 3,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(Error::InvalidSignature(source.to_path_buf()))
            }
            Err(e) => return Err(e).with_path(source),
        }
        if &magic != MAGIC {
            return Err(Error::InvalidSignature(source.to_path_buf()));
        }

        let count_field = fields.read_field("entry count", "header")?;
        let count_text = trim_spaces(&count_field);
        let count: usize = std::str::from_utf8(count_text)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                Error::MalformedHeader(format!(
                    "entry count {:?}",
                    String::from_utf8_lossy(count_text)
                ))
            })?;
        let header_end = fields.pos;

        let mut entries = Vec::new();
        for index in 0..count {
            let start = fields.pos;
            let name = fields.read_field("name", &format!("entry {} name", index))?;
            let type_start = fields.pos;
            let tag = fields.read_field("type", &format!("entry {} type", index))?;
            let length_start = fields.pos;
            let raw_length = fields.read_field("length", &format!("entry {} length", index))?;
            let end = fields.pos;

            let (length, bad_length, length_text) = parse_length(&raw_length, config);
            if bad_length {
                warn!(
                    "found entry {} with bad length {:?}",
                    to_host(&name, config.text_mode),
                    length_text
                );
            }

            entries.push(ArchiveEntry {
                name,
                entry_type: EntryType::from_tag(&tag),
                length,
                bad_length,
                length_text,
                span: EntrySpan {
                    start,
                    type_start,
                    length_start,
                    end,
                },
            });
        }

        Ok(Self {
            entries,
            header_end,
            payload_base: fields.pos,
        })
    }

    /// read only the directory of an archive file
    pub fn read_from_path(path: &Path, config: &Config) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::ArchiveNotFound(path.to_path_buf())
            } else {
                Error::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        Self::parse(BufReader::new(file), path, config)
    }

    /// entries in on-disk order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is directory empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// offset just past the header line (signature and count)
    pub fn header_end(&self) -> u64 {
        self.header_end
    }

    /// offset where the first payload begins
    pub fn payload_base(&self) -> u64 {
        self.payload_base
    }

    /// offset one past the last declared payload byte
    pub fn payload_end(&self) -> u64 {
        self.payload_base + self.entries.iter().map(ArchiveEntry::payload_len).sum::<u64>()
    }

    /// absolute payload offset of every entry, derived from preceding lengths
    pub fn payload_offsets(&self) -> Vec<u64> {
        let mut offset = self.payload_base;
        self.entries
            .iter()
            .map(|entry| {
                let current = offset;
                offset += entry.payload_len();
                current
            })
            .collect()
    }

    /// first entry whose declared length could not be trusted
    pub fn first_bad_length(&self) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|e| e.bad_length)
    }

    /// serialize the directory back to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = encode_header(self.entries.len());
        for entry in &self.entries {
            out.extend(encode_entry(&entry.name, &entry.entry_type, entry.length));
        }
        out
    }
}

/// encode the header line for `count` entries
pub fn encode_header(count: usize) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    out.extend(format!(" {} ", count).into_bytes());
    out.push(CR);
    out
}

/// encode the type and length fields of an entry
pub fn encode_fields(entry_type: &EntryType, length: u64) -> Vec<u8> {
    let mut out = entry_type.tag().to_vec();
    out.push(CR);
    out.extend(format!(" {} ", length).into_bytes());
    out.push(CR);
    out
}

/// encode a complete directory entry
pub fn encode_entry(name: &[u8], entry_type: &EntryType, length: u64) -> Vec<u8> {
    let mut out = name.to_vec();
    out.push(CR);
    out.extend(encode_fields(entry_type, length));
    out
}

/// encode the directory entry for a host file being added
pub fn encode_source(source: &SourceFile, strip_extension: bool, config: &Config) -> Vec<u8> {
    let name = to_native(source.entry_name(strip_extension), config.text_mode);
    encode_entry(&name, &source.entry_type(), source.length)
}

fn trim_spaces(field: &[u8]) -> &[u8] {
    let start = field.iter().position(|&b| b != SP).unwrap_or(field.len());
    let end = field.iter().rposition(|&b| b != SP).map_or(start, |i| i + 1);
    &field[start..end]
}

/// decode a length field, returning (length, bad, trimmed text)
fn parse_length(raw: &[u8], config: &Config) -> (u64, bool, String) {
    let text = String::from_utf8_lossy(trim_spaces(raw)).into_owned();
    match text.parse::<i64>() {
        Ok(n) if n >= 0 && config.is_sane_length(n as u64) => (n as u64, false, text),
        Ok(n) if n > 0 => (n as u64, true, text),
        _ => (0, true, text),
    }
}

/// reads CR-terminated fields while tracking the stream position
struct FieldReader<'a, R> {
    reader: R,
    pos: u64,
    source: &'a Path,
    limit: usize,
}

impl<R: BufRead> FieldReader<'_, R> {
    /// read one field and consume its terminator
    fn read_field(&mut self, field: &'static str, what: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let (found, used) = {
                let buf = self.reader.fill_buf().with_path(self.source)?;
                if buf.is_empty() {
                    return Err(Error::Truncated {
                        what: what.to_string(),
                    });
                }
                match buf.iter().position(|&b| b == CR) {
                    Some(i) => {
                        out.extend_from_slice(&buf[..i]);
                        (true, i + 1)
                    }
                    None => {
                        out.extend_from_slice(buf);
                        (false, buf.len())
                    }
                }
            };
            self.reader.consume(used);
            self.pos += used as u64;

            if out.len() > self.limit {
                return Err(Error::FieldTooLong {
                    field,
                    limit: self.limit,
                });
            }
            if found {
                return Ok(out);
            }
        }
    }
}
