use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// type tag of an archive entry
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// deleted entry, always zero length
    Deleted,
    /// program file (`P`)
    Program,
    /// sequential file (`S`), the default for unknown extensions
    Sequential,
    /// user file (`U`)
    User,
    /// relative file (`R`)
    Relative,
    /// tag not known to this tool, kept verbatim
    Other(Vec<u8>),
}

impl EntryType {
    /// decode a raw directory tag
    pub fn from_tag(tag: &[u8]) -> Self {
        match tag {
            b"D" => EntryType::Deleted,
            b"P" => EntryType::Program,
            b"S" => EntryType::Sequential,
            b"U" => EntryType::User,
            b"R" => EntryType::Relative,
            other => EntryType::Other(other.to_vec()),
        }
    }

    /// raw tag as written in the directory
    pub fn tag(&self) -> &[u8] {
        match self {
            EntryType::Deleted => b"D",
            EntryType::Program => b"P",
            EntryType::Sequential => b"S",
            EntryType::User => b"U",
            EntryType::Relative => b"R",
            EntryType::Other(tag) => tag,
        }
    }

    /// type for a host file of the given length and extension
    ///
    /// empty files become deleted entries; the extension is compared
    /// case-insensitively and anything unrecognized is sequential.
    pub fn for_file(length: u64, extension: Option<&str>) -> Self {
        if length == 0 {
            return EntryType::Deleted;
        }
        match extension.map(str::to_ascii_lowercase).as_deref() {
            Some("prg") => EntryType::Program,
            Some("usr") => EntryType::User,
            Some("rel") => EntryType::Relative,
            _ => EntryType::Sequential,
        }
    }

    /// host file extension used when extracting with extensions
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            EntryType::Program => Some("prg"),
            EntryType::Sequential => Some("seq"),
            EntryType::User => Some("usr"),
            EntryType::Relative => Some("rel"),
            EntryType::Deleted | EntryType::Other(_) => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, EntryType::Deleted)
    }
}

impl FromStr for EntryType {
    type Err = Error;

    /// parse a user supplied type, either the single letter or the extension name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "d" | "del" => Ok(EntryType::Deleted),
            "p" | "prg" => Ok(EntryType::Program),
            "s" | "seq" => Ok(EntryType::Sequential),
            "u" | "usr" => Ok(EntryType::User),
            "r" | "rel" => Ok(EntryType::Relative),
            _ => Err(Error::InvalidType(s.to_string())),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.tag()))
    }
}

/// byte positions of one entry's fields inside the directory
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntrySpan {
    /// first byte of the name field (the entry's directory offset)
    pub start: u64,
    /// first byte of the type field
    pub type_start: u64,
    /// first byte of the length field
    pub length_start: u64,
    /// one past the length field's terminator
    pub end: u64,
}

/// one entry as recorded in an archive directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// name in native encoding
    pub name: Vec<u8>,
    pub entry_type: EntryType,
    /// declared payload length (0 when the field did not parse)
    pub length: u64,
    /// declared length was unparseable, negative or beyond the sane maximum
    pub bad_length: bool,
    /// raw length field, trimmed, for diagnostics
    pub length_text: String,
    pub span: EntrySpan,
}

impl ArchiveEntry {
    /// payload bytes attributed to this entry
    pub fn payload_len(&self) -> u64 {
        if self.bad_length {
            0
        } else {
            self.length
        }
    }
}
