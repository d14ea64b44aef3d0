use std::path::PathBuf;

/// error type for lbr operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid signature, not an LBR file: {0}")]
    InvalidSignature(PathBuf),

    #[error("archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    #[error("file not found: {0}")]
    MissingInput(PathBuf),

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("entry {name} has bad length {length}")]
    BadLength { name: String, length: String },

    #[error("unable to pad: last name {last} is not greater than first name {first}")]
    PadDirection { first: u64, last: u64 },

    #[error("unable to pad: range {first}..={last} exceeds {limit} entries")]
    PadRange { first: u64, last: u64, limit: u64 },

    #[error("{field} field longer than {limit} bytes")]
    FieldTooLong { field: &'static str, limit: usize },

    #[error("malformed archive header: {0}")]
    MalformedHeader(String),

    #[error("archive truncated while reading {what}")]
    Truncated { what: String },

    #[error("invalid entry type: {0}")]
    InvalidType(String),

    #[error("cannot retype entry {0}: deleted entries must keep type D and length 0")]
    InvalidRetype(String),

    #[error("invalid entry name: {0}")]
    InvalidEntryName(String),

    #[error("source file changed while building archive: {0}")]
    SourceChanged(PathBuf),

    #[error("missing separator in argument, expected NAME:TYPE: {0}")]
    InvalidTypeArgument(String),

    #[error("got extra unhandled arguments: {}", .0.join(" "))]
    UnexpectedArguments(Vec<String>),

    #[error("edit plan out of order: range ending at {end} starts before offset {cursor}")]
    InvalidPlan { cursor: u64, end: u64 },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
