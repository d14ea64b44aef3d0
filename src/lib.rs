//! lbr - C64 LBR archive tool
//!
//! build, list, extract and edit LBR archives: a flat container of files with a
//! plain-text directory up front, as used by Commodore 64 software collections.
//!
//! # Format
//!
//! ```text
//! "DWB" SP <count> SP CR
//! { <name> CR <type> CR SP <length> SP CR } x count
//! { <payload> } for every entry with length > 0, in directory order
//! ```
//!
//! names and type tags are stored as native (PETSCII) text and converted to
//! host text on the way out, see [`to_host`] and [`to_native`].
//!
//! # Core concepts
//!
//! - **Directory**: the parsed header and entry list, with field positions
//! - **Archive**: the whole file in memory plus its directory, built per operation
//! - **EditPlan**: copy/skip/insert steps computed before an archive is rewritten
//! - **Config**: text mode and parser limits, passed into every call
//!
//! every mutation writes a complete scratch file and renames it over the
//! archive. there is no locking: running two tools against the same archive at
//! once is undefined.
//!
//! # Example usage
//!
//! ```no_run
//! use lbr::{ops, Config};
//! use std::path::{Path, PathBuf};
//!
//! let config = Config::default();
//!
//! // build an archive from two files
//! let inputs = vec![PathBuf::from("game.prg"), PathBuf::from("notes.seq")];
//! ops::create(Path::new("disk.lbr"), &inputs, &ops::CreateOptions::default(), &config).unwrap();
//!
//! // list it
//! for entry in ops::list(Path::new("disk.lbr"), &ops::ListOptions::default(), &config).unwrap() {
//!     println!("{}", entry);
//! }
//! ```

mod archive;
mod config;
mod directory;
mod error;
mod order;
mod plan;
mod text;

pub mod fs;
pub mod ops;
pub mod types;

pub use archive::{Archive, Located};
pub use config::{Config, MAX_FIELD_LENGTH, MAX_PAD_ENTRIES, MAX_SANE_LENGTH};
pub use directory::{encode_entry, encode_fields, encode_header, encode_source, Directory, CR, MAGIC};
pub use error::{Error, IoResultExt, Result};
pub use order::{leading_number, numeric_order};
pub use plan::{EditOp, EditPlan, PlanBuilder};
pub use text::{to_host, to_native, TextMode};
pub use types::{ArchiveEntry, EntrySpan, EntryType};
