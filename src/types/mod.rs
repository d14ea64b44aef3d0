mod entry;

pub use entry::{ArchiveEntry, EntrySpan, EntryType};
