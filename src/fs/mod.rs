pub mod read;
pub mod write;

pub use read::{collect_sources, SourceFile};
pub use write::{fsync_dir, write_atomic};
