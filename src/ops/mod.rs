//! high-level operations on lbr archives

mod append;
mod create;
mod delete;
mod extract;
mod list;
mod retype;

pub use append::{append, plan_append, AppendOptions, AppendStats};
pub use create::{create, create_from_sources, CreateOptions, CreateStats};
pub use delete::{delete, plan_delete, plan_wipe, DeleteMode, DeleteStats};
pub use extract::{extract, extract_archive, ExtractOptions, ExtractStats};
pub use list::{list, list_directory, ListEntry, ListOptions};
pub use retype::{plan_retype, retype};

use std::io::Cursor;

use crate::archive::Archive;
use crate::error::{IoResultExt, Result};
use crate::fs::write_atomic;
use crate::plan::EditPlan;

/// replace an archive file with the output of `plan` applied to its current bytes
pub(crate) fn rewrite(archive: &Archive, plan: &EditPlan) -> Result<u64> {
    let path = archive.path();
    write_atomic(path, |out| {
        plan.apply(&mut Cursor::new(archive.data()), out)
            .with_path(path)
    })
}
