//! remove an entry's payload, keeping or dropping its directory row

use std::path::Path;

use tracing::debug;

use crate::archive::{Archive, Located};
use crate::config::Config;
use crate::directory::{encode_fields, encode_header};
use crate::error::Result;
use crate::ops::rewrite;
use crate::plan::{EditPlan, PlanBuilder};
use crate::types::EntryType;

/// how much of an entry a delete removes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// keep the directory row as a deleted, zero-length entry
    #[default]
    Soft,
    /// drop the directory row and decrement the entry count
    Wipe,
}

/// delete statistics
#[derive(Debug)]
pub struct DeleteStats {
    pub located: Located,
    pub payload_removed: u64,
    pub archive_bytes: u64,
}

/// delete the first entry named `name` from the archive at `archive_path`
pub fn delete(
    archive_path: &Path,
    name: &str,
    mode: DeleteMode,
    skip_deleted: bool,
    config: &Config,
) -> Result<DeleteStats> {
    let archive = Archive::open(archive_path, config)?;
    let located = archive.locate(name, skip_deleted, config)?;

    let plan = match mode {
        DeleteMode::Soft => plan_delete(&archive, &located)?,
        DeleteMode::Wipe => plan_wipe(&archive, &located)?,
    };
    debug!(
        "{:?} delete plan: {} ops, {} bytes skipped",
        mode,
        plan.ops().len(),
        plan.skipped_len()
    );
    let archive_bytes = rewrite(&archive, &plan)?;

    Ok(DeleteStats {
        located,
        payload_removed: located.length,
        archive_bytes,
    })
}

/// plan a soft delete: the row keeps its name, becomes `D` with length 0,
/// and the payload is excised
pub fn plan_delete(archive: &Archive, located: &Located) -> Result<EditPlan> {
    let span = located.span;
    let mut plan = PlanBuilder::new(archive.len());
    plan.copy_to(span.type_start)?;
    plan.insert(encode_fields(&EntryType::Deleted, 0));
    plan.skip_to(span.end)?;
    plan.copy_to(located.payload_offset)?;
    plan.skip_to(located.payload_end())?;
    Ok(plan.finish())
}

/// plan a wipe: the count drops by one, and both the row and the payload are excised
pub fn plan_wipe(archive: &Archive, located: &Located) -> Result<EditPlan> {
    let directory = archive.directory();
    let span = located.span;
    let mut plan = PlanBuilder::new(archive.len());
    plan.skip_to(directory.header_end())?;
    plan.insert(encode_header(directory.len().saturating_sub(1)));
    plan.copy_to(span.start)?;
    plan.skip_to(span.end)?;
    plan.copy_to(located.payload_offset)?;
    plan.skip_to(located.payload_end())?;
    Ok(plan.finish())
}
