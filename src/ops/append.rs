//! add host files to the end of an existing archive

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::archive::Archive;
use crate::config::Config;
use crate::directory::{encode_header, encode_source};
use crate::error::{Error, Result};
use crate::fs::{collect_sources, SourceFile};
use crate::ops::rewrite;
use crate::plan::{EditPlan, PlanBuilder};
use crate::text::to_host;

/// append options
#[derive(Clone, Debug, Default)]
pub struct AppendOptions {
    /// drop the extension from stored names
    pub strip_extension: bool,
}

/// append statistics
#[derive(Debug, Default)]
pub struct AppendStats {
    pub entries_added: usize,
    pub archive_bytes: u64,
}

/// append files and directories to the archive at `archive_path`
pub fn append(
    archive_path: &Path,
    inputs: &[PathBuf],
    options: &AppendOptions,
    config: &Config,
) -> Result<AppendStats> {
    let archive = Archive::open(archive_path, config)?;
    let sources = collect_sources(inputs)?;

    let plan = plan_append(&archive, &sources, options, config)?;
    debug!(
        "append plan: {} ops, {} -> {} bytes",
        plan.ops().len(),
        plan.source_len(),
        plan.output_len()
    );
    let archive_bytes = rewrite(&archive, &plan)?;

    Ok(AppendStats {
        entries_added: sources.len(),
        archive_bytes,
    })
}

/// plan an append: new header, old directory, new entries, old payloads,
/// new payloads, then any trailing bytes the old archive carried
///
/// source files are read here so the plan is complete before anything is written.
pub fn plan_append(
    archive: &Archive,
    sources: &[SourceFile],
    options: &AppendOptions,
    config: &Config,
) -> Result<EditPlan> {
    let directory = archive.directory();
    if let Some(bad) = directory.first_bad_length() {
        return Err(Error::BadLength {
            name: to_host(&bad.name, config.text_mode),
            length: bad.length_text.clone(),
        });
    }

    let mut plan = PlanBuilder::new(archive.len());
    plan.skip_to(directory.header_end())?;
    plan.insert(encode_header(directory.len() + sources.len()));
    plan.copy_to(directory.payload_base())?;

    for source in sources {
        info!("+ {}", source.name);
        plan.insert(encode_source(source, options.strip_extension, config));
    }

    plan.copy_to(directory.payload_end())?;
    for source in sources.iter().filter(|s| s.length > 0) {
        plan.insert(source.read()?);
    }

    Ok(plan.finish())
}
