//! change the type tag of an entry

use std::path::Path;

use crate::archive::{Archive, Located};
use crate::config::Config;
use crate::directory::CR;
use crate::error::{Error, Result};
use crate::ops::rewrite;
use crate::plan::{EditPlan, PlanBuilder};
use crate::text::to_native;
use crate::types::EntryType;

/// set the type of the first entry named `name`
///
/// only the type field changes; the name, length and payload stay byte-identical.
pub fn retype(
    archive_path: &Path,
    name: &str,
    new_type: &EntryType,
    skip_deleted: bool,
    config: &Config,
) -> Result<Located> {
    let archive = Archive::open(archive_path, config)?;
    let located = archive.locate(name, skip_deleted, config)?;
    let plan = plan_retype(&archive, name, &located, new_type, config)?;
    rewrite(&archive, &plan)?;
    Ok(located)
}

/// plan a retype
///
/// deleted entries must stay `D` with length 0, so moving an entry into or
/// out of the deleted type is refused.
pub fn plan_retype(
    archive: &Archive,
    name: &str,
    located: &Located,
    new_type: &EntryType,
    config: &Config,
) -> Result<EditPlan> {
    match new_type {
        EntryType::Other(tag) => {
            return Err(Error::InvalidType(String::from_utf8_lossy(tag).into_owned()))
        }
        EntryType::Deleted => return Err(Error::InvalidRetype(name.to_string())),
        _ => {}
    }
    if located.length == 0 {
        return Err(Error::InvalidRetype(name.to_string()));
    }

    let mut tag = to_native(&new_type.to_string(), config.text_mode);
    tag.push(CR);

    let span = located.span;
    let mut plan = PlanBuilder::new(archive.len());
    plan.copy_to(span.type_start)?;
    plan.insert(tag);
    plan.skip_to(span.length_start)?;
    Ok(plan.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{encode_entry, encode_header};
    use std::fs;
    use tempfile::tempdir;

    fn sample_bytes() -> Vec<u8> {
        let mut data = encode_header(3);
        data.extend(encode_entry(b"INTRO", &EntryType::Program, 2));
        data.extend(encode_entry(b"FOO", &EntryType::Sequential, 4));
        data.extend(encode_entry(b"GONE", &EntryType::Deleted, 0));
        data.extend(b"pp\x00\x01\x02\x03");
        data
    }

    #[test]
    fn test_retype_changes_only_type_byte() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.lbr");
        let before = sample_bytes();
        fs::write(&path, &before).unwrap();
        let config = Config::default();

        let located = retype(&path, "FOO", &EntryType::User, false, &config).unwrap();
        let after = fs::read(&path).unwrap();

        assert_eq!(before.len(), after.len());
        let type_pos = located.span.type_start as usize;
        let diffs: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
        assert_eq!(diffs, vec![type_pos]);
        assert_eq!(after[type_pos], b'U');

        let archive = Archive::open(&path, &config).unwrap();
        let foo = archive.locate("FOO", false, &config).unwrap();
        assert_eq!(archive.entries()[foo.index].entry_type, EntryType::User);
        assert_eq!(archive.payload(&foo).unwrap(), b"\x00\x01\x02\x03");
    }

    #[test]
    fn test_retype_rejects_deleted() {
        let config = Config::default();
        let archive = Archive::from_bytes("t.lbr", sample_bytes(), &config).unwrap();

        let foo = archive.locate("FOO", false, &config).unwrap();
        assert!(matches!(
            plan_retype(&archive, "FOO", &foo, &EntryType::Deleted, &config),
            Err(Error::InvalidRetype(_))
        ));

        let gone = archive.locate("GONE", false, &config).unwrap();
        assert!(matches!(
            plan_retype(&archive, "GONE", &gone, &EntryType::Program, &config),
            Err(Error::InvalidRetype(_))
        ));
    }

    #[test]
    fn test_retype_rejects_unknown_tag() {
        let config = Config::default();
        let archive = Archive::from_bytes("t.lbr", sample_bytes(), &config).unwrap();
        let foo = archive.locate("FOO", false, &config).unwrap();

        let result = plan_retype(&archive, "FOO", &foo, &EntryType::Other(b"Z".to_vec()), &config);
        assert!(matches!(result, Err(Error::InvalidType(_))));
    }

    #[test]
    fn test_retype_missing_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.lbr");
        fs::write(&path, sample_bytes()).unwrap();

        let result = retype(&path, "NOPE", &EntryType::User, false, &Config::default());
        assert!(matches!(result, Err(Error::EntryNotFound(_))));
        assert_eq!(fs::read(&path).unwrap(), sample_bytes());
    }
}
