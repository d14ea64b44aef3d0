//! lbr CLI - build, list, extract and edit C64 LBR archives

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use lbr::ops::{
    append, create, delete, extract, list, retype, AppendOptions, CreateOptions, DeleteMode,
    ExtractOptions, ListOptions,
};
use lbr::{Config, EntryType, Error, TextMode};

#[derive(Parser)]
#[command(name = "lbr")]
#[command(about = "C64 LBR archive tool")]
#[command(
    long_about = "C64 LBR archive tool\n\nthere is no locking: do not run two commands against the same archive at once."
)]
#[command(version)]
#[command(group(
    ArgGroup::new("action")
        .args(["list", "create", "extract", "extract_into", "append", "delete", "wipe", "retype"])
))]
struct Cli {
    /// list archive contents (default)
    #[arg(short, long)]
    list: bool,

    /// create a new archive from FILES
    #[arg(short, long)]
    create: bool,

    /// extract entries (all, or those named by FILES) into the current directory
    #[arg(short, long)]
    extract: bool,

    /// extract entries into DIR
    #[arg(short = 'E', long, value_name = "DIR")]
    extract_into: Option<PathBuf>,

    /// append FILES to an existing archive
    #[arg(short, long)]
    append: bool,

    /// mark an entry deleted and drop its payload
    #[arg(short, long, value_name = "NAME")]
    delete: Option<String>,

    /// remove an entry and its payload completely
    #[arg(short, long, value_name = "NAME")]
    wipe: Option<String>,

    /// change an entry's type (P, S, U or R)
    #[arg(short = 't', long = "type", value_name = "NAME:TYPE")]
    retype: Option<String>,

    /// sort entries by (name length, name)
    #[arg(short = 'n', long)]
    sort: bool,

    /// fill gaps in a numbered sequence with deleted entries
    #[arg(short, long, requires = "sort")]
    pad_sorted: bool,

    /// strip extensions from added file names
    #[arg(short, long)]
    strip: bool,

    /// skip deleted entries
    #[arg(short = 'b', long)]
    skip_deleted: bool,

    /// add a type extension to extracted file names
    #[arg(short = 'X', long)]
    add_extension: bool,

    /// store and show names without text conversion
    #[arg(short = 'P', long)]
    no_conversion: bool,

    /// print progress
    #[arg(short, long)]
    verbose: bool,

    /// config file
    #[arg(long, env = "LBR_CONFIG")]
    config: Option<PathBuf>,

    /// archive path
    archive: PathBuf,

    /// input files, or entry names to extract
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(false)
        .init();
}

fn run(cli: Cli) -> lbr::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.no_conversion {
        config = config.with_text_mode(TextMode::Passthrough);
    }

    if !cli.create && !cli.archive.exists() {
        return Err(Error::ArchiveNotFound(cli.archive.clone()));
    }

    if cli.create {
        require_inputs(&cli.files)?;
        let options = CreateOptions {
            numerical_sort: cli.sort,
            numerical_pad: cli.pad_sorted,
            strip_extension: cli.strip,
        };
        let stats = create(&cli.archive, &cli.files, &options, &config)?;
        println!(
            "created {} with {} entries ({} placeholders), {} bytes",
            cli.archive.display(),
            stats.entries,
            stats.placeholders,
            stats.archive_bytes
        );
    } else if cli.extract || cli.extract_into.is_some() {
        let dest = cli.extract_into.clone().unwrap_or_else(|| PathBuf::from("."));
        let targets: Vec<String> = cli
            .files
            .iter()
            .map(|f| f.to_string_lossy().into_owned())
            .collect();
        let options = ExtractOptions {
            skip_deleted: cli.skip_deleted,
            add_extension: cli.add_extension,
        };
        let stats = extract(&cli.archive, &dest, &targets, &options, &config)?;
        println!(
            "extracted {} files, {} bytes",
            stats.files_written, stats.bytes_written
        );
        if stats.used_blob_fallback {
            println!("archive has a bad length, remaining bytes written to one file");
        }
    } else if cli.append {
        require_inputs(&cli.files)?;
        let options = AppendOptions {
            strip_extension: cli.strip,
        };
        let stats = append(&cli.archive, &cli.files, &options, &config)?;
        println!(
            "appended {} entries, {} bytes",
            stats.entries_added, stats.archive_bytes
        );
    } else if let Some(name) = &cli.delete {
        reject_extra(&cli.files)?;
        let stats = delete(&cli.archive, name, DeleteMode::Soft, cli.skip_deleted, &config)?;
        println!("deleted {} ({} bytes)", name, stats.payload_removed);
    } else if let Some(name) = &cli.wipe {
        reject_extra(&cli.files)?;
        let stats = delete(&cli.archive, name, DeleteMode::Wipe, cli.skip_deleted, &config)?;
        println!("wiped {} ({} bytes)", name, stats.payload_removed);
    } else if let Some(arg) = &cli.retype {
        reject_extra(&cli.files)?;
        let (name, entry_type) = parse_type_argument(arg)?;
        retype(&cli.archive, &name, &entry_type, cli.skip_deleted, &config)?;
        println!("{} is now {}", name, entry_type);
    } else {
        reject_extra(&cli.files)?;
        let options = ListOptions {
            skip_deleted: cli.skip_deleted,
            numerical_sort: cli.sort,
        };
        for entry in list(&cli.archive, &options, &config)? {
            println!("{}", entry);
        }
    }

    Ok(())
}

/// every input path must exist before anything is written
fn require_inputs(files: &[PathBuf]) -> lbr::Result<()> {
    match files.iter().find(|f| !f.exists()) {
        Some(missing) => Err(Error::MissingInput(missing.clone())),
        None => Ok(()),
    }
}

fn reject_extra(files: &[PathBuf]) -> lbr::Result<()> {
    if files.is_empty() {
        Ok(())
    } else {
        Err(Error::UnexpectedArguments(
            files.iter().map(|f| f.display().to_string()).collect(),
        ))
    }
}

/// split `NAME:TYPE` at the last colon, so names may contain colons themselves
fn parse_type_argument(arg: &str) -> lbr::Result<(String, EntryType)> {
    let (name, tag) = arg
        .rsplit_once(':')
        .ok_or_else(|| Error::InvalidTypeArgument(arg.to_string()))?;
    if name.is_empty() {
        return Err(Error::InvalidTypeArgument(arg.to_string()));
    }
    Ok((name.to_string(), tag.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    #[test]
    fn test_parse_type_argument() {
        let (name, entry_type) = parse_type_argument("FOO:u").unwrap();
        assert_eq!(name, "FOO");
        assert_eq!(entry_type, EntryType::User);

        let (name, _) = parse_type_argument("A:B:prg").unwrap();
        assert_eq!(name, "A:B");

        assert!(matches!(parse_type_argument("FOO"), Err(Error::InvalidTypeArgument(_))));
        assert!(matches!(parse_type_argument(":s"), Err(Error::InvalidTypeArgument(_))));
        assert!(matches!(parse_type_argument("FOO:x"), Err(Error::InvalidType(_))));
    }

    #[test]
    fn test_actions_conflict() {
        let result = Cli::try_parse_from(["lbr", "-l", "-c", "x.lbr"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["lbr", "-t", "FOO:U", "x.lbr"]).unwrap();
        assert_eq!(cli.retype.as_deref(), Some("FOO:U"));
    }

    #[test]
    fn test_reject_extra() {
        assert!(reject_extra(&[]).is_ok());
        let result = reject_extra(&[PathBuf::from("stray")]);
        assert!(matches!(result, Err(Error::UnexpectedArguments(v)) if v == vec!["stray"]));
    }

    fn cli(args: &[&OsStr]) -> Cli {
        let mut argv = vec![OsStr::new("lbr")];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_run_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("none.lbr");

        for action in [None, Some("-e"), Some("-a")] {
            let mut args: Vec<&OsStr> = action.into_iter().map(OsStr::new).collect();
            args.push(archive.as_os_str());
            let result = run(cli(&args));
            assert!(matches!(result, Err(Error::ArchiveNotFound(p)) if p == archive));
        }
        assert!(!archive.exists());
    }

    #[test]
    fn test_run_create_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("new.lbr");
        let present = dir.path().join("a.prg");
        std::fs::write(&present, "abc").unwrap();
        let missing = dir.path().join("gone.seq");

        let result = run(cli(&[
            OsStr::new("-c"),
            archive.as_os_str(),
            present.as_os_str(),
            missing.as_os_str(),
        ]));

        assert!(matches!(result, Err(Error::MissingInput(p)) if p == missing));
        assert!(!archive.exists());
    }

    #[test]
    fn test_run_create_then_list() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("new.lbr");
        let input = dir.path().join("a.prg");
        std::fs::write(&input, "abc").unwrap();

        run(cli(&[OsStr::new("-c"), archive.as_os_str(), input.as_os_str()])).unwrap();
        assert!(archive.exists());
        run(cli(&[archive.as_os_str()])).unwrap();

        let result = run(cli(&[archive.as_os_str(), input.as_os_str()]));
        assert!(matches!(result, Err(Error::UnexpectedArguments(_))));
    }
}
