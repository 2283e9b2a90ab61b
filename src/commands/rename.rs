use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::Serialize;

use batchren::executor::{execute_batch, Direction};
use batchren::ledger::{self, build_level, RenamePair, UuidMinter};
use batchren::local_files::list_file_names;
use batchren::transforms::{self, CaseStyle};
use batchren::{Error, Result};

use super::{resolve_dir, CmdResult};

#[derive(Args)]
pub struct RenameArgs {
    #[command(subcommand)]
    command: RenameCommand,
}

#[derive(Args, Default)]
struct CommonArgs {
    /// Target directory (defaults to the current directory)
    dir: Option<PathBuf>,
    /// Glob of file names to leave untouched (e.g. "*.log")
    #[arg(long)]
    exclude: Option<String>,
    /// Compute and report the batch without renaming anything
    #[arg(short = 'n', long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum RenameCommand {
    /// Number files sequentially
    Number {
        #[command(flatten)]
        common: CommonArgs,
        /// First number in the sequence
        #[arg(long, default_value_t = 1)]
        start: usize,
        /// Zero-padding width
        #[arg(long, default_value_t = 3)]
        width: usize,
        /// Keep the original name after the number
        #[arg(long)]
        keep_name: bool,
    },
    /// Stamp files with a date
    Date {
        #[command(flatten)]
        common: CommonArgs,
        /// Date format (strftime syntax)
        #[arg(long, default_value = "%Y-%m-%d")]
        format: String,
        /// Append the stamp instead of prefixing it
        #[arg(long)]
        suffix: bool,
        /// Use today's date instead of each file's modification time
        #[arg(long)]
        today: bool,
    },
    /// Search and replace in names (regex)
    Replace {
        /// Search pattern
        pattern: String,
        /// Replacement text (supports capture groups like $1)
        replacement: String,
        /// Replace every match, not just the first
        #[arg(long)]
        all: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Convert name case
    Case {
        /// Target case style
        #[arg(value_enum)]
        style: CaseStyle,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Truncate names to a maximum length
    Truncate {
        /// Maximum stem length in characters
        length: usize,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairOutput {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOutput {
    command: String,
    path: String,
    dry_run: bool,
    renamed: Vec<PairOutput>,
    failed: Vec<PairOutput>,
    renamed_count: usize,
    failed_count: usize,
    unchanged: usize,
}

pub fn run(args: RenameArgs) -> CmdResult<RenameOutput> {
    match args.command {
        RenameCommand::Number {
            common,
            start,
            width,
            keep_name,
        } => apply(common, "rename.number", |ctx| {
            Ok(transforms::number(ctx.index, ctx.stem, start, width, keep_name))
        }),
        RenameCommand::Date {
            common,
            format,
            suffix,
            today,
        } => apply(common, "rename.date", move |ctx| {
            let day = if today {
                chrono::Local::now().date_naive()
            } else {
                file_date(ctx.path)
            };
            Ok(transforms::date(ctx.stem, day, &format, suffix))
        }),
        RenameCommand::Replace {
            common,
            pattern,
            replacement,
            all,
        } => {
            let pattern = transforms::compile_pattern(&pattern)?;
            apply(common, "rename.replace", move |ctx| {
                Ok(transforms::replace(ctx.stem, &pattern, &replacement, all))
            })
        }
        RenameCommand::Case { common, style } => apply(common, "rename.case", move |ctx| {
            Ok(transforms::convert_case(ctx.stem, style))
        }),
        RenameCommand::Truncate { common, length } => {
            if length == 0 {
                return Err(Error::validation_invalid_argument(
                    "length",
                    "Truncation length must be at least 1",
                    Some("0".to_string()),
                ));
            }
            apply(common, "rename.truncate", move |ctx| {
                Ok(transforms::truncate(ctx.stem, length))
            })
        }
    }
}

struct TransformCtx<'a> {
    index: usize,
    stem: &'a str,
    path: &'a Path,
}

/// Modification date of a file, falling back to today when unavailable.
fn file_date(path: &Path) -> chrono::NaiveDate {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|t| chrono::DateTime::<chrono::Local>::from(t).date_naive())
        .unwrap_or_else(|_| chrono::Local::now().date_naive())
}

/// Shared transform flow: list, compute pairs, validate targets, persist the
/// new ledger level, then execute the batch.
fn apply<F>(common: CommonArgs, command: &str, transform: F) -> CmdResult<RenameOutput>
where
    F: Fn(TransformCtx) -> Result<String>,
{
    let dir = resolve_dir(common.dir)?;
    let names = list_file_names(&dir, common.exclude.as_deref())?;

    let mut pairs: Vec<RenamePair> = Vec::new();
    for (index, name) in names.iter().enumerate() {
        let (stem, ext) = transforms::split_name(name);
        let new_stem = transform(TransformCtx {
            index,
            stem,
            path: &dir.join(name),
        })?;
        let rename = format!("{}{}", new_stem, ext);
        if rename != *name {
            pairs.push(RenamePair {
                original: name.clone(),
                rename,
            });
        }
    }

    validate_targets(&pairs, &names)?;
    let unchanged = names.len() - pairs.len();

    if common.dry_run {
        return Ok((
            RenameOutput {
                command: command.to_string(),
                path: dir.display().to_string(),
                dry_run: true,
                renamed_count: pairs.len(),
                renamed: pair_outputs_forward(&pairs),
                failed: Vec::new(),
                failed_count: 0,
                unchanged,
            },
            0,
        ));
    }

    if pairs.is_empty() {
        return Ok((
            RenameOutput {
                command: command.to_string(),
                path: dir.display().to_string(),
                dry_run: false,
                renamed: Vec::new(),
                failed: Vec::new(),
                renamed_count: 0,
                failed_count: 0,
                unchanged,
            },
            0,
        ));
    }

    // Persist the level first, then rename. The ledger is the source of
    // truth for undo, so it must already know about this batch when the
    // renames land.
    let mut minter = UuidMinter;
    let existing = ledger::load(&dir, &mut minter)?;
    let updated = build_level(
        existing,
        &dir.display().to_string(),
        &pairs,
        &mut minter,
    );
    ledger::save(&dir, &updated)?;

    let items = updated.transforms[0].clone();
    let outcome = execute_batch(&dir, &items, Direction::Forward);
    let (successful, failed) = outcome.into_partition(items.len())?;

    Ok((
        RenameOutput {
            command: command.to_string(),
            path: dir.display().to_string(),
            dry_run: false,
            renamed_count: successful.len(),
            failed_count: failed.len(),
            renamed: successful
                .iter()
                .map(|i| PairOutput {
                    from: i.original.clone(),
                    to: i.rename.clone(),
                })
                .collect(),
            failed: failed
                .iter()
                .map(|i| PairOutput {
                    from: i.original.clone(),
                    to: i.rename.clone(),
                })
                .collect(),
            unchanged,
        },
        0,
    ))
}

fn pair_outputs_forward(pairs: &[RenamePair]) -> Vec<PairOutput> {
    pairs
        .iter()
        .map(|p| PairOutput {
            from: p.original.clone(),
            to: p.rename.clone(),
        })
        .collect()
}

/// Rename targets must be pairwise distinct within the batch and must not
/// collide with any name currently in the directory. The batch executes
/// concurrently with no ordering, so a target another pair renames away is
/// still a clobber: whichever rename lands first destroys the file.
fn validate_targets(pairs: &[RenamePair], names: &[String]) -> Result<()> {
    let current: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for pair in pairs {
        if let Some(prev) = seen.insert(pair.rename.as_str(), pair.original.as_str()) {
            return Err(Error::rename_duplicate_target(
                pair.rename.clone(),
                vec![prev.to_string(), pair.original.clone()],
            ));
        }
        if current.contains(pair.rename.as_str()) {
            return Err(Error::rename_duplicate_target(
                pair.rename.clone(),
                vec![pair.original.clone()],
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(original: &str, rename: &str) -> RenamePair {
        RenamePair {
            original: original.to_string(),
            rename: rename.to_string(),
        }
    }

    #[test]
    fn duplicate_targets_rejected() {
        let pairs = vec![pair("a.txt", "x.txt"), pair("b.txt", "x.txt")];
        let names = vec!["a.txt".to_string(), "b.txt".to_string()];
        let err = validate_targets(&pairs, &names).unwrap_err();
        assert_eq!(err.code, batchren::ErrorCode::RenameDuplicateTarget);
    }

    #[test]
    fn clobbering_an_untouched_file_rejected() {
        let pairs = vec![pair("a.txt", "b.txt")];
        let names = vec!["a.txt".to_string(), "b.txt".to_string()];
        let err = validate_targets(&pairs, &names).unwrap_err();
        assert_eq!(err.code, batchren::ErrorCode::RenameDuplicateTarget);
    }

    #[test]
    fn chained_renames_within_the_batch_rejected() {
        // a -> b while b -> c: concurrent execution can land a -> b first
        // and overwrite b before it moves
        let pairs = vec![pair("a.txt", "b.txt"), pair("b.txt", "c.txt")];
        let names = vec!["a.txt".to_string(), "b.txt".to_string()];
        let err = validate_targets(&pairs, &names).unwrap_err();
        assert_eq!(err.code, batchren::ErrorCode::RenameDuplicateTarget);
    }

    #[test]
    fn swapping_names_within_the_batch_rejected() {
        let pairs = vec![pair("a.txt", "b.txt"), pair("b.txt", "a.txt")];
        let names = vec!["a.txt".to_string(), "b.txt".to_string()];
        let err = validate_targets(&pairs, &names).unwrap_err();
        assert_eq!(err.code, batchren::ErrorCode::RenameDuplicateTarget);
    }

    #[test]
    fn disjoint_targets_accepted() {
        let pairs = vec![pair("a.txt", "x.txt"), pair("b.txt", "y.txt")];
        let names = vec!["a.txt".to_string(), "b.txt".to_string()];
        assert!(validate_targets(&pairs, &names).is_ok());
    }
}
