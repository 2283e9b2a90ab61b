use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use batchren::executor::{execute_batch, Direction};
use batchren::ledger::{self, check_existing, compact, plan_restore, Shortfall, UuidMinter};
use batchren::local_files::list_file_names;

use super::{resolve_dir, CmdResult};
use crate::commands::rename::PairOutput;

#[derive(Args)]
pub struct UndoArgs {
    /// Target directory (defaults to the current directory)
    dir: Option<PathBuf>,
    /// Number of rename batches to roll back
    #[arg(long, default_value_t = 1, conflicts_with = "all")]
    depth: usize,
    /// Roll back the entire recorded history
    #[arg(long)]
    all: bool,
    /// Compute and report the restore without renaming anything
    #[arg(short = 'n', long)]
    dry_run: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoOutput {
    command: String,
    path: String,
    dry_run: bool,
    /// Depth actually applied, after clamping
    depth: usize,
    restored: Vec<PairOutput>,
    failed: Vec<PairOutput>,
    missing: Vec<String>,
    shortfalls: Vec<Shortfall>,
    restored_count: usize,
    failed_count: usize,
    /// Levels left in the ledger afterwards; 0 with `ledger_deleted` set
    /// means the history is fully consumed
    remaining_levels: usize,
    ledger_deleted: bool,
}

pub fn run(args: UndoArgs) -> CmdResult<UndoOutput> {
    let dir = resolve_dir(args.dir)?;
    let mut minter = UuidMinter;
    let ledger = ledger::load_required(
        &dir,
        &mut minter,
        "undo",
        "No rename history to undo in this directory",
    )?;

    let requested = if args.all {
        ledger.transforms.len()
    } else {
        args.depth
    };
    let plan = plan_restore(&ledger, requested)?;
    let disk = list_file_names(&dir, None)?;
    let existing = check_existing(&plan.items, &disk);

    if args.dry_run {
        return Ok((
            UndoOutput {
                command: "undo".to_string(),
                path: dir.display().to_string(),
                dry_run: true,
                depth: plan.depth,
                restored_count: existing.to_restore.len(),
                restored: restore_pairs(&existing.to_restore),
                failed: Vec::new(),
                failed_count: 0,
                missing: existing.missing,
                shortfalls: plan.shortfalls,
                remaining_levels: ledger.transforms.len().saturating_sub(plan.depth),
                ledger_deleted: false,
            },
            0,
        ));
    }

    let outcome = execute_batch(&dir, &existing.to_restore, Direction::Restore);
    let (successful, failed) = outcome.into_partition(existing.to_restore.len())?;

    let mut deleted = false;
    let remaining = match compact(&ledger, plan.depth, &failed) {
        Some(compacted) => {
            ledger::save(&dir, &compacted)?;
            compacted.transforms.len()
        }
        None => {
            ledger::delete(&dir)?;
            deleted = true;
            0
        }
    };

    Ok((
        UndoOutput {
            command: "undo".to_string(),
            path: dir.display().to_string(),
            dry_run: false,
            depth: plan.depth,
            restored_count: successful.len(),
            failed_count: failed.len(),
            restored: restore_pairs(&successful),
            failed: restore_pairs(&failed),
            missing: existing.missing,
            shortfalls: plan.shortfalls,
            remaining_levels: remaining,
            ledger_deleted: deleted,
        },
        0,
    ))
}

/// A restore renames the current name back to the historical one.
fn restore_pairs(items: &[batchren::ledger::RenameItem]) -> Vec<PairOutput> {
    items
        .iter()
        .map(|i| PairOutput {
            from: i.rename.clone(),
            to: i.original.clone(),
        })
        .collect()
}
