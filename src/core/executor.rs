//! Concurrent rename execution and outcome partitioning.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crate::error::{Error, Result};
use crate::ledger::RenameItem;
use crate::log_status;

/// Whether a batch applies a transform or rolls one back.
///
/// Determines which side of an item a failed operation is matched on: a
/// forward batch renames `original` to `rename` (failures matched on the
/// destination), a restore renames `rename` back to `original` (failures
/// matched on the origin). Both sides are the item's `rename` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Restore,
}

/// Exhaustive outcome of one batch. The three cases are mutually exclusive.
#[derive(Debug)]
pub enum BatchOutcome {
    AllSucceeded {
        successful: Vec<RenameItem>,
    },
    Partial {
        successful: Vec<RenameItem>,
        failed: Vec<RenameItem>,
    },
    AllFailed,
}

#[derive(Debug)]
struct RenameFailure {
    from: PathBuf,
    to: PathBuf,
    error: String,
}

/// Issue every rename concurrently, wait for all of them to settle, and
/// partition the source items by outcome.
///
/// Completions carry no ordering guarantee, so failures are matched back to
/// items by path basename rather than by position.
pub fn execute_batch(dir: &Path, items: &[RenameItem], direction: Direction) -> BatchOutcome {
    if items.is_empty() {
        return BatchOutcome::AllSucceeded {
            successful: Vec::new(),
        };
    }

    let handles: Vec<_> = items
        .iter()
        .map(|item| {
            let (from, to) = match direction {
                Direction::Forward => (dir.join(&item.original), dir.join(&item.rename)),
                Direction::Restore => (dir.join(&item.rename), dir.join(&item.original)),
            };
            thread::spawn(move || match fs::rename(&from, &to) {
                Ok(()) => Ok(()),
                Err(e) => Err(RenameFailure {
                    from,
                    to,
                    error: e.to_string(),
                }),
            })
        })
        .collect();

    let mut failures = Vec::new();
    for handle in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(failure)) => failures.push(failure),
            Err(_) => {
                // A panicked rename thread settled without reporting; treat
                // the whole batch as systemic.
                return BatchOutcome::AllFailed;
            }
        }
    }

    partition(items, &failures, direction)
}

fn partition(items: &[RenameItem], failures: &[RenameFailure], direction: Direction) -> BatchOutcome {
    if failures.is_empty() {
        return BatchOutcome::AllSucceeded {
            successful: items.to_vec(),
        };
    }
    if failures.len() >= items.len() {
        return BatchOutcome::AllFailed;
    }

    // Forward batches match on the destination path, restores on the
    // origin; both sides are the item's `rename` field.
    let failed_names: Vec<String> = failures
        .iter()
        .filter_map(|f| {
            let path = match direction {
                Direction::Forward => &f.to,
                Direction::Restore => &f.from,
            };
            path.file_name().map(|n| n.to_string_lossy().into_owned())
        })
        .collect();

    let mut successful = Vec::new();
    let mut failed = Vec::new();
    for item in items {
        if failed_names.iter().any(|n| n == &item.rename) {
            failed.push(item.clone());
        } else {
            successful.push(item.clone());
        }
    }

    log_status!(
        "rename",
        "{} of {} renames failed",
        failed.len(),
        items.len()
    );
    for failure in failures {
        log_status!(
            "rename",
            "  {} -> {}: {}",
            failure.from.display(),
            failure.to.display(),
            failure.error
        );
    }

    BatchOutcome::Partial { successful, failed }
}

impl BatchOutcome {
    /// Split into `(successful, failed)`, raising the fatal systemic error
    /// when every operation failed. Callers must not touch the ledger in
    /// that case.
    pub fn into_partition(self, attempted: usize) -> Result<(Vec<RenameItem>, Vec<RenameItem>)> {
        match self {
            BatchOutcome::AllSucceeded { successful } => Ok((successful, Vec::new())),
            BatchOutcome::Partial { successful, failed } => Ok((successful, failed)),
            BatchOutcome::AllFailed => Err(Error::rename_all_failed(
                attempted,
                "no rename in the batch completed",
            )),
        }
    }
}
