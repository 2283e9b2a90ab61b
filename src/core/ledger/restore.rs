//! Collapsing lineage into a flat restore plan, and filtering it against
//! what is actually on disk.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::log_status;

use super::{Ledger, RenameItem};

/// Identity whose recorded history is shallower than the requested depth.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortfall {
    pub reference_id: String,
    pub name: String,
    pub requested: usize,
    pub found: usize,
}

/// Flat rename plan: one item per identity tracked at level 0.
#[derive(Debug, Clone)]
pub struct RestorePlan {
    pub items: Vec<RenameItem>,
    pub shortfalls: Vec<Shortfall>,
    /// Depth after clamping; the number of levels a restore will consume.
    pub depth: usize,
}

/// Collapse lineage across levels down to the requested rollback depth.
///
/// A depth of 0 is rejected; a depth above the available history clamps down
/// with a logged notice. For every identity present at level 0 the chain
/// `[rename@0, original@0 (== rename@1), original@1, ...]` is walked until
/// the depth is reached or the identity drops out of an older level, in
/// which case a shortfall is reported and the earliest found name is used.
pub fn plan_restore(ledger: &Ledger, depth: usize) -> Result<RestorePlan> {
    if depth == 0 {
        return Err(Error::validation_invalid_argument(
            "depth",
            "Rollback depth must be at least 1",
            Some("0".to_string()),
        ));
    }

    let available = ledger.transforms.len();
    let effective = if depth > available {
        log_status!(
            "undo",
            "Requested depth {} exceeds history of {}, using {}",
            depth,
            available,
            available
        );
        available
    } else {
        depth
    };

    let mut items = Vec::new();
    let mut shortfalls = Vec::new();

    let Some(newest) = ledger.transforms.first() else {
        return Ok(RestorePlan {
            items,
            shortfalls,
            depth: effective,
        });
    };

    for entry in newest {
        let mut earliest_original = entry.original.clone();
        let mut found = 1;

        for level in ledger.transforms[1..effective].iter() {
            match Ledger::find_in_level(level, &entry.reference_id) {
                Some(older) => {
                    earliest_original = older.original;
                    found += 1;
                }
                None => break,
            }
        }

        if found < depth {
            shortfalls.push(Shortfall {
                reference_id: entry.reference_id.clone(),
                name: entry.rename.clone(),
                requested: depth,
                found,
            });
        }

        items.push(RenameItem {
            original: earliest_original,
            rename: entry.rename.clone(),
            reference_id: entry.reference_id.clone(),
        });
    }

    Ok(RestorePlan {
        items,
        shortfalls,
        depth: effective,
    })
}

/// Restore plan split by on-disk presence.
#[derive(Debug, Clone, Default)]
pub struct Existing {
    pub to_restore: Vec<RenameItem>,
    pub missing: Vec<String>,
}

/// Filter a restore plan against the files actually present on disk.
///
/// Duplicate entries referencing the same on-disk name count once. Missing
/// files are reported, not attempted, and never block the rest of the batch.
pub fn check_existing(items: &[RenameItem], disk_names: &[String]) -> Existing {
    let on_disk: HashSet<&str> = disk_names.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut result = Existing::default();

    for item in items {
        if !seen.insert(item.rename.as_str()) {
            continue;
        }
        if on_disk.contains(item.rename.as_str()) {
            result.to_restore.push(item.clone());
        } else {
            result.missing.push(item.rename.clone());
        }
    }

    result
}
