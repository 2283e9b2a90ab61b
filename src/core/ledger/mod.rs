//! The rename lineage ledger.
//!
//! One JSON file per target directory records every rename batch as a
//! "level", newest first. Identities (`referenceId`) track a logical file
//! across levels so any batch can be undone to an arbitrary depth, including
//! after batches that partially failed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::local_files::{self, FileSystem};

pub mod compact;
pub mod identity;
pub mod level;
pub mod migrate;
pub mod restore;

pub use compact::compact;
pub use identity::{resolve_identities, IdMinter, Resolution, UuidMinter};
pub use level::{build_level, RenamePair};
pub use migrate::load_and_migrate;
pub use restore::{check_existing, plan_restore, Existing, RestorePlan, Shortfall};

/// Name of the ledger file inside the target directory.
pub const LEDGER_FILE: &str = ".batchren.json";

/// One rename record. `reference_id` is an opaque identity minted once per
/// logical file and carried across every level that mentions it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RenameItem {
    pub original: String,
    pub rename: String,
    pub reference_id: String,
}

/// One batch's worth of rename records.
pub type Level = Vec<RenameItem>;

/// The persisted record of all rename batches for a directory.
///
/// Levels are ordered newest first: `transforms[0]` is the most recently
/// applied batch that has not been undone, and always reflects the current
/// on-disk name of every identity it tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Ledger {
    pub source_path: String,
    #[serde(alias = "levels")]
    pub transforms: Vec<Level>,
}

/// Pre-identity ledger entry: a flat array of these is the legacy on-disk
/// schema, implying exactly one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LegacyItem {
    pub original: String,
    pub rename: String,
    pub source_path: String,
}

impl Ledger {
    pub fn new(source_path: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            transforms: Vec::new(),
        }
    }

    /// Look up an item by identity within one level.
    pub fn find_in_level(level: &Level, reference_id: &str) -> Option<RenameItem> {
        level
            .iter()
            .find(|item| item.reference_id == reference_id)
            .cloned()
    }
}

/// Absolute path of the ledger file for a target directory.
pub fn ledger_path(dir: &Path) -> PathBuf {
    dir.join(LEDGER_FILE)
}

/// Load the ledger for a directory, migrating legacy files transparently.
///
/// Returns `Ok(None)` when no ledger file exists yet.
pub fn load(dir: &Path, minter: &mut dyn IdMinter) -> Result<Option<Ledger>> {
    let path = ledger_path(dir);
    if !path.exists() {
        return Ok(None);
    }

    let raw = local_files::local().read(&path)?;
    let ledger = load_and_migrate(&raw, minter)
        .map_err(|e| match e.code {
            crate::error::ErrorCode::LedgerInvalidFormat => {
                Error::ledger_invalid_format(path.display().to_string(), e.message)
            }
            _ => e,
        })?;
    Ok(Some(ledger))
}

/// Load the ledger for a directory, failing when no file exists.
///
/// `operation` names the caller so the missing-state message stays specific.
pub fn load_required(
    dir: &Path,
    minter: &mut dyn IdMinter,
    operation: &str,
    missing_message: &str,
) -> Result<Ledger> {
    load(dir, minter)?.ok_or_else(|| {
        Error::ledger_not_found(
            ledger_path(dir).display().to_string(),
            operation,
            missing_message,
        )
    })
}

/// Rewrite the ledger file wholesale, pretty-printed.
pub fn save(dir: &Path, ledger: &Ledger) -> Result<()> {
    let content = serde_json::to_string_pretty(ledger)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize ledger".to_string())))?;
    local_files::local().write(&ledger_path(dir), &content)
}

/// Remove the ledger file.
pub fn delete(dir: &Path) -> Result<()> {
    local_files::local().delete(&ledger_path(dir))
}
