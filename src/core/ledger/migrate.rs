//! Ledger format detection and legacy upgrade.

use crate::error::{Error, Result};

use super::{IdMinter, Ledger, LegacyItem, RenameItem};

/// Decode a raw ledger file into the current schema.
///
/// Tagged-union decode: try the current schema first (strict keys at every
/// depth), then the legacy flat array, otherwise fail closed with a format
/// error. Legacy items have no identity, so a fresh `referenceId` is minted
/// per element, order preserved, and the result is wrapped as the sole level
/// of a new ledger reusing the first element's `sourcePath`.
///
/// Current-format input passes through unchanged, so migration is
/// idempotent.
pub fn load_and_migrate(raw: &str, minter: &mut dyn IdMinter) -> Result<Ledger> {
    if let Ok(ledger) = serde_json::from_str::<Ledger>(raw) {
        return Ok(ledger);
    }

    match serde_json::from_str::<Vec<LegacyItem>>(raw) {
        Ok(items) => upgrade_legacy(items, minter),
        Err(e) => Err(Error::ledger_invalid_format("<ledger>", e.to_string())),
    }
}

fn upgrade_legacy(items: Vec<LegacyItem>, minter: &mut dyn IdMinter) -> Result<Ledger> {
    // An empty array carries no source path to rebuild the ledger around.
    let source_path = match items.first() {
        Some(first) => first.source_path.clone(),
        None => {
            return Err(Error::ledger_invalid_format(
                "<ledger>",
                "legacy history is empty",
            ))
        }
    };

    let level = items
        .into_iter()
        .map(|item| RenameItem {
            original: item.original,
            rename: item.rename,
            reference_id: minter.mint(),
        })
        .collect();

    Ok(Ledger {
        source_path,
        transforms: vec![level],
    })
}
