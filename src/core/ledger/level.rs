//! Building a new ledger level from a transform batch.

use super::{resolve_identities, IdMinter, Ledger, RenameItem};

/// A rename produced by a transform, before any identity is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePair {
    pub original: String,
    pub rename: String,
}

/// Prepend one batch of renames as the newest ledger level.
///
/// Pairs whose `original` matches a historical `rename` reuse that identity
/// (the file is already tracked); anything else is a previously-untracked
/// file and gets a fresh identity. Persistence stays with the caller.
pub fn build_level(
    existing: Option<Ledger>,
    source_path: &str,
    pairs: &[RenamePair],
    minter: &mut dyn IdMinter,
) -> Ledger {
    let mut ledger = existing.unwrap_or_else(|| Ledger::new(source_path));

    let names: Vec<String> = pairs.iter().map(|p| p.original.clone()).collect();
    let resolution = resolve_identities(&ledger.transforms, &names);

    let level: Vec<RenameItem> = pairs
        .iter()
        .map(|pair| RenameItem {
            original: pair.original.clone(),
            rename: pair.rename.clone(),
            reference_id: resolution
                .resolved
                .get(&pair.original)
                .cloned()
                .unwrap_or_else(|| minter.mint()),
        })
        .collect();

    ledger.transforms.insert(0, level);
    ledger
}
