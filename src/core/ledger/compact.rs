//! Consuming restored levels and reconciling failed renames.

use super::{Ledger, Level, RenameItem};

/// Drop the levels a restore consumed and fold failed renames back in.
///
/// `target_level` is the depth that was just restored; levels older than it
/// are kept. Returns `None` when no history remains and nothing is pending,
/// meaning the ledger file should be deleted.
///
/// A failed rename never happened, so the file's true current name is
/// whatever the next-older level produced for that identity, not the failed
/// item's `original`. Each failed item is rewritten accordingly (or kept
/// unchanged when the identity has no older record) and the resulting
/// reconciliation level is prepended ahead of the remaining levels. A failed
/// record is never dropped.
pub fn compact(ledger: &Ledger, target_level: usize, failed: &[RenameItem]) -> Option<Ledger> {
    let start = target_level.min(ledger.transforms.len());
    let remaining: Vec<Level> = ledger.transforms[start..].to_vec();

    if remaining.is_empty() && failed.is_empty() {
        return None;
    }

    let reconciliation: Level = failed
        .iter()
        .map(|item| reconcile(item, remaining.first()))
        .collect();

    let mut transforms = remaining;
    if !reconciliation.is_empty() {
        transforms.insert(0, reconciliation);
    }

    Some(Ledger {
        source_path: ledger.source_path.clone(),
        transforms,
    })
}

fn reconcile(failed: &RenameItem, next_older: Option<&Level>) -> RenameItem {
    let mut item = failed.clone();
    if let Some(level) = next_older {
        if let Some(older) = Ledger::find_in_level(level, &failed.reference_id) {
            item.original = older.rename;
        }
    }
    item
}

#[cfg(test)]
mod tests {
    use super::super::test_support::item;
    use super::*;

    fn ledger(transforms: Vec<Level>) -> Ledger {
        Ledger {
            source_path: "/photos".to_string(),
            transforms,
        }
    }

    #[test]
    fn total_consumption_deletes() {
        let input = ledger(vec![
            vec![item("b.txt", "c.txt", "r1")],
            vec![item("a.txt", "b.txt", "r1")],
        ]);

        assert!(compact(&input, 2, &[]).is_none());
    }

    #[test]
    fn partial_consumption_keeps_older_levels() {
        let input = ledger(vec![
            vec![item("b.txt", "c.txt", "r1")],
            vec![item("a.txt", "b.txt", "r1")],
        ]);

        let out = compact(&input, 1, &[]).unwrap();
        assert_eq!(out.transforms, vec![vec![item("a.txt", "b.txt", "r1")]]);
    }

    #[test]
    fn failures_block_deletion() {
        let input = ledger(vec![vec![item("b.txt", "c.txt", "r1")]]);
        let failed = vec![item("b.txt", "c.txt", "r1")];

        let out = compact(&input, 1, &failed).unwrap();
        assert_eq!(out.transforms, vec![failed]);
    }

    #[test]
    fn failed_item_original_rewrites_to_next_older_rename() {
        // Restore of depth 2 collapsed 0.txt -> c.txt for r1 but the rename
        // failed: the file on disk is still c.txt and the older level still
        // says r1 is named b.txt at that depth.
        let input = ledger(vec![
            vec![item("b.txt", "c.txt", "r1")],
            vec![item("a.txt", "b.txt", "r1")],
            vec![item("0.txt", "a.txt", "r1")],
        ]);
        let failed = vec![item("0.txt", "c.txt", "r1")];

        let out = compact(&input, 2, &failed).unwrap();
        assert_eq!(out.transforms.len(), 2);
        // reconciliation level first, rewritten to the surviving lineage
        assert_eq!(out.transforms[0], vec![item("a.txt", "c.txt", "r1")]);
        assert_eq!(out.transforms[1], vec![item("0.txt", "a.txt", "r1")]);

        // lineage continuity holds for the next restore attempt
        assert_eq!(out.transforms[0][0].original, out.transforms[1][0].rename);
    }

    #[test]
    fn unknown_identity_keeps_failed_item_unchanged() {
        let input = ledger(vec![
            vec![item("b.txt", "c.txt", "r1")],
            vec![item("a.txt", "b.txt", "r1")],
        ]);
        let failed = vec![item("n.txt", "m.txt", "r9")];

        let out = compact(&input, 1, &failed).unwrap();
        assert_eq!(out.transforms[0], vec![item("n.txt", "m.txt", "r9")]);
    }

    #[test]
    fn target_beyond_history_is_clamped() {
        let input = ledger(vec![vec![item("a.txt", "b.txt", "r1")]]);
        assert!(compact(&input, 5, &[]).is_none());
    }
}
