//! Identity minting and resolution.

use std::collections::HashMap;

use super::Level;

/// Source of fresh, globally-unique identity strings.
///
/// Injected rather than called statically so tests can supply deterministic
/// sequences.
pub trait IdMinter {
    fn mint(&mut self) -> String;
}

/// Production minter: random v4 UUIDs.
pub struct UuidMinter;

impl IdMinter for UuidMinter {
    fn mint(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Outcome of matching candidate names against ledger history.
#[derive(Debug, Default)]
pub struct Resolution {
    /// name -> reference id of the level item whose `rename` matched it
    pub resolved: HashMap<String, String>,
    /// names with no prior history; treated as new files
    pub unresolved: Vec<String>,
}

/// Match candidate names to previously-assigned identities.
///
/// Levels are scanned newest to oldest; the first level whose `rename`
/// equals a candidate name wins, and the scan stops early once every name
/// is resolved.
pub fn resolve_identities(levels: &[Level], names: &[String]) -> Resolution {
    let mut resolved = HashMap::new();
    let mut unresolved: Vec<String> = names.to_vec();

    for level in levels {
        if unresolved.is_empty() {
            break;
        }

        unresolved.retain(|name| {
            match level.iter().find(|item| &item.rename == name) {
                Some(item) => {
                    resolved.insert(name.clone(), item.reference_id.clone());
                    false
                }
                None => true,
            }
        });
    }

    Resolution {
        resolved,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::item;
    use super::*;

    #[test]
    fn resolves_against_newest_level_first() {
        let levels = vec![
            vec![item("b.txt", "c.txt", "r1")],
            vec![item("a.txt", "b.txt", "r1")],
            vec![item("x.txt", "c.txt", "r9")],
        ];

        let res = resolve_identities(&levels, &["c.txt".to_string()]);
        assert_eq!(res.resolved.get("c.txt"), Some(&"r1".to_string()));
        assert!(res.unresolved.is_empty());
    }

    #[test]
    fn falls_through_to_older_levels() {
        let levels = vec![
            vec![item("b.txt", "c.txt", "r1")],
            vec![item("old.txt", "kept.txt", "r2")],
        ];

        let res = resolve_identities(&levels, &["kept.txt".to_string(), "c.txt".to_string()]);
        assert_eq!(res.resolved.get("kept.txt"), Some(&"r2".to_string()));
        assert_eq!(res.resolved.get("c.txt"), Some(&"r1".to_string()));
    }

    #[test]
    fn unmatched_names_are_unresolved() {
        let levels = vec![vec![item("a.txt", "b.txt", "r1")]];

        let res = resolve_identities(&levels, &["new.txt".to_string()]);
        assert!(res.resolved.is_empty());
        assert_eq!(res.unresolved, vec!["new.txt".to_string()]);
    }

    #[test]
    fn empty_history_resolves_nothing() {
        let res = resolve_identities(&[], &["a.txt".to_string()]);
        assert!(res.resolved.is_empty());
        assert_eq!(res.unresolved, vec!["a.txt".to_string()]);
    }

    #[test]
    fn uuid_minter_is_unique() {
        let mut minter = UuidMinter;
        let a = minter.mint();
        let b = minter.mint();
        assert_ne!(a, b);
    }
}
