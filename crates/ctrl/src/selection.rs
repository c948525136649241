#![forbid(unsafe_code)]

//! Row selection by topic name.
//!
//! Membership is identity-based: the set survives list refreshes
//! unchanged, so a selected name that drops out of the visible page
//! stays selected (harmless until cleared or acted on).

use rustc_hash::FxHashSet;

#[derive(Debug, Default, Clone)]
pub struct SelectionSet {
    names: FxHashSet<String>,
}

impl SelectionSet {
    /// Add the name if absent, remove it if present. Returns whether the
    /// name is selected afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.names.remove(name) {
            false
        } else {
            self.names.insert(name.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Copy of the current membership, sorted for deterministic dispatch
    /// and logging.
    pub fn snapshot(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.iter().cloned().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_toggle_selects() {
        let mut sel = SelectionSet::default();
        assert!(sel.toggle("orders"));
        assert!(sel.contains("orders"));
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn toggle_twice_is_a_no_op_pair() {
        let mut sel = SelectionSet::default();
        sel.toggle("orders");
        sel.toggle("payments");

        assert!(sel.toggle("audit"));
        assert!(!sel.toggle("audit"));
        assert_eq!(sel.snapshot(), vec!["orders".to_string(), "payments".to_string()]);
    }

    #[test]
    fn clear_empties_regardless_of_contents() {
        let mut sel = SelectionSet::default();
        for name in ["a", "b", "c"] {
            sel.toggle(name);
        }
        sel.clear();
        assert_eq!(sel.len(), 0);
        assert!(sel.is_empty());

        sel.clear();
        assert_eq!(sel.len(), 0);
    }

    #[test]
    fn snapshot_is_sorted() {
        let mut sel = SelectionSet::default();
        sel.toggle("zulu");
        sel.toggle("alpha");
        sel.toggle("mike");
        assert_eq!(
            sel.snapshot(),
            vec!["alpha".to_string(), "mike".to_string(), "zulu".to_string()]
        );
    }
}
