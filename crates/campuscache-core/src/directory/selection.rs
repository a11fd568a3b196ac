//! The ordered chain of cascade selections.
//!
//! All mutation goes through [`SelectionChain::set`], which owns the reset
//! rule: changing a level clears every deeper level, and a selection can
//! never exist without all of its ancestors.

use thiserror::Error;

use super::source::Choice;

/// Rejected selection inputs. These indicate a caller bug (the UI offered a
/// choice the engine never produced); the chain is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("selection level {0} is out of range")]
    LevelOutOfRange(usize),

    #[error("'{key}' is not among the current options for level {level}")]
    UnknownChoice { level: usize, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChain {
    keys: Vec<Option<String>>,
}

impl SelectionChain {
    pub fn new(level_count: usize) -> Self {
        Self {
            keys: vec![None; level_count],
        }
    }

    pub fn level_count(&self) -> usize {
        self.keys.len()
    }

    pub fn key(&self, level: usize) -> Option<&str> {
        self.keys.get(level).and_then(|k| k.as_deref())
    }

    /// Number of consecutively selected levels starting at the root.
    pub fn depth(&self) -> usize {
        self.keys.iter().take_while(|k| k.is_some()).count()
    }

    /// The selected keys for levels `0..level`, or `None` if any of them is
    /// still unset (the level is not reachable yet).
    pub fn prefix(&self, level: usize) -> Option<Vec<String>> {
        if level > self.keys.len() {
            return None;
        }
        self.keys[..level]
            .iter()
            .map(|k| k.clone())
            .collect::<Option<Vec<_>>>()
    }

    /// True once every level has a selection.
    pub fn is_resolved(&self) -> bool {
        self.keys.iter().all(|k| k.is_some())
    }

    /// Select `key` at `level`, validated against the options currently on
    /// offer there. Clears all deeper levels on change. Re-selecting the key
    /// already present is a no-op (returns `Ok(false)`) so downstream state
    /// is not reset or refetched redundantly.
    pub fn set(
        &mut self,
        level: usize,
        key: &str,
        options: &[Choice],
    ) -> Result<bool, SelectionError> {
        if level >= self.keys.len() {
            return Err(SelectionError::LevelOutOfRange(level));
        }
        if !options.iter().any(|c| c.value == key) {
            return Err(SelectionError::UnknownChoice {
                level,
                key: key.to_string(),
            });
        }

        if self.keys[level].as_deref() == Some(key) {
            return Ok(false);
        }

        self.keys[level] = Some(key.to_string());
        self.clear_from(level + 1);
        Ok(true)
    }

    /// Clear `level` and everything deeper.
    pub fn clear_from(&mut self, level: usize) {
        for key in self.keys.iter_mut().skip(level) {
            *key = None;
        }
    }

    pub fn clear(&mut self) {
        self.clear_from(0);
    }

    /// Overwrite the leading levels with known-good keys (a committed search
    /// suggestion carries its own ancestors) and clear the rest.
    pub fn snap_prefix(&mut self, keys: &[String]) {
        for (level, slot) in self.keys.iter_mut().enumerate() {
            *slot = keys.get(level).cloned();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(keys: &[&str]) -> Vec<Choice> {
        keys.iter().map(|k| Choice::from_key(k)).collect()
    }

    #[test]
    fn test_set_clears_deeper_levels() {
        let mut chain = SelectionChain::new(4);
        chain.set(0, "North", &choices(&["North"])).unwrap();
        chain.set(1, "Lotus", &choices(&["Lotus"])).unwrap();
        chain.set(2, "5", &choices(&["5"])).unwrap();
        chain.set(3, "A", &choices(&["A"])).unwrap();
        assert!(chain.is_resolved());

        // Changing the school invalidates grade and section
        chain.set(1, "Maple", &choices(&["Lotus", "Maple"])).unwrap();
        assert_eq!(chain.key(0), Some("North"));
        assert_eq!(chain.key(1), Some("Maple"));
        assert_eq!(chain.key(2), None);
        assert_eq!(chain.key(3), None);
    }

    #[test]
    fn test_same_key_is_noop() {
        let mut chain = SelectionChain::new(3);
        chain.set(0, "North", &choices(&["North"])).unwrap();
        chain.set(1, "Lotus", &choices(&["Lotus"])).unwrap();

        let changed = chain.set(0, "North", &choices(&["North"])).unwrap();
        assert!(!changed);
        // Deeper selection survives
        assert_eq!(chain.key(1), Some("Lotus"));
    }

    #[test]
    fn test_out_of_range_leaves_chain_unchanged() {
        let mut chain = SelectionChain::new(2);
        chain.set(0, "North", &choices(&["North"])).unwrap();
        let before = chain.clone();

        let err = chain.set(5, "x", &choices(&["x"])).unwrap_err();
        assert_eq!(err, SelectionError::LevelOutOfRange(5));
        assert_eq!(chain, before);
    }

    #[test]
    fn test_unknown_key_leaves_chain_unchanged() {
        let mut chain = SelectionChain::new(2);
        chain.set(0, "North", &choices(&["North"])).unwrap();
        let before = chain.clone();

        let err = chain.set(1, "Rose", &choices(&["Lotus"])).unwrap_err();
        assert_eq!(
            err,
            SelectionError::UnknownChoice {
                level: 1,
                key: "Rose".to_string()
            }
        );
        assert_eq!(chain, before);
    }

    #[test]
    fn test_prefix_requires_contiguous_selection() {
        let mut chain = SelectionChain::new(3);
        assert_eq!(chain.prefix(0), Some(vec![]));
        assert_eq!(chain.prefix(1), None);

        chain.set(0, "North", &choices(&["North"])).unwrap();
        assert_eq!(chain.prefix(1), Some(vec!["North".to_string()]));
        assert_eq!(chain.prefix(2), None);
        assert_eq!(chain.depth(), 1);
    }

    #[test]
    fn test_snap_prefix_sets_ancestors_and_clears_rest() {
        let mut chain = SelectionChain::new(4);
        chain.set(0, "South", &choices(&["South"])).unwrap();
        chain.snap_prefix(&["North".to_string(), "Lotus".to_string()]);

        assert_eq!(chain.key(0), Some("North"));
        assert_eq!(chain.key(1), Some("Lotus"));
        assert_eq!(chain.key(2), None);
        assert_eq!(chain.key(3), None);
    }
}
