//! Free-text search over the suggestion universe.
//!
//! Matching is a case-insensitive substring test against suggestion labels,
//! recomputed from scratch on every keystroke so results never depend on the
//! previous filter. Empty input means no matches, not all matches.

use super::source::Suggestion;
use crate::utils::contains_ignore_case;

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    text: String,
    matches: Vec<Suggestion>,
}

impl SearchState {
    /// The current input text. After a commit this is the committed label,
    /// not whatever the user had typed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn matches(&self) -> &[Suggestion] {
        &self.matches
    }

    /// Recompute matches for `text` against the complete universe. Safe to
    /// call with an empty universe (no role picked yet, nothing loaded):
    /// the result is simply no matches.
    pub fn run(&mut self, text: &str, universe: &[Suggestion]) {
        self.text = text.to_string();
        if text.is_empty() {
            self.matches.clear();
            return;
        }
        self.matches = universe
            .iter()
            .filter(|s| contains_ignore_case(s.label(), text))
            .cloned()
            .collect();
    }

    /// Record a committed pick: the input shows the chosen label and the
    /// suggestion list is emptied so stale matches can never linger next to
    /// a committed selection.
    pub fn commit(&mut self, label: &str) {
        self.text = label.to_string();
        self.matches.clear();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.matches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(label: &str) -> Suggestion {
        Suggestion::School {
            zone: "North".to_string(),
            school: label.replace(' ', ""),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let universe = vec![school("Lotus School"), school("Bay View School")];
        let mut search = SearchState::default();

        search.run("lot", &universe);
        assert_eq!(search.matches().len(), 1);
        assert_eq!(search.matches()[0].label(), "Lotus School");

        // Substring, not prefix: "view" hits the middle of a label
        search.run("VIEW", &universe);
        assert_eq!(search.matches().len(), 1);
        assert_eq!(search.matches()[0].label(), "Bay View School");
    }

    #[test]
    fn test_empty_text_yields_no_matches() {
        let universe = vec![school("Lotus School")];
        let mut search = SearchState::default();
        search.run("lotus", &universe);
        assert!(!search.matches().is_empty());

        search.run("", &universe);
        assert!(search.matches().is_empty());
    }

    #[test]
    fn test_empty_universe_is_not_an_error() {
        let mut search = SearchState::default();
        search.run("anything", &[]);
        assert!(search.matches().is_empty());
    }

    #[test]
    fn test_recomputed_from_scratch_each_keystroke() {
        let universe = vec![school("Lotus School"), school("Bay View School")];
        let mut search = SearchState::default();
        search.run("school", &universe);
        assert_eq!(search.matches().len(), 2);

        // Narrow, then widen again: the second run must not be limited to
        // the previous result set
        search.run("lotus", &universe);
        assert_eq!(search.matches().len(), 1);
        search.run("school", &universe);
        assert_eq!(search.matches().len(), 2);
    }

    #[test]
    fn test_commit_clears_matches_and_sets_text() {
        let universe = vec![school("Lotus School")];
        let mut search = SearchState::default();
        search.run("lot", &universe);
        assert!(!search.matches().is_empty());

        search.commit("Lotus School");
        assert_eq!(search.text(), "Lotus School");
        assert!(search.matches().is_empty());
    }
}
