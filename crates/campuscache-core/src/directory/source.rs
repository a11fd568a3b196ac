//! Option and suggestion providers for the two cascade variants.
//!
//! The cascade controller and the search resolver only ever talk to a
//! [`LevelSource`]; the timetable-backed and staff-backed screens each
//! implement it once.

use std::sync::Arc;

use crate::models::{Role, StaffRecord, Timetable, ZoneDirectory};
use crate::utils::spaced_label;

/// One selectable entry of a cascade level. `value` is the raw key used for
/// traversal; `label` is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// A choice whose label is the key itself.
    pub fn from_key(key: &str) -> Self {
        Self::new(key, key)
    }
}

/// A search-committable unit: either a school (with the ancestors needed to
/// snap the cascade onto it) or a full staff record.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    School {
        zone: String,
        school: String,
        label: String,
    },
    Staff(StaffRecord),
}

impl Suggestion {
    /// The text the search resolver matches against.
    pub fn label(&self) -> &str {
        match self {
            Suggestion::School { label, .. } => label,
            Suggestion::Staff(record) => &record.name,
        }
    }
}

/// What a cascade variant must provide: the option list below any selected
/// prefix, and the flat universe of search suggestions available right now.
pub trait LevelSource {
    fn level_count(&self) -> usize;

    /// Options for the level following `picked` (the selected keys of all
    /// shallower levels, root first). An empty list means the level is
    /// absent or exhausted; it is never an error.
    fn choices(&self, picked: &[String]) -> Vec<Choice>;

    /// The complete, unfiltered suggestion universe at this moment.
    fn suggestions(&self) -> Vec<Suggestion>;
}

// ============================================================================
// Timetable variant
// ============================================================================

/// Levels come straight out of the nested timings table; school keys are
/// compact and get display labels via [`spaced_label`].
pub struct TimetableSource {
    table: Arc<Timetable>,
}

/// Index of the school level, the only one with transformed labels.
const SCHOOL_LEVEL: usize = 1;

impl TimetableSource {
    pub fn new(table: Arc<Timetable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Timetable {
        &self.table
    }
}

impl LevelSource for TimetableSource {
    fn level_count(&self) -> usize {
        crate::models::timetable::TIMING_LEVELS.len()
    }

    fn choices(&self, picked: &[String]) -> Vec<Choice> {
        if picked.len() >= self.level_count() {
            return Vec::new();
        }
        let keys: Vec<&str> = picked.iter().map(String::as_str).collect();
        let Some(node) = self.table.root().descend(&keys) else {
            return Vec::new();
        };
        node.keys()
            .into_iter()
            .map(|key| {
                if picked.len() == SCHOOL_LEVEL {
                    Choice::new(spaced_label(key), key)
                } else {
                    Choice::from_key(key)
                }
            })
            .collect()
    }

    fn suggestions(&self) -> Vec<Suggestion> {
        self.table
            .schools()
            .into_iter()
            .map(|(zone, school)| Suggestion::School {
                zone: zone.to_string(),
                school: school.to_string(),
                label: spaced_label(school),
            })
            .collect()
    }
}

// ============================================================================
// Staff variant
// ============================================================================

/// Zone and school levels come from the static zone table, the role level is
/// the fixed role list. The suggestion universe is the record set of the most
/// recent successful role-wide fetch and changes over time.
pub struct StaffSource {
    zones: Arc<ZoneDirectory>,
    universe: Vec<StaffRecord>,
}

impl StaffSource {
    pub const ZONE: usize = 0;
    pub const SCHOOL: usize = 1;
    pub const ROLE: usize = 2;

    pub fn new(zones: Arc<ZoneDirectory>) -> Self {
        Self {
            zones,
            universe: Vec::new(),
        }
    }

    /// Replace (never merge) the searchable record set.
    pub fn set_universe(&mut self, records: Vec<StaffRecord>) {
        self.universe = records;
    }

    pub fn universe(&self) -> &[StaffRecord] {
        &self.universe
    }
}

impl LevelSource for StaffSource {
    fn level_count(&self) -> usize {
        3
    }

    fn choices(&self, picked: &[String]) -> Vec<Choice> {
        match picked.len() {
            0 => self.zones.zones().into_iter().map(Choice::from_key).collect(),
            1 => self
                .zones
                .schools(&picked[0])
                .iter()
                .map(|s| Choice::from_key(s))
                .collect(),
            2 => Role::ALL.iter().map(|r| Choice::from_key(r.label())).collect(),
            _ => Vec::new(),
        }
    }

    fn suggestions(&self) -> Vec<Suggestion> {
        self.universe.iter().cloned().map(Suggestion::Staff).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Timetable;

    fn timetable_source() -> TimetableSource {
        let table = Timetable::from_json(
            r#"{"North": {"LotusSchool": {"5": {"A": {"Math": "9-10am"}}}, "MapleRidge": {}},
                "South": {"BayView": {}}}"#,
        )
        .unwrap();
        TimetableSource::new(Arc::new(table))
    }

    #[test]
    fn test_timetable_choices_follow_table_order() {
        let source = timetable_source();
        let zones = source.choices(&[]);
        assert_eq!(
            zones.iter().map(|c| c.value.as_str()).collect::<Vec<_>>(),
            vec!["North", "South"]
        );
        // No duplicates by construction of the backing map
        let schools = source.choices(&["North".to_string()]);
        assert_eq!(schools.len(), 2);
    }

    #[test]
    fn test_school_labels_are_space_expanded() {
        let source = timetable_source();
        let schools = source.choices(&["North".to_string()]);
        assert_eq!(schools[0].label, "Lotus School");
        assert_eq!(schools[0].value, "LotusSchool");
        // Other levels keep raw keys as labels
        let grades = source.choices(&["North".to_string(), "LotusSchool".to_string()]);
        assert_eq!(grades[0].label, "5");
    }

    #[test]
    fn test_choices_past_leaf_or_unknown_are_empty() {
        let source = timetable_source();
        assert!(source.choices(&["Nowhere".to_string()]).is_empty());
        let deep = vec![
            "North".to_string(),
            "LotusSchool".to_string(),
            "5".to_string(),
            "A".to_string(),
        ];
        assert!(source.choices(&deep).is_empty());
    }

    #[test]
    fn test_timetable_suggestions_flatten_all_zones() {
        let source = timetable_source();
        let suggestions = source.suggestions();
        let labels: Vec<&str> = suggestions.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["Lotus School", "Maple Ridge", "Bay View"]);
    }

    #[test]
    fn test_staff_levels() {
        let zones = ZoneDirectory::from_json(r#"{"North": ["Lotus School"]}"#).unwrap();
        let source = StaffSource::new(Arc::new(zones));

        assert_eq!(source.choices(&[])[0].value, "North");
        let schools = source.choices(&["North".to_string()]);
        assert_eq!(schools[0].value, "Lotus School");
        let roles = source.choices(&["North".to_string(), "Lotus School".to_string()]);
        assert_eq!(roles.len(), Role::ALL.len());
        assert!(source
            .choices(&["a".into(), "b".into(), "c".into()])
            .is_empty());
    }

    #[test]
    fn test_staff_universe_replaced_not_merged() {
        let zones = ZoneDirectory::from_json(r#"{"North": []}"#).unwrap();
        let mut source = StaffSource::new(Arc::new(zones));
        assert!(source.suggestions().is_empty());

        let record = StaffRecord {
            name: "Asha Verma".into(),
            contact_number: String::new(),
            school: "Lotus School".into(),
            role: "Principal".into(),
            location: String::new(),
        };
        source.set_universe(vec![record.clone(), record.clone()]);
        assert_eq!(source.suggestions().len(), 2);

        source.set_universe(vec![record]);
        assert_eq!(source.suggestions().len(), 1);
    }
}
