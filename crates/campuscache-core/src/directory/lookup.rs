//! Per-screen engine facades.
//!
//! Each screen owns one selection chain, one search state and (for the staff
//! screen) one fetcher, and exposes a small mutation surface to the UI. State
//! changes are also queued as [`LookupEvent`]s so a frontend can subscribe
//! instead of diffing.
//!
//! The facades never perform I/O themselves: completing the staff cascade
//! produces a [`FetchTicket`] the application layer executes, feeding the
//! outcome back through [`StaffLookup::complete_fetch`].

use std::sync::Arc;

use super::fetch::{FetchState, FetchTicket, StaffFetcher, StaffQuery};
use super::search::SearchState;
use super::selection::{SelectionChain, SelectionError};
use super::source::{Choice, LevelSource, StaffSource, Suggestion, TimetableSource};
use super::view::{staff_view, timetable_view, ViewState};
use crate::models::{Role, StaffRecord, Timetable, ZoneDirectory};

/// Notifications queued by a lookup facade, drained with `take_events`.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupEvent {
    OptionsChanged { level: usize, choices: Vec<Choice> },
    Resolved(ViewState),
    SearchMatches(Vec<Suggestion>),
    FetchStateChanged(FetchState),
}

// ============================================================================
// Class timings screen
// ============================================================================

/// Zone -> school -> grade -> section against the bundled timings table.
/// Fully local; resolving the chain immediately yields the section's
/// subject -> time mapping.
pub struct TimetableLookup {
    source: TimetableSource,
    chain: SelectionChain,
    search: SearchState,
    events: Vec<LookupEvent>,
}

impl TimetableLookup {
    pub fn new(table: Arc<Timetable>) -> Self {
        let source = TimetableSource::new(table);
        let chain = SelectionChain::new(source.level_count());
        Self {
            source,
            chain,
            search: SearchState::default(),
            events: Vec::new(),
        }
    }

    /// A lookup over the table shipped with the binary.
    pub fn bundled() -> Self {
        Self::new(Arc::new(Timetable::bundled().clone()))
    }

    pub fn level_count(&self) -> usize {
        self.source.level_count()
    }

    pub fn chain(&self) -> &SelectionChain {
        &self.chain
    }

    /// Options for `level`, derived purely from the selections above it.
    /// Empty while the level is unreachable or has nothing to offer.
    pub fn options(&self, level: usize) -> Vec<Choice> {
        self.chain
            .prefix(level)
            .map(|picked| self.source.choices(&picked))
            .unwrap_or_default()
    }

    pub fn set_level(&mut self, level: usize, key: &str) -> Result<(), SelectionError> {
        let options = self.options(level);
        let changed = self.chain.set(level, key, &options)?;
        if !changed {
            return Ok(());
        }

        if level + 1 < self.level_count() {
            self.events.push(LookupEvent::OptionsChanged {
                level: level + 1,
                choices: self.options(level + 1),
            });
        }
        if self.chain.is_resolved() {
            self.events.push(LookupEvent::Resolved(self.view()));
        }
        Ok(())
    }

    pub fn search(&mut self, text: &str) {
        let universe = self.source.suggestions();
        self.search.run(text, &universe);
        self.events
            .push(LookupEvent::SearchMatches(self.search.matches().to_vec()));
    }

    /// Commit a school suggestion: zone and school snap into place, the
    /// deeper levels reset, and the input shows the committed label.
    /// Returns `false` for suggestion kinds this screen cannot use.
    pub fn select_suggestion(&mut self, suggestion: &Suggestion) -> bool {
        let Suggestion::School { zone, school, label } = suggestion else {
            return false;
        };
        self.chain.snap_prefix(&[zone.clone(), school.clone()]);
        self.search.commit(label);
        self.events.push(LookupEvent::SearchMatches(Vec::new()));
        self.events.push(LookupEvent::OptionsChanged {
            level: 2,
            choices: self.options(2),
        });
        true
    }

    pub fn search_text(&self) -> &str {
        self.search.text()
    }

    pub fn matches(&self) -> &[Suggestion] {
        self.search.matches()
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.events.push(LookupEvent::SearchMatches(Vec::new()));
    }

    pub fn view(&self) -> ViewState {
        timetable_view(&self.chain, self.source.table())
    }

    pub fn take_events(&mut self) -> Vec<LookupEvent> {
        std::mem::take(&mut self.events)
    }
}

// ============================================================================
// Staff directory screen
// ============================================================================

/// Zone -> school -> role against the static zone table, resolving into a
/// remote staff lookup. A role can also be picked on its own for an
/// organization-wide lookup, which doubles as the search universe.
pub struct StaffLookup {
    source: StaffSource,
    chain: SelectionChain,
    search: SearchState,
    fetcher: StaffFetcher,
    selected: Option<StaffRecord>,
    pending: Option<FetchTicket>,
    events: Vec<LookupEvent>,
}

impl StaffLookup {
    pub fn new(zones: Arc<ZoneDirectory>) -> Self {
        let source = StaffSource::new(zones);
        let chain = SelectionChain::new(source.level_count());
        Self {
            source,
            chain,
            search: SearchState::default(),
            fetcher: StaffFetcher::default(),
            selected: None,
            pending: None,
            events: Vec::new(),
        }
    }

    /// A lookup over the zone table shipped with the binary.
    pub fn bundled() -> Self {
        Self::new(Arc::new(ZoneDirectory::bundled().clone()))
    }

    pub fn level_count(&self) -> usize {
        self.source.level_count()
    }

    pub fn chain(&self) -> &SelectionChain {
        &self.chain
    }

    pub fn options(&self, level: usize) -> Vec<Choice> {
        self.chain
            .prefix(level)
            .map(|picked| self.source.choices(&picked))
            .unwrap_or_default()
    }

    /// Select a cascade level. Changing zone or school invalidates the
    /// current roster; completing the chain starts a school-scoped lookup.
    pub fn set_level(&mut self, level: usize, key: &str) -> Result<(), SelectionError> {
        let options = self.options(level);
        let changed = self.chain.set(level, key, &options)?;
        if !changed {
            return Ok(());
        }

        self.selected = None;
        // Cascade navigation starts a new context; a leftover committed name
        // in the input must not narrow the next result set
        if !self.search.text().is_empty() {
            self.search.clear();
            self.events.push(LookupEvent::SearchMatches(Vec::new()));
        }
        if level + 1 < self.level_count() {
            self.events.push(LookupEvent::OptionsChanged {
                level: level + 1,
                choices: self.options(level + 1),
            });
        }

        if level < StaffSource::ROLE {
            self.pending = None;
            self.fetcher.reset();
            self.events
                .push(LookupEvent::FetchStateChanged(FetchState::Idle));
        }

        if self.chain.is_resolved() {
            if let (Some(school), Some(role)) = (
                self.chain.key(StaffSource::SCHOOL),
                self.chain.key(StaffSource::ROLE),
            ) {
                let query = StaffQuery::scoped(school, role);
                self.start_fetch(query);
            }
        }
        Ok(())
    }

    /// Organization-wide lookup for a role, without touching the cascade.
    /// The records it returns also become the search universe.
    pub fn quick_role(&mut self, role: Role) {
        self.selected = None;
        self.start_fetch(StaffQuery::for_role(role.label()));
    }

    fn start_fetch(&mut self, query: StaffQuery) {
        let ticket = self.fetcher.begin(query);
        self.events
            .push(LookupEvent::FetchStateChanged(self.fetcher.state().clone()));
        self.pending = Some(ticket);
    }

    /// The lookup the application layer should execute next, if any.
    pub fn take_pending_fetch(&mut self) -> Option<FetchTicket> {
        self.pending.take()
    }

    /// Feed back the outcome of a lookup. Stale outcomes (superseded
    /// generation) are dropped and return `false`.
    pub fn complete_fetch(
        &mut self,
        generation: u64,
        result: Result<Vec<StaffRecord>, String>,
    ) -> bool {
        if !self.fetcher.complete(generation, result) {
            return false;
        }

        if let FetchState::Loaded { query, records } = self.fetcher.state() {
            if !query.is_scoped() {
                self.source.set_universe(records.clone());
            }
        }
        self.events
            .push(LookupEvent::FetchStateChanged(self.fetcher.state().clone()));
        if matches!(self.fetcher.state(), FetchState::Loaded { .. }) {
            self.events.push(LookupEvent::Resolved(self.view()));
        }
        true
    }

    pub fn fetch_state(&self) -> &FetchState {
        self.fetcher.state()
    }

    pub fn selected(&self) -> Option<&StaffRecord> {
        self.selected.as_ref()
    }

    /// True once there is anything to search over (a role-wide lookup has
    /// succeeded). Frontends gate the search input on this.
    pub fn has_search_universe(&self) -> bool {
        !self.source.universe().is_empty()
    }

    pub fn search(&mut self, text: &str) {
        let universe = self.source.suggestions();
        self.search.run(text, &universe);
        self.events
            .push(LookupEvent::SearchMatches(self.search.matches().to_vec()));
    }

    /// Commit a staff suggestion: that single record becomes the display,
    /// the suggestion list is emptied, and the input shows the name.
    pub fn select_suggestion(&mut self, suggestion: &Suggestion) -> bool {
        let Suggestion::Staff(record) = suggestion else {
            return false;
        };
        self.selected = Some(record.clone());
        self.search.commit(&record.name);
        self.events.push(LookupEvent::SearchMatches(Vec::new()));
        true
    }

    pub fn search_text(&self) -> &str {
        self.search.text()
    }

    pub fn matches(&self) -> &[Suggestion] {
        self.search.matches()
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.selected = None;
        self.events.push(LookupEvent::SearchMatches(Vec::new()));
    }

    pub fn view(&self) -> ViewState {
        staff_view(self.selected.as_ref(), self.search.text(), self.fetcher.state())
    }

    pub fn take_events(&mut self) -> Vec<LookupEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Arc<Timetable> {
        Arc::new(
            Timetable::from_json(
                r#"{"North": {"LotusSchool": {"5": {"A": {"Math": "9-10am"}},
                                             "6": {"B": {"Science": "11-12am"}}},
                             "MapleRidge": {"7": {"A": {"English": "8-9am"}}}},
                    "South": {"BayView": {"1": {"A": {"EVS": "9-10am"}}}}}"#,
            )
            .unwrap(),
        )
    }

    fn zones() -> Arc<ZoneDirectory> {
        Arc::new(
            ZoneDirectory::from_json(
                r#"{"North": ["Lotus School", "Maple Ridge"], "South": ["Bay View"]}"#,
            )
            .unwrap(),
        )
    }

    fn record(name: &str, school: &str, role: &str) -> StaffRecord {
        StaffRecord {
            name: name.to_string(),
            contact_number: "9876543210".to_string(),
            school: school.to_string(),
            role: role.to_string(),
            location: "Main Block".to_string(),
        }
    }

    #[test]
    fn test_full_cascade_resolves_section_timings() {
        let mut lookup = TimetableLookup::new(table());
        lookup.set_level(0, "North").unwrap();
        lookup.set_level(1, "LotusSchool").unwrap();
        lookup.set_level(2, "5").unwrap();
        lookup.set_level(3, "A").unwrap();

        assert_eq!(
            lookup.view(),
            ViewState::Timings(vec![("Math".to_string(), "9-10am".to_string())])
        );
    }

    #[test]
    fn test_option_lists_mirror_table_keys() {
        let mut lookup = TimetableLookup::new(table());
        assert!(lookup.options(1).is_empty(), "school level gated on zone");

        lookup.set_level(0, "North").unwrap();
        let options = lookup.options(1);
        let values: Vec<&str> = options.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["LotusSchool", "MapleRidge"]);
    }

    #[test]
    fn test_search_snap_equals_manual_navigation() {
        let mut searched = TimetableLookup::new(table());
        searched.search("lot");
        assert_eq!(searched.matches().len(), 1);
        let hit = searched.matches()[0].clone();
        assert_eq!(hit.label(), "Lotus School");
        assert!(searched.select_suggestion(&hit));

        // Input reflects the committed label, suggestions are gone
        assert_eq!(searched.search_text(), "Lotus School");
        assert!(searched.matches().is_empty());

        let mut manual = TimetableLookup::new(table());
        manual.set_level(0, "North").unwrap();
        manual.set_level(1, "LotusSchool").unwrap();

        assert_eq!(searched.chain(), manual.chain());
        for level in 0..searched.level_count() {
            assert_eq!(searched.options(level), manual.options(level));
        }
        // Grade and section remain open
        assert_eq!(searched.chain().key(2), None);
        assert_eq!(searched.chain().key(3), None);
    }

    #[test]
    fn test_set_level_rejections_do_not_disturb_state() {
        let mut lookup = TimetableLookup::new(table());
        lookup.set_level(0, "North").unwrap();
        lookup.take_events();

        assert!(lookup.set_level(9, "x").is_err());
        assert!(lookup.set_level(1, "NoSuchSchool").is_err());
        assert_eq!(lookup.chain().key(0), Some("North"));
        assert!(lookup.take_events().is_empty());
    }

    #[test]
    fn test_completed_staff_cascade_issues_scoped_query() {
        let mut lookup = StaffLookup::new(zones());
        lookup.set_level(0, "North").unwrap();
        lookup.set_level(1, "Lotus School").unwrap();
        lookup.set_level(2, "Principal").unwrap();

        let ticket = lookup.take_pending_fetch().expect("cascade completion starts a lookup");
        assert_eq!(ticket.query, StaffQuery::scoped("Lotus School", "Principal"));
        assert!(lookup.fetch_state().is_loading());

        let records = vec![record("Asha Verma", "Lotus School", "Principal")];
        assert!(lookup.complete_fetch(ticket.generation, Ok(records.clone())));
        assert_eq!(lookup.view(), ViewState::StaffList(records));
    }

    #[test]
    fn test_repeated_role_pick_does_not_refetch() {
        let mut lookup = StaffLookup::new(zones());
        lookup.set_level(0, "North").unwrap();
        lookup.set_level(1, "Lotus School").unwrap();
        lookup.set_level(2, "Principal").unwrap();
        let ticket = lookup.take_pending_fetch().unwrap();
        assert!(lookup.complete_fetch(ticket.generation, Ok(vec![])));

        // Same key again: no reset, no new ticket
        lookup.set_level(2, "Principal").unwrap();
        assert!(lookup.take_pending_fetch().is_none());
        assert_eq!(lookup.view(), ViewState::NoInformation);
    }

    #[test]
    fn test_ancestor_change_clears_roster_and_drops_late_reply() {
        let mut lookup = StaffLookup::new(zones());
        lookup.set_level(0, "North").unwrap();
        lookup.set_level(1, "Lotus School").unwrap();
        lookup.set_level(2, "CIC").unwrap();
        let ticket = lookup.take_pending_fetch().unwrap();

        // Changing the zone invalidates the in-flight scoped query
        lookup.set_level(0, "South").unwrap();
        assert_eq!(lookup.fetch_state(), &FetchState::Idle);
        assert_eq!(lookup.chain().key(1), None);
        assert_eq!(lookup.chain().key(2), None);

        let late = vec![record("Stale Person", "Lotus School", "CIC")];
        assert!(!lookup.complete_fetch(ticket.generation, Ok(late)));
        assert_eq!(lookup.fetch_state(), &FetchState::Idle);
        assert_eq!(lookup.view(), ViewState::SelectionPrompt);
    }

    #[test]
    fn test_failed_lookup_keeps_selection() {
        let mut lookup = StaffLookup::new(zones());
        lookup.set_level(0, "North").unwrap();
        lookup.set_level(1, "Lotus School").unwrap();
        lookup.set_level(2, "CIC").unwrap();
        let ticket = lookup.take_pending_fetch().unwrap();

        assert!(lookup.complete_fetch(ticket.generation, Err("network unreachable".into())));
        assert_eq!(
            lookup.view(),
            ViewState::LookupFailed("network unreachable".to_string())
        );
        // The chain is untouched by the failure
        assert_eq!(lookup.chain().key(0), Some("North"));
        assert_eq!(lookup.chain().key(1), Some("Lotus School"));
        assert_eq!(lookup.chain().key(2), Some("CIC"));
    }

    #[test]
    fn test_quick_role_feeds_search_universe() {
        let mut lookup = StaffLookup::new(zones());
        assert!(!lookup.has_search_universe());
        lookup.search("asha");
        assert!(lookup.matches().is_empty(), "early search must not fail");

        lookup.quick_role(Role::Principal);
        let ticket = lookup.take_pending_fetch().unwrap();
        assert_eq!(ticket.query, StaffQuery::for_role("Principal"));

        let records = vec![
            record("Asha Verma", "Lotus School", "Principal"),
            record("Ravi Nair", "Bay View", "Principal"),
        ];
        lookup.complete_fetch(ticket.generation, Ok(records));
        assert!(lookup.has_search_universe());

        lookup.search("asha");
        assert_eq!(lookup.matches().len(), 1);
        let hit = lookup.matches()[0].clone();
        assert!(lookup.select_suggestion(&hit));
        assert_eq!(lookup.search_text(), "Asha Verma");
        assert!(lookup.matches().is_empty());
        assert_eq!(
            lookup.view(),
            ViewState::StaffDetail(record("Asha Verma", "Lotus School", "Principal"))
        );
    }

    #[test]
    fn test_scoped_lookup_leaves_search_universe_alone() {
        let mut lookup = StaffLookup::new(zones());
        lookup.quick_role(Role::Cic);
        let ticket = lookup.take_pending_fetch().unwrap();
        lookup.complete_fetch(
            ticket.generation,
            Ok(vec![record("Meera Joshi", "Maple Ridge", "CIC")]),
        );
        assert!(lookup.has_search_universe());

        lookup.set_level(0, "North").unwrap();
        lookup.set_level(1, "Lotus School").unwrap();
        lookup.set_level(2, "CIC").unwrap();
        let ticket = lookup.take_pending_fetch().unwrap();
        lookup.complete_fetch(
            ticket.generation,
            Ok(vec![record("Someone Else", "Lotus School", "CIC")]),
        );

        lookup.search("meera");
        assert_eq!(lookup.matches().len(), 1);
    }

    #[test]
    fn test_events_are_queued_and_drained() {
        let mut lookup = StaffLookup::new(zones());
        lookup.set_level(0, "North").unwrap();
        let events = lookup.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, LookupEvent::OptionsChanged { level: 1, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, LookupEvent::FetchStateChanged(FetchState::Idle))));
        assert!(lookup.take_events().is_empty());

        lookup.quick_role(Role::Principal);
        let ticket = lookup.take_pending_fetch().unwrap();
        lookup.complete_fetch(ticket.generation, Ok(vec![]));
        let events = lookup.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, LookupEvent::FetchStateChanged(FetchState::Loading { .. }))));
        assert!(events
            .iter()
            .any(|e| matches!(e, LookupEvent::Resolved(ViewState::NoInformation))));
    }
}
