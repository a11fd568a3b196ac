//! The staff lookup state machine.
//!
//! At most one query is ever "current". Each `begin` bumps a monotonically
//! increasing generation; a completion carrying an older generation belongs
//! to a superseded query and is dropped without touching state. This is what
//! guarantees last-committed-query-wins regardless of network arrival order.

use tracing::debug;

use crate::models::StaffRecord;

/// Parameters of one directory lookup: a required role, optionally narrowed
/// to a single school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffQuery {
    pub school: Option<String>,
    pub role: String,
}

impl StaffQuery {
    pub fn scoped(school: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            school: Some(school.into()),
            role: role.into(),
        }
    }

    pub fn for_role(role: impl Into<String>) -> Self {
        Self {
            school: None,
            role: role.into(),
        }
    }

    pub fn is_scoped(&self) -> bool {
        self.school.is_some()
    }

    pub fn describe(&self) -> String {
        match &self.school {
            Some(school) => format!("{} at {}", self.role, school),
            None => format!("all {}s", self.role),
        }
    }
}

/// Observable lookup state. `Idle` (never queried), an empty `Loaded`
/// (queried, nothing there) and `Failed` are three distinct outcomes and are
/// never collapsed into one another.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading {
        query: StaffQuery,
    },
    Loaded {
        query: StaffQuery,
        records: Vec<StaffRecord>,
    },
    Failed {
        query: StaffQuery,
        reason: String,
    },
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }

    pub fn query(&self) -> Option<&StaffQuery> {
        match self {
            FetchState::Idle => None,
            FetchState::Loading { query }
            | FetchState::Loaded { query, .. }
            | FetchState::Failed { query, .. } => Some(query),
        }
    }
}

/// Handed to the caller by [`StaffFetcher::begin`]; the caller performs the
/// actual network operation and reports back with the same generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub query: StaffQuery,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct StaffFetcher {
    state: FetchState,
    generation: u64,
}

impl StaffFetcher {
    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a lookup for `query`, superseding whatever was in flight.
    /// Issuing a query identical to the one already loaded starts a fresh
    /// lookup as well (a forced refresh); deduplication of repeated picks
    /// happens in the selection chain, not here.
    pub fn begin(&mut self, query: StaffQuery) -> FetchTicket {
        self.generation += 1;
        self.state = FetchState::Loading {
            query: query.clone(),
        };
        FetchTicket {
            query,
            generation: self.generation,
        }
    }

    /// Apply the outcome of the lookup started with `generation`. Returns
    /// `false` when the result belonged to a superseded query and was
    /// dropped; that is an expected occurrence, not a failure.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<Vec<StaffRecord>, String>,
    ) -> bool {
        if generation != self.generation || !self.state.is_loading() {
            debug!(
                generation,
                current = self.generation,
                "Dropping response for superseded staff query"
            );
            return false;
        }

        let query = match std::mem::take(&mut self.state) {
            FetchState::Loading { query } => query,
            // Unreachable: guarded by is_loading above
            other => {
                self.state = other;
                return false;
            }
        };

        self.state = match result {
            Ok(records) => FetchState::Loaded { query, records },
            Err(reason) => FetchState::Failed { query, reason },
        };
        true
    }

    /// Forget the current query entirely (its ancestors were cleared). Bumps
    /// the generation so an in-flight reply for it is dropped on arrival.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = FetchState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> StaffRecord {
        StaffRecord {
            name: name.to_string(),
            contact_number: String::new(),
            school: "Lotus School".to_string(),
            role: "Principal".to_string(),
            location: String::new(),
        }
    }

    #[test]
    fn test_success_and_failure_transitions() {
        let mut fetcher = StaffFetcher::default();
        assert_eq!(fetcher.state(), &FetchState::Idle);

        let ticket = fetcher.begin(StaffQuery::for_role("Principal"));
        assert!(fetcher.state().is_loading());

        assert!(fetcher.complete(ticket.generation, Ok(vec![record("Asha")])));
        match fetcher.state() {
            FetchState::Loaded { records, .. } => assert_eq!(records.len(), 1),
            other => panic!("unexpected state {:?}", other),
        }

        let ticket = fetcher.begin(StaffQuery::scoped("X", "CIC"));
        assert!(fetcher.complete(ticket.generation, Err("connection refused".into())));
        match fetcher.state() {
            FetchState::Failed { query, reason } => {
                assert_eq!(query.school.as_deref(), Some("X"));
                assert_eq!(reason, "connection refused");
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_later_query_wins_over_earlier_response() {
        let mut fetcher = StaffFetcher::default();
        let first = fetcher.begin(StaffQuery::for_role("Principal"));
        let second = fetcher.begin(StaffQuery::for_role("CIC"));

        // The first lookup resolves late; its records must never surface
        assert!(!fetcher.complete(first.generation, Ok(vec![record("Stale")])));
        assert!(fetcher.state().is_loading());

        assert!(fetcher.complete(second.generation, Ok(vec![record("Fresh")])));
        match fetcher.state() {
            FetchState::Loaded { query, records } => {
                assert_eq!(query.role, "CIC");
                assert_eq!(records[0].name, "Fresh");
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_empty_result_is_loaded_not_idle() {
        let mut fetcher = StaffFetcher::default();
        let ticket = fetcher.begin(StaffQuery::for_role("Principal"));
        assert!(fetcher.complete(ticket.generation, Ok(vec![])));
        assert_eq!(
            fetcher.state(),
            &FetchState::Loaded {
                query: StaffQuery::for_role("Principal"),
                records: vec![]
            }
        );
    }

    #[test]
    fn test_reset_drops_in_flight_reply() {
        let mut fetcher = StaffFetcher::default();
        let ticket = fetcher.begin(StaffQuery::scoped("Lotus School", "Principal"));
        fetcher.reset();
        assert_eq!(fetcher.state(), &FetchState::Idle);

        assert!(!fetcher.complete(ticket.generation, Ok(vec![record("Late")])));
        assert_eq!(fetcher.state(), &FetchState::Idle);
    }

    #[test]
    fn test_duplicate_completion_is_ignored() {
        let mut fetcher = StaffFetcher::default();
        let ticket = fetcher.begin(StaffQuery::for_role("CIC"));
        assert!(fetcher.complete(ticket.generation, Ok(vec![record("A")])));
        assert!(!fetcher.complete(ticket.generation, Ok(vec![record("B")])));
        match fetcher.state() {
            FetchState::Loaded { records, .. } => assert_eq!(records[0].name, "A"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_same_query_again_is_a_refresh() {
        let mut fetcher = StaffFetcher::default();
        let q = StaffQuery::for_role("Principal");
        let first = fetcher.begin(q.clone());
        assert!(fetcher.complete(first.generation, Ok(vec![record("A")])));

        let second = fetcher.begin(q);
        assert!(second.generation > first.generation);
        assert!(fetcher.state().is_loading());
    }
}
