//! The cascading selection engine shared by both directory screens.
//!
//! A screen is a chain of dependent pick lists (zone -> school -> ...) ending in
//! either a local timetable leaf or a remote staff lookup. This module owns
//! the rules of that interaction:
//!
//! - `selection`: the ordered key chain and its reset-on-ancestor-change rule
//! - `source`: per-variant providers of level options and search suggestions
//! - `search`: free-text matching that can jump the cascade directly
//! - `fetch`: the staff query state machine with stale-response protection
//! - `view`: the single displayable outcome derived from all of the above
//! - `lookup`: the two screen facades (`TimetableLookup`, `StaffLookup`) and
//!   the event stream a frontend subscribes to

pub mod fetch;
pub mod lookup;
pub mod search;
pub mod selection;
pub mod source;
pub mod view;

pub use fetch::{FetchState, FetchTicket, StaffFetcher, StaffQuery};
pub use lookup::{LookupEvent, StaffLookup, TimetableLookup};
pub use search::SearchState;
pub use selection::{SelectionChain, SelectionError};
pub use source::{Choice, LevelSource, StaffSource, Suggestion, TimetableSource};
pub use view::ViewState;
