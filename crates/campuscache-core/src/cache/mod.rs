//! Local caching module for fetched staff rosters.
//!
//! Successful lookups are written through to JSON files keyed by their
//! query, so a later session (or a failed refresh) can tell the user how old
//! the last good copy is. Data is considered stale after 60 minutes.

pub mod manager;

pub use manager::{CacheManager, CachedData};
