use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::directory::StaffQuery;
use crate::models::{Role, StaffRecord};

/// Consider cache stale after 1 hour.
/// Staff assignments change rarely; an hour keeps refreshes cheap without
/// serving week-old contact numbers silently.
const CACHE_STALE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Covers clock skew (negative ages) as well
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    // ===== Staff rosters =====

    /// File-safe cache key for a staff query:
    /// `staff_principal`, `staff_lotus_school_cic`, ...
    pub fn roster_key(query: &StaffQuery) -> String {
        let mut key = String::from("staff");
        if let Some(ref school) = query.school {
            key.push('_');
            key.push_str(&sanitize(school));
        }
        key.push('_');
        key.push_str(&sanitize(&query.role));
        key
    }

    pub fn load_roster(&self, query: &StaffQuery) -> Result<Option<CachedData<Vec<StaffRecord>>>> {
        self.load(&Self::roster_key(query))
    }

    pub fn save_roster(&self, query: &StaffQuery, records: &[StaffRecord]) -> Result<()> {
        self.save(&Self::roster_key(query), &records)
    }

    /// Age display of a cached roster, if one exists.
    pub fn roster_age(&self, query: &StaffQuery) -> Option<String> {
        match self.load_roster(query) {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(key = %Self::roster_key(query), error = %e, "Failed to load cached roster for age display");
                None
            }
        }
    }

    /// Cache ages of the organization-wide roster per role, for the status
    /// bar and for deciding whether a prefetch is worthwhile.
    pub fn role_ages(&self) -> Vec<(Role, Option<String>)> {
        Role::ALL
            .iter()
            .map(|role| (*role, self.roster_age(&StaffQuery::for_role(role.label()))))
            .collect()
    }

    /// True when any role-wide roster is missing or older than the staleness
    /// window.
    pub fn any_role_stale(&self) -> bool {
        Role::ALL.iter().any(|role| {
            match self.load_roster(&StaffQuery::for_role(role.label())) {
                Ok(Some(cached)) => cached.is_stale(),
                Ok(None) => true, // No cache = stale
                Err(e) => {
                    debug!(role = %role, error = %e, "Failed to load cached roster for staleness check");
                    true // Error reading = treat as stale
                }
            }
        })
    }
}

fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_sep = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep && !out.is_empty() {
            out.push('_');
            last_was_sep = true;
        }
    }
    out.trim_end_matches('_').to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(61);
        assert!(old.is_stale());
        assert_eq!(old.age_display(), "1h ago");
    }

    #[test]
    fn test_roster_keys_are_file_safe() {
        assert_eq!(
            CacheManager::roster_key(&StaffQuery::for_role("Principal")),
            "staff_principal"
        );
        assert_eq!(
            CacheManager::roster_key(&StaffQuery::scoped("Lotus School", "Ops Manager")),
            "staff_lotus_school_ops_manager"
        );
        assert_eq!(
            CacheManager::roster_key(&StaffQuery::for_role("Co-ordinator")),
            "staff_co_ordinator"
        );
    }

    #[test]
    fn test_distinct_queries_get_distinct_keys() {
        let scoped = CacheManager::roster_key(&StaffQuery::scoped("Lotus School", "CIC"));
        let unscoped = CacheManager::roster_key(&StaffQuery::for_role("CIC"));
        assert_ne!(scoped, unscoped);
    }
}
