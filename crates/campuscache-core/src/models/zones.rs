//! Zone -> school reference data.
//!
//! Seeds the first two levels of the staff directory cascade. School names
//! here are already in display form (spaces included) and are sent verbatim
//! as the `school` query parameter.

use std::sync::OnceLock;

use indexmap::IndexMap;
use tracing::error;

const ZONES_SCHOOLS_JSON: &str = include_str!("../../data/zones_schools.json");

static BUNDLED: OnceLock<ZoneDirectory> = OnceLock::new();

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneDirectory {
    zones: IndexMap<String, Vec<String>>,
}

impl ZoneDirectory {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let zones: IndexMap<String, Vec<String>> = serde_json::from_str(raw)?;
        Ok(Self { zones })
    }

    /// The mapping shipped with the binary, parsed on first use.
    pub fn bundled() -> &'static ZoneDirectory {
        BUNDLED.get_or_init(|| {
            ZoneDirectory::from_json(ZONES_SCHOOLS_JSON).unwrap_or_else(|e| {
                error!(error = %e, "Bundled zone data failed to parse");
                ZoneDirectory::default()
            })
        })
    }

    pub fn zones(&self) -> Vec<&str> {
        self.zones.keys().map(String::as_str).collect()
    }

    /// Schools of a zone in listed order; empty for unknown zones.
    pub fn schools(&self, zone: &str) -> &[String] {
        self.zones.get(zone).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
