//! The class-timings lookup table.
//!
//! A nested, insertion-ordered mapping shipped with the binary:
//! zone -> school -> grade -> section -> subject -> time-range string.
//! The table is read-only; it is parsed once at startup and shared.

use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::error;

/// Bundled timings data, compiled into the binary.
const CLASS_TIMINGS_JSON: &str = include_str!("../../data/class_timings.json");

/// Level names of the timings cascade, root first. The level after the last
/// entry holds subject -> time leaves.
pub const TIMING_LEVELS: [&str; 4] = ["zone", "school", "grade", "section"];

static BUNDLED: OnceLock<Timetable> = OnceLock::new();

/// One node of the timings table: either an inner mapping or a terminal
/// time-range string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimetableNode {
    Branch(IndexMap<String, TimetableNode>),
    Leaf(String),
}

impl TimetableNode {
    pub fn children(&self) -> Option<&IndexMap<String, TimetableNode>> {
        match self {
            TimetableNode::Branch(map) => Some(map),
            TimetableNode::Leaf(_) => None,
        }
    }

    pub fn leaf(&self) -> Option<&str> {
        match self {
            TimetableNode::Branch(_) => None,
            TimetableNode::Leaf(value) => Some(value),
        }
    }

    /// Child keys in insertion order. Empty for leaves.
    pub fn keys(&self) -> Vec<&str> {
        self.children()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Walk the given key chain from this node. Returns `None` as soon as a
    /// key is missing or a leaf is reached early; never panics.
    pub fn descend(&self, keys: &[&str]) -> Option<&TimetableNode> {
        let mut node = self;
        for key in keys {
            node = node.children()?.get(*key)?;
        }
        Some(node)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timetable {
    root: TimetableNode,
}

impl Timetable {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let root: IndexMap<String, TimetableNode> = serde_json::from_str(raw)?;
        Ok(Self {
            root: TimetableNode::Branch(root),
        })
    }

    /// The table shipped with the binary, parsed on first use.
    pub fn bundled() -> &'static Timetable {
        BUNDLED.get_or_init(|| {
            Timetable::from_json(CLASS_TIMINGS_JSON).unwrap_or_else(|e| {
                error!(error = %e, "Bundled class timings failed to parse");
                Timetable {
                    root: TimetableNode::Branch(IndexMap::new()),
                }
            })
        })
    }

    pub fn root(&self) -> &TimetableNode {
        &self.root
    }

    pub fn zones(&self) -> Vec<&str> {
        self.root.keys()
    }

    /// Every (zone, school) pair in the table, flattened in insertion order.
    pub fn schools(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::new();
        if let Some(zones) = self.root.children() {
            for (zone, node) in zones {
                for school in node.keys() {
                    pairs.push((zone.as_str(), school));
                }
            }
        }
        pairs
    }

    /// Subject -> time pairs for a fully specified section, in table order.
    /// `None` when any key along the chain is unknown.
    pub fn section_timings(
        &self,
        zone: &str,
        school: &str,
        grade: &str,
        section: &str,
    ) -> Option<Vec<(String, String)>> {
        let node = self.root.descend(&[zone, school, grade, section])?;
        let children = node.children()?;
        Some(
            children
                .iter()
                .filter_map(|(subject, n)| {
                    n.leaf().map(|time| (subject.clone(), time.to_string()))
                })
                .collect(),
        )
    }
}
