//! Personnel records and the selectable staff roles.

use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::format_phone;

/// One staff record as returned by the directory endpoint.
///
/// Immutable once received. Names are not globally unique, so list identity
/// is the (school, name, position-in-list) triple, see [`StaffRecord::list_key`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRecord {
    #[serde(rename = "principalName", default)]
    pub name: String,
    #[serde(rename = "contactNumber", default, deserialize_with = "number_or_string")]
    pub contact_number: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub location: String,
}

impl StaffRecord {
    /// Stable identity for list display; names alone can collide.
    pub fn list_key(&self, index: usize) -> String {
        format!("{}-{}-{}", self.school, self.name, index)
    }

    pub fn contact_display(&self) -> String {
        if self.contact_number.is_empty() {
            "-".to_string()
        } else {
            format_phone(&self.contact_number)
        }
    }
}

/// The endpoint serves contact numbers as either a bare number or a string.
fn number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected string or number for contact, got {}",
            other
        ))),
    }
}

/// The fixed set of roles the directory can be queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Principal,
    OpsManager,
    Cic,
    Coordinator,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Principal, Role::OpsManager, Role::Cic, Role::Coordinator];

    /// Wire label, used both as the `role` query parameter and for display.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Principal => "Principal",
            Role::OpsManager => "Ops Manager",
            Role::Cic => "CIC",
            Role::Coordinator => "Co-ordinator",
        }
    }

    pub fn from_label(label: &str) -> Option<Role> {
        Role::ALL.iter().copied().find(|r| r.label() == label)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
