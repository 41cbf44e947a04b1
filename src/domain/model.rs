use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type HardwareSetId = String;
pub type ProjectId = String;
pub type UserId = String;

/// A pool of interchangeable units of one hardware type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSet {
    pub id: HardwareSetId,
    pub name: String,
    #[serde(alias = "total_capacity")]
    pub total_capacity: i64,
}

impl HardwareSet {
    pub fn new(id: impl Into<String>, name: impl Into<String>, total_capacity: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            total_capacity,
        }
    }
}

/// A requested number of units as it arrived from the caller.
///
/// Malformed input is carried through instead of being rejected at the edge
/// so that authorization is still decided first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Quantity {
    Units(i64),
    Malformed(String),
}

impl Quantity {
    /// Whole numbers are accepted in any JSON number form (`7`, `7.0`).
    /// Integers beyond `i64` saturate, so they fail on capacity rather than
    /// on format.
    pub fn from_json(value: &serde_json::Value) -> Self {
        if let Some(units) = value.as_i64() {
            return Quantity::Units(units);
        }
        if value.as_u64().is_some() {
            return Quantity::Units(i64::MAX);
        }
        match value.as_f64() {
            Some(units) if units.is_finite() && units.fract() == 0.0 => {
                Quantity::Units(units as i64)
            }
            _ => Quantity::Malformed(value.to_string()),
        }
    }
}

impl From<i64> for Quantity {
    fn from(units: i64) -> Self {
        Quantity::Units(units)
    }
}

impl From<i32> for Quantity {
    fn from(units: i32) -> Self {
        Quantity::Units(i64::from(units))
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::Units(units) => write!(f, "{}", units),
            Quantity::Malformed(raw) => f.write_str(raw),
        }
    }
}

/// Capacity of one hardware set as seen by one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub hwset_id: HardwareSetId,
    pub name: String,
    pub total: i64,
    pub allocated_to_project: i64,
    pub available: i64,
}

/// Pool-wide totals for one hardware set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSummary {
    pub hwset_id: HardwareSetId,
    pub name: String,
    pub total: i64,
    pub available: i64,
    pub allocated: i64,
}

/// Outcome of a successful checkout or checkin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReceipt {
    pub message: String,
    #[serde(flatten)]
    pub view: ResourceView,
}

/// One checkout request against a hardware set.
///
/// Partial checkins split a record: the returned units keep the original
/// record with `checked_in_at` set, the remainder stays open as a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRecord {
    pub id: u64,
    pub hwset_id: HardwareSetId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub quantity: i64,
    pub checked_out_at: DateTime<Utc>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by: Option<UserId>,
}

impl CheckoutRecord {
    pub fn is_open(&self) -> bool {
        self.checked_in_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteOutcome {
    pub message: String,
    pub members: Vec<UserId>,
}

/// Members of a project. The owner is always a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSet {
    owner: UserId,
    members: BTreeSet<UserId>,
}

impl MemberSet {
    pub fn new(owner: impl Into<UserId>) -> Self {
        let owner = owner.into();
        let mut members = BTreeSet::new();
        members.insert(owner.clone());
        Self { owner, members }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn contains(&self, user: &str) -> bool {
        self.members.contains(user)
    }

    /// Returns `false` if the user was already a member.
    pub fn insert(&mut self, user: impl Into<UserId>) -> bool {
        self.members.insert(user.into())
    }

    /// Not reachable from the service yet: allocations outlive membership
    /// and there is no product decision on who may remove whom.
    pub fn remove(&mut self, user: &str) -> bool {
        if user == self.owner {
            return false;
        }
        self.members.remove(user)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn to_vec(&self) -> Vec<UserId> {
        self.members.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub owner: UserId,
    pub members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A project declared in configuration and registered at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSeed {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: Option<UserId>,
    #[serde(default)]
    pub members: Vec<UserId>,
}
