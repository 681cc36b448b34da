//! Permission domain model.
//!
//! A permission is a codename bound to the kind of object it can be
//! granted on. Grants themselves live in [`grant`](super::grant).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Codename required on an action to pass the authorization gate.
pub const DO_ACTION: &str = "dg_can_do_this_action";
/// Codename that makes a process visible in process listings.
pub const VIEW_PROCESS: &str = "dg_can_view_process";
pub const START_PROCESS: &str = "dg_can_start_process";

/// The kind of object a permission targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Action,
    Process,
    Company,
    Employee,
    Department,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Action => "action",
            TargetKind::Process => "process",
            TargetKind::Company => "company",
            TargetKind::Employee => "employee",
            TargetKind::Department => "department",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "action" => Some(TargetKind::Action),
            "process" => Some(TargetKind::Process),
            "company" => Some(TargetKind::Company),
            "employee" => Some(TargetKind::Employee),
            "department" => Some(TargetKind::Department),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    /// Stable identifier checked by the gate (e.g. `dg_can_do_this_action`).
    pub codename: String,
    pub name: String,
    pub target_type: TargetKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub codename: String,
    pub name: String,
    pub target_type: TargetKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePermission {
    pub codename: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PermissionFilter {
    pub codename: Option<String>,
    pub target_type: Option<TargetKind>,
    pub search: Option<String>,
}

/// Permissions every deployment starts with.
pub fn default_permissions() -> Vec<CreatePermission> {
    vec![
        CreatePermission {
            codename: DO_ACTION.into(),
            name: "OBP can do this action".into(),
            target_type: TargetKind::Action,
        },
        CreatePermission {
            codename: VIEW_PROCESS.into(),
            name: "OBP can view process".into(),
            target_type: TargetKind::Process,
        },
        CreatePermission {
            codename: START_PROCESS.into(),
            name: "OBP can start process".into(),
            target_type: TargetKind::Process,
        },
    ]
}
