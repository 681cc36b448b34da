//! Object-permission grants.
//!
//! A grant ties a subject (a user, or a company group) to a permission on
//! one concrete object. The object is a tagged [`PermissionTarget`]
//! rather than a polymorphic reference, so every grant names the kind of
//! row its `id` points at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::TargetKind;

/// Who holds a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum GrantSubject {
    User(Uuid),
    /// A company group id.
    Group(Uuid),
}

impl GrantSubject {
    pub fn kind_str(&self) -> &'static str {
        match self {
            GrantSubject::User(_) => "user",
            GrantSubject::Group(_) => "group",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            GrantSubject::User(id) | GrantSubject::Group(id) => *id,
        }
    }
}

/// The object a grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionTarget {
    pub kind: TargetKind,
    pub id: Uuid,
}

impl PermissionTarget {
    pub fn new(kind: TargetKind, id: Uuid) -> Self {
        Self { kind, id }
    }

    pub fn action(id: Uuid) -> Self {
        Self::new(TargetKind::Action, id)
    }

    pub fn process(id: Uuid) -> Self {
        Self::new(TargetKind::Process, id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectPermission {
    pub id: Uuid,
    pub subject: GrantSubject,
    pub permission_id: Uuid,
    pub target: PermissionTarget,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateObjectPermission {
    pub subject: GrantSubject,
    pub permission_id: Uuid,
    pub target: PermissionTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateObjectPermission {
    pub subject: Option<GrantSubject>,
    pub permission_id: Option<Uuid>,
    pub target: Option<PermissionTarget>,
}

/// Which subject family a listing is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    User,
    Group,
}

impl SubjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectKind::User => "user",
            SubjectKind::Group => "group",
        }
    }
}

/// Equality filters for grant listings. Every field maps to a stored
/// column of the same name.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObjectPermissionFilter {
    pub subject_type: Option<SubjectKind>,
    pub subject_id: Option<Uuid>,
    pub permission_id: Option<Uuid>,
    pub target_type: Option<TargetKind>,
    pub target_id: Option<Uuid>,
}
