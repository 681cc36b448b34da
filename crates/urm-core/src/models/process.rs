//! Process domain model.
//!
//! A process is a named business workflow owned by one company. Processes
//! are soft-deleted; a deleted process is invisible to the authorization
//! gate and to listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: Uuid,
    pub company_id: Uuid,
    pub created_by: Option<Uuid>,
    /// Unique within the owning company.
    pub name: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProcess {
    pub company_id: Uuid,
    pub created_by: Option<Uuid>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProcess {
    pub name: Option<String>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessFilter {
    /// Restrict the listing to these process ids. Set by callers that
    /// have already resolved which processes a user may see.
    #[serde(default, skip_deserializing)]
    pub ids: Option<Vec<Uuid>>,
    pub company_id: Option<Uuid>,
    pub name: Option<String>,
    pub is_deleted: Option<bool>,
    pub search: Option<String>,
}
