//! Action domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single step of a [`Process`](super::process::Process).
///
/// `title` doubles as the action's code name: the authorization gate
/// matches it against the action name a route requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    pub process_id: Uuid,
    pub title: String,
    pub route: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAction {
    pub process_id: Uuid,
    pub title: String,
    pub route: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAction {
    pub title: Option<String>,
    pub route: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActionFilter {
    pub process_id: Option<Uuid>,
    pub title: Option<String>,
    pub search: Option<String>,
}
