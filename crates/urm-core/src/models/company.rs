//! Company domain model.
//!
//! Companies are the scoping unit of the system. Processes, company
//! groups, employees, positions and company departments all belong to
//! exactly one company, and a user acts inside one active company at a
//! time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    /// Human-readable name.
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    pub title: String,
}

/// Fields that can be updated on an existing company.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCompany {
    pub title: Option<String>,
}

/// Equality filters for company listings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompanyFilter {
    pub title: Option<String>,
    pub search: Option<String>,
}
