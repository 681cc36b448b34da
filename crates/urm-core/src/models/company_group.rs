//! Company group domain model.
//!
//! A company group ties a generic [`Group`](super::group::Group) to one
//! company. Users join company groups, and object-permission grants are
//! held by company groups, so every group grant is implicitly scoped to
//! the company of the group that holds it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyGroup {
    pub id: Uuid,
    pub company_id: Uuid,
    pub group_id: Uuid,
    /// Defaults to `"{company.title}_{group.name}"` when not provided.
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompanyGroup {
    pub company_id: Uuid,
    pub group_id: Uuid,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCompanyGroup {
    pub company_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompanyGroupFilter {
    pub company_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub search: Option<String>,
}

/// Default display name for a company group.
pub fn default_company_group_name(company_title: &str, group_name: &str) -> String {
    format!("{company_title}_{group_name}")
}
