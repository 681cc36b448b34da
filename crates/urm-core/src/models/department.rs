//! Department and company org-chart models.
//!
//! A [`Department`] is a global catalogue entry. A [`CompanyDepartment`]
//! places it inside one company's tree, and a
//! [`CompanyDepartmentEmployee`] staffs it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub title: String,
    pub abbreviation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartment {
    pub title: String,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDepartment {
    pub title: Option<String>,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DepartmentFilter {
    pub title: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDepartment {
    pub id: Uuid,
    pub company_id: Uuid,
    pub department_id: Uuid,
    /// Parent node in the company's department tree.
    pub parent_id: Option<Uuid>,
    /// Employee managing this department.
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompanyDepartment {
    pub company_id: Uuid,
    pub department_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCompanyDepartment {
    pub parent_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompanyDepartmentFilter {
    pub company_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDepartmentEmployee {
    pub id: Uuid,
    /// Copied from the company department on create.
    pub company_id: Uuid,
    pub company_department_id: Uuid,
    pub employee_id: Uuid,
    pub supervisor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompanyDepartmentEmployee {
    pub company_department_id: Uuid,
    pub employee_id: Uuid,
    pub supervisor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateCompanyDepartmentEmployee {
    pub supervisor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompanyDepartmentEmployeeFilter {
    pub company_id: Option<Uuid>,
    pub company_department_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
}
