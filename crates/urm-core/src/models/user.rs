//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum UserType {
    Staff,
    #[default]
    Customer,
    Supervisor,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Staff => "Staff",
            UserType::Customer => "Customer",
            UserType::Supervisor => "Supervisor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Staff" => Some(UserType::Staff),
            "Customer" => Some(UserType::Customer),
            "Supervisor" => Some(UserType::Supervisor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Login identifier, stored lowercase.
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_staff: bool,
    pub user_type: UserType,
    /// The company the user last switched into. Grants are only
    /// evaluated against this company.
    pub active_company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_admin: bool,
    pub user_type: Option<UserType>,
}

impl CreateUser {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
            is_staff: false,
            is_admin: false,
            user_type: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    pub is_staff: Option<bool>,
    pub user_type: Option<UserType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserFilter {
    /// Restrict the listing to these user ids. Set by callers that scope
    /// users to a company.
    #[serde(default, skip_deserializing)]
    pub ids: Option<Vec<Uuid>>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_type: Option<UserType>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}
