//! Error types for the URM system.

use thiserror::Error;

/// User-facing message returned when the caller has not selected a company.
pub const EMPTY_COMPANY_MESSAGE: &str =
    "The company field is empty. Please select or enter your company to proceed.";

/// User-facing message returned when the gate denies an action.
pub const UNAUTHORIZED_ACTION_MESSAGE: &str = "Looks like you need a different level of access \
     to perform this action. Please contact your administrator for assistance.";

#[derive(Debug, Error)]
pub enum UrmError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// Bad input shape. `params` names the offending field(s).
    #[error("{message}")]
    Validation { params: String, message: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("{}", UNAUTHORIZED_ACTION_MESSAGE)]
    Unauthorized,

    #[error("{}", EMPTY_COMPANY_MESSAGE)]
    NoActiveCompany,

    #[error("We couldn't find a service called {process_name} running.")]
    ProcessNotFound { process_name: String },

    /// Generic business-rule failure.
    #[error("{0}")]
    Application(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UrmError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(params: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            params: params.into(),
            message: message.into(),
        }
    }
}

pub type UrmResult<T> = Result<T, UrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_not_found_names_the_process() {
        let err = UrmError::ProcessNotFound {
            process_name: "onboarding".into(),
        };
        assert_eq!(
            err.to_string(),
            "We couldn't find a service called onboarding running."
        );
    }

    #[test]
    fn gate_errors_carry_user_facing_messages() {
        assert_eq!(UrmError::NoActiveCompany.to_string(), EMPTY_COMPANY_MESSAGE);
        assert_eq!(
            UrmError::Unauthorized.to_string(),
            UNAUTHORIZED_ACTION_MESSAGE
        );
    }
}
