//! Authentication error types.

use thiserror::Error;
use urm_core::error::UrmError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("Enter a valid email address.")]
    InvalidEmail,

    #[error(
        "This password is too weak. It must contain at least {min_length} characters, \
         including a letter, a digit and a special character."
    )]
    WeakPassword { min_length: usize },

    #[error("The two password fields didn't match.")]
    PasswordMismatch,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for UrmError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::AccountInactive
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => UrmError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::InvalidEmail => UrmError::validation("email", err.to_string()),
            AuthError::WeakPassword { .. } => UrmError::validation("password", err.to_string()),
            AuthError::PasswordMismatch => {
                UrmError::validation("confirm_password", err.to_string())
            }
            AuthError::Crypto(msg) => UrmError::Crypto(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_errors_become_validation() {
        let err: UrmError = AuthError::WeakPassword { min_length: 8 }.into();
        assert!(matches!(err, UrmError::Validation { ref params, .. } if params == "password"));
        let err: UrmError = AuthError::InvalidEmail.into();
        assert!(matches!(err, UrmError::Validation { ref params, .. } if params == "email"));
        let err: UrmError = AuthError::PasswordMismatch.into();
        assert!(
            matches!(err, UrmError::Validation { ref params, .. } if params == "confirm_password")
        );
    }

    #[test]
    fn token_errors_become_authentication_failures() {
        let err: UrmError = AuthError::TokenExpired.into();
        assert!(matches!(err, UrmError::AuthenticationFailed { .. }));
    }
}
