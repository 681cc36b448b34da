//! HTTP error mapping.
//!
//! Every failure leaves the API as
//! `{"is_success": false, "data": {"error_type", "params", "message"}}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use urm_auth::AuthError;
use urm_core::error::UrmError;

use crate::envelope::Envelope;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error_type: &'static str,
    pub params: String,
    pub message: String,
}

/// A [`UrmError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub UrmError);

impl From<UrmError> for ApiError {
    fn from(err: UrmError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            UrmError::Validation { .. }
            | UrmError::AlreadyExists { .. }
            | UrmError::Application(_)
            | UrmError::Database(_) => StatusCode::BAD_REQUEST,
            UrmError::Unauthorized | UrmError::AuthenticationFailed { .. } => {
                StatusCode::UNAUTHORIZED
            }
            UrmError::NotFound { .. }
            | UrmError::NoActiveCompany
            | UrmError::ProcessNotFound { .. } => StatusCode::NOT_FOUND,
            UrmError::Crypto(_) | UrmError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match &self.0 {
            UrmError::NotFound { .. } => "not_found",
            UrmError::AlreadyExists { .. } => "already_exists",
            UrmError::Validation { .. } => "validation_error",
            UrmError::AuthenticationFailed { .. } => "authentication_failed",
            UrmError::Unauthorized => "unauthorized",
            UrmError::NoActiveCompany => "no_active_company",
            UrmError::ProcessNotFound { .. } => "process_not_found",
            UrmError::Application(_) => "application_error",
            UrmError::Database(_) => "database_error",
            UrmError::Crypto(_) | UrmError::Internal(_) => "internal_error",
        }
    }

    fn body(&self) -> ErrorBody {
        let params = match &self.0 {
            UrmError::Validation { params, .. } => params.clone(),
            _ => String::new(),
        };
        let message = match &self.0 {
            UrmError::Crypto(_) | UrmError::Internal(_) => "Internal server error".to_string(),
            UrmError::Database(_) => "The request could not be stored.".to_string(),
            other => other.to_string(),
        };
        ErrorBody {
            error_type: self.error_type(),
            params,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else if matches!(self.0, UrmError::Database(_)) {
            tracing::warn!(error = %self.0, "Database rejected request");
        } else {
            tracing::debug!(error = %self.0, %status, "Request rejected");
        }
        (status, Json(Envelope::failure(self.body()))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_errors_map_to_their_statuses() {
        assert_eq!(
            ApiError(UrmError::NoActiveCompany).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(UrmError::ProcessNotFound {
                process_name: "onboarding".into()
            })
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(UrmError::Unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn store_errors_are_bad_requests() {
        for err in [
            UrmError::AlreadyExists {
                entity: "grant".into(),
            },
            UrmError::Database("boom".into()),
            UrmError::Application("nope".into()),
            UrmError::validation("title", "required"),
        ] {
            assert_eq!(ApiError(err).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let body = ApiError(UrmError::Crypto("bad key".into())).body();
        assert_eq!(body.error_type, "internal_error");
        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn database_details_are_not_exposed() {
        let detail = "Found 'x' for field `title`, with record `company:⟨42⟩`, but expected a string";
        let body = ApiError(UrmError::Database(detail.into())).body();
        assert_eq!(body.error_type, "database_error");
        assert_eq!(body.message, "The request could not be stored.");
        assert!(!body.message.contains("company"));
        assert!(body.params.is_empty());
    }

    #[test]
    fn validation_errors_name_their_params() {
        let body = ApiError(UrmError::validation("email", "Enter a valid email.")).body();
        assert_eq!(body.params, "email");
        assert_eq!(body.message, "Enter a valid email.");
    }
}
