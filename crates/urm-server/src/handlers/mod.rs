//! Request handlers, one module per resource family.

pub mod auth;
pub mod companies;
pub mod grants;
pub mod groups;
pub mod health;
pub mod org_chart;
pub mod permissions;
pub mod processes;
pub mod users;

use axum::Json;
use urm_core::error::UrmError;
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;

pub type Single<T> = ApiResult<Json<Envelope<T>>>;

pub(crate) fn ok<T>(data: T) -> Single<T> {
    Ok(Json(Envelope::ok(data)))
}

/// Reject writes aimed at a company other than the caller's active one.
pub(crate) fn ensure_active_company(user: &CurrentUser, company_id: Uuid) -> Result<(), ApiError> {
    if user.active_company()? != company_id {
        return Err(UrmError::validation(
            "company_id",
            "company_id must be the company you are currently working in.",
        )
        .into());
    }
    Ok(())
}
