//! The caller's own account and user administration.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use urm_core::error::UrmError;
use urm_core::models::user::{UpdateUser, User, UserFilter};
use urm_core::repository::{CompanyRepository, CrudRepository};
use uuid::Uuid;

use super::{Single, ok};
use crate::envelope::PageEnvelope;
use crate::error::ApiResult;
use crate::middleware::{CurrentUser, IdPath, ValidJson, ValidQuery};
use crate::pagination::PageRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SwitchCompanyRequest {
    pub company_id: Uuid,
}

/// Users attached to the caller's active company.
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    page: PageRequest,
    ValidQuery(mut filter): ValidQuery<UserFilter>,
) -> ApiResult<Json<PageEnvelope<User>>> {
    let company_id = current.active_company()?;
    filter.ids = Some(state.companies.member_ids(company_id).await?);
    let result = state.users.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn me(current: CurrentUser) -> Single<User> {
    ok(current.0)
}

pub async fn switch_company(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<SwitchCompanyRequest>,
) -> Single<User> {
    ok(state
        .membership
        .switch_company(current.id(), body.company_id)
        .await?)
}

fn can_manage(current: &CurrentUser, user_id: Uuid) -> bool {
    current.id() == user_id || current.0.is_admin
}

pub async fn get(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<User> {
    if !(can_manage(&current, id) || current.0.is_staff) {
        return Err(UrmError::Unauthorized.into());
    }
    ok(state.users.get_by_id(id).await?)
}

/// Users may edit their own names; flags and user type are admin-only.
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateUser>,
) -> Single<User> {
    if !can_manage(&current, id) {
        return Err(UrmError::Unauthorized.into());
    }
    let privileged = body.is_active.is_some()
        || body.is_admin.is_some()
        || body.is_staff.is_some()
        || body.user_type.is_some();
    if privileged && !current.0.is_admin {
        return Err(UrmError::Unauthorized.into());
    }
    ok(state.users.update(id, body).await?)
}
