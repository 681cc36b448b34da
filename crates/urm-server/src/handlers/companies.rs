//! Companies and company membership.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use urm_core::models::company::{Company, CompanyFilter, CreateCompany, UpdateCompany};
use urm_core::models::user::User;
use urm_core::repository::CrudRepository;
use uuid::Uuid;

use super::{Single, ok};
use crate::envelope::PageEnvelope;
use crate::error::ApiResult;
use crate::middleware::{CurrentUser, IdPath, ValidJson, ValidQuery};
use crate::pagination::PageRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub user_id: Uuid,
}

pub async fn list(
    State(state): State<AppState>,
    _current: CurrentUser,
    page: PageRequest,
    ValidQuery(filter): ValidQuery<CompanyFilter>,
) -> ApiResult<Json<PageEnvelope<Company>>> {
    let result = state.companies.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create(
    State(state): State<AppState>,
    _current: CurrentUser,
    ValidJson(body): ValidJson<CreateCompany>,
) -> Single<Company> {
    ok(state.companies.create(body).await?)
}

pub async fn get(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Company> {
    ok(state.companies.get_by_id(id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateCompany>,
) -> Single<Company> {
    ok(state.companies.update(id, body).await?)
}

/// Attach a user to the company. Returns the user, whose active company
/// is set if they had none. Admin only.
pub async fn add_user(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<AddUserRequest>,
) -> Single<User> {
    current.require_admin()?;
    ok(state.membership.join_company(body.user_id, id).await?)
}
