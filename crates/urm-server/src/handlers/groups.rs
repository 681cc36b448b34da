//! Groups and company groups.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use urm_core::error::UrmError;
use urm_core::models::company_group::{
    CompanyGroup, CompanyGroupFilter, CreateCompanyGroup, UpdateCompanyGroup,
};
use urm_core::models::group::{CreateGroup, Group, GroupFilter, UpdateGroup};
use urm_core::repository::{CompanyGroupRepository, CompanyRepository, CrudRepository};
use uuid::Uuid;

use super::{Single, ok};
use crate::envelope::PageEnvelope;
use crate::error::ApiResult;
use crate::middleware::{CurrentUser, IdPath, ValidJson, ValidQuery};
use crate::pagination::PageRequest;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    _current: CurrentUser,
    page: PageRequest,
    ValidQuery(filter): ValidQuery<GroupFilter>,
) -> ApiResult<Json<PageEnvelope<Group>>> {
    let result = state.groups.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create(
    State(state): State<AppState>,
    _current: CurrentUser,
    ValidJson(body): ValidJson<CreateGroup>,
) -> Single<Group> {
    ok(state.groups.create(body).await?)
}

pub async fn get(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Group> {
    ok(state.groups.get_by_id(id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateGroup>,
) -> Single<Group> {
    ok(state.groups.update(id, body).await?)
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

pub async fn list_company_groups(
    State(state): State<AppState>,
    _current: CurrentUser,
    page: PageRequest,
    ValidQuery(filter): ValidQuery<CompanyGroupFilter>,
) -> ApiResult<Json<PageEnvelope<CompanyGroup>>> {
    let result = state.company_groups.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create_company_group(
    State(state): State<AppState>,
    _current: CurrentUser,
    ValidJson(body): ValidJson<CreateCompanyGroup>,
) -> Single<CompanyGroup> {
    ok(state.company_groups.create(body).await?)
}

pub async fn get_company_group(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<CompanyGroup> {
    ok(state.company_groups.get_by_id(id).await?)
}

pub async fn update_company_group(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateCompanyGroup>,
) -> Single<CompanyGroup> {
    ok(state.company_groups.update(id, body).await?)
}

/// Add a user to a company group. Admin only; the user must belong to
/// the group's company.
pub async fn add_member(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<AddMemberRequest>,
) -> Single<CompanyGroup> {
    current.require_admin()?;
    let company_group = state.company_groups.get_by_id(id).await?;
    if !state
        .companies
        .is_member(company_group.company_id, body.user_id)
        .await?
    {
        return Err(UrmError::validation(
            "user_id",
            "The user is not a member of this group's company.",
        )
        .into());
    }
    state.company_groups.add_member(id, body.user_id).await?;
    ok(company_group)
}
