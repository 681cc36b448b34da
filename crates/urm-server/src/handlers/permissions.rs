//! Permission definitions.

use axum::Json;
use axum::extract::State;
use urm_core::models::permission::{
    CreatePermission, Permission, PermissionFilter, UpdatePermission,
};
use urm_core::repository::CrudRepository;

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
    ValidQuery(filter): ValidQuery<PermissionFilter>,
) -> ApiResult<Json<PageEnvelope<Permission>>> {
    let result = state.permissions.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create(
    State(state): State<AppState>,
    _current: CurrentUser,
    ValidJson(body): ValidJson<CreatePermission>,
) -> Single<Permission> {
    ok(state.permissions.create(body).await?)
}

pub async fn get(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Permission> {
    ok(state.permissions.get_by_id(id).await?)
}

pub async fn update(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdatePermission>,
) -> Single<Permission> {
    ok(state.permissions.update(id, body).await?)
}
