//! User and group object-permission grants.
//!
//! Both families share one store; each endpoint only sees grants of its
//! own subject kind. Creating, changing and deleting grants is admin only.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Map, Value};
use urm_core::error::UrmError;
use urm_core::models::grant::{
    CreateObjectPermission, GrantSubject, ObjectPermission, ObjectPermissionFilter,
    PermissionTarget, SubjectKind, UpdateObjectPermission,
};
use urm_core::models::permission::TargetKind;
use urm_core::repository::{CrudRepository, ObjectPermissionRepository};
use uuid::Uuid;

use super::{Single, ok};
use crate::envelope::PageEnvelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{CurrentUser, IdPath, ValidJson, ValidQuery};
use crate::pagination::PageRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserGrantRequest {
    pub user_id: Uuid,
    pub permission_id: Uuid,
    pub target_type: TargetKind,
    pub target_id: Uuid,
}

/// `group_id` is a company group id.
#[derive(Debug, Deserialize)]
pub struct GroupGrantRequest {
    pub group_id: Uuid,
    pub permission_id: Uuid,
    pub target_type: TargetKind,
    pub target_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserGrantRequest {
    pub user_id: Option<Uuid>,
    pub permission_id: Option<Uuid>,
    pub target_type: Option<TargetKind>,
    pub target_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateGroupGrantRequest {
    pub group_id: Option<Uuid>,
    pub permission_id: Option<Uuid>,
    pub target_type: Option<TargetKind>,
    pub target_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserGrantQuery {
    pub user_id: Option<Uuid>,
    pub permission_id: Option<Uuid>,
    pub target_type: Option<TargetKind>,
    pub target_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GroupGrantQuery {
    pub group_id: Option<Uuid>,
    pub permission_id: Option<Uuid>,
    pub target_type: Option<TargetKind>,
    pub target_id: Option<Uuid>,
}

fn subject(kind: SubjectKind, id: Uuid) -> GrantSubject {
    match kind {
        SubjectKind::User => GrantSubject::User(id),
        SubjectKind::Group => GrantSubject::Group(id),
    }
}

fn subject_kind(subject: &GrantSubject) -> SubjectKind {
    match subject {
        GrantSubject::User(_) => SubjectKind::User,
        GrantSubject::Group(_) => SubjectKind::Group,
    }
}

/// Load a grant, treating grants of the other subject kind as missing.
async fn load(state: &AppState, kind: SubjectKind, id: Uuid) -> Result<ObjectPermission, ApiError> {
    let grant = state.grants.get_by_id(id).await?;
    if subject_kind(&grant.subject) != kind {
        return Err(UrmError::not_found("object_permission", id).into());
    }
    Ok(grant)
}

/// Merge a partial target into the grant's current one.
fn merged_target(
    current: PermissionTarget,
    kind: Option<TargetKind>,
    id: Option<Uuid>,
) -> Option<PermissionTarget> {
    match (kind, id) {
        (None, None) => None,
        (kind, id) => Some(PermissionTarget::new(
            kind.unwrap_or(current.kind),
            id.unwrap_or(current.id),
        )),
    }
}

async fn update_grant(
    state: &AppState,
    kind: SubjectKind,
    id: Uuid,
    subject_id: Option<Uuid>,
    permission_id: Option<Uuid>,
    target_type: Option<TargetKind>,
    target_id: Option<Uuid>,
) -> Single<ObjectPermission> {
    let current = load(state, kind, id).await?;
    let update = UpdateObjectPermission {
        subject: subject_id.map(|sid| subject(kind, sid)),
        permission_id,
        target: merged_target(current.target, target_type, target_id),
    };
    ok(state.grants.update(id, update).await?)
}

// ---------------------------------------------------------------------------
// User grants
// ---------------------------------------------------------------------------

pub async fn list_user_grants(
    State(state): State<AppState>,
    _current: CurrentUser,
    page: PageRequest,
    ValidQuery(query): ValidQuery<UserGrantQuery>,
) -> ApiResult<Json<PageEnvelope<ObjectPermission>>> {
    let filter = ObjectPermissionFilter {
        subject_type: Some(SubjectKind::User),
        subject_id: query.user_id,
        permission_id: query.permission_id,
        target_type: query.target_type,
        target_id: query.target_id,
    };
    let result = state.grants.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create_user_grant(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<UserGrantRequest>,
) -> Single<ObjectPermission> {
    current.require_admin()?;
    ok(state
        .grants
        .create(CreateObjectPermission {
            subject: GrantSubject::User(body.user_id),
            permission_id: body.permission_id,
            target: PermissionTarget::new(body.target_type, body.target_id),
        })
        .await?)
}

pub async fn get_user_grant(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<ObjectPermission> {
    ok(load(&state, SubjectKind::User, id).await?)
}

pub async fn update_user_grant(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateUserGrantRequest>,
) -> Single<ObjectPermission> {
    current.require_admin()?;
    update_grant(
        &state,
        SubjectKind::User,
        id,
        body.user_id,
        body.permission_id,
        body.target_type,
        body.target_id,
    )
    .await
}

pub async fn delete_user_grant(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Value> {
    current.require_admin()?;
    load(&state, SubjectKind::User, id).await?;
    state.grants.delete(id).await?;
    ok(Value::Object(Map::new()))
}

// ---------------------------------------------------------------------------
// Group grants
// ---------------------------------------------------------------------------

pub async fn list_group_grants(
    State(state): State<AppState>,
    _current: CurrentUser,
    page: PageRequest,
    ValidQuery(query): ValidQuery<GroupGrantQuery>,
) -> ApiResult<Json<PageEnvelope<ObjectPermission>>> {
    let filter = ObjectPermissionFilter {
        subject_type: Some(SubjectKind::Group),
        subject_id: query.group_id,
        permission_id: query.permission_id,
        target_type: query.target_type,
        target_id: query.target_id,
    };
    let result = state.grants.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create_group_grant(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<GroupGrantRequest>,
) -> Single<ObjectPermission> {
    current.require_admin()?;
    ok(state
        .grants
        .create(CreateObjectPermission {
            subject: GrantSubject::Group(body.group_id),
            permission_id: body.permission_id,
            target: PermissionTarget::new(body.target_type, body.target_id),
        })
        .await?)
}

pub async fn get_group_grant(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<ObjectPermission> {
    ok(load(&state, SubjectKind::Group, id).await?)
}

pub async fn update_group_grant(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateGroupGrantRequest>,
) -> Single<ObjectPermission> {
    current.require_admin()?;
    update_grant(
        &state,
        SubjectKind::Group,
        id,
        body.group_id,
        body.permission_id,
        body.target_type,
        body.target_id,
    )
    .await
}

pub async fn delete_group_grant(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Value> {
    current.require_admin()?;
    load(&state, SubjectKind::Group, id).await?;
    state.grants.delete(id).await?;
    ok(Value::Object(Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_target_keeps_the_other_half() {
        let current = PermissionTarget::action(Uuid::new_v4());
        let new_id = Uuid::new_v4();

        assert_eq!(merged_target(current, None, None), None);
        assert_eq!(
            merged_target(current, None, Some(new_id)),
            Some(PermissionTarget::action(new_id))
        );
        assert_eq!(
            merged_target(current, Some(TargetKind::Process), None),
            Some(PermissionTarget::process(current.id))
        );
    }
}
