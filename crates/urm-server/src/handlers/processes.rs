//! Processes and their actions.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use urm_core::error::UrmError;
use urm_core::models::action::{Action, ActionFilter, CreateAction, UpdateAction};
use urm_core::models::permission::{TargetKind, VIEW_PROCESS};
use urm_core::models::process::{CreateProcess, Process, ProcessFilter, UpdateProcess};
use urm_core::repository::CrudRepository;

use super::{Single, ok};
use crate::envelope::PageEnvelope;
use crate::error::ApiResult;
use crate::middleware::{CurrentUser, IdPath, ValidJson, ValidQuery};
use crate::pagination::PageRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProcessRequest {
    pub name: String,
}

/// Live processes of the caller's active company. Non-admins only see
/// processes they hold `dg_can_view_process` on.
pub async fn list(
    State(state): State<AppState>,
    current: CurrentUser,
    page: PageRequest,
    ValidQuery(mut filter): ValidQuery<ProcessFilter>,
) -> ApiResult<Json<PageEnvelope<Process>>> {
    filter.company_id = Some(current.active_company()?);
    filter.is_deleted = Some(false);
    if !current.0.is_admin {
        let visible = state
            .checker
            .objects_for_user(current.id(), VIEW_PROCESS, TargetKind::Process)
            .await?;
        filter.ids = Some(visible.into_iter().collect());
    }
    let result = state.processes.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

/// Create a process in the caller's active company.
pub async fn create(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<CreateProcessRequest>,
) -> Single<Process> {
    let company_id = current.active_company()?;
    ok(state
        .processes
        .create(CreateProcess {
            company_id,
            created_by: Some(current.id()),
            name: body.name,
        })
        .await?)
}

pub async fn get(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Process> {
    let process = state.processes.get_by_id(id).await?;
    if process.is_deleted {
        return Err(UrmError::not_found("process", id).into());
    }
    ok(process)
}

pub async fn update(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateProcess>,
) -> Single<Process> {
    ok(state.processes.update(id, body).await?)
}

pub async fn list_actions(
    State(state): State<AppState>,
    _current: CurrentUser,
    page: PageRequest,
    ValidQuery(filter): ValidQuery<ActionFilter>,
) -> ApiResult<Json<PageEnvelope<Action>>> {
    let result = state.actions.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create_action(
    State(state): State<AppState>,
    _current: CurrentUser,
    ValidJson(body): ValidJson<CreateAction>,
) -> Single<Action> {
    ok(state.actions.create(body).await?)
}

pub async fn get_action(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Action> {
    ok(state.actions.get_by_id(id).await?)
}

pub async fn update_action(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateAction>,
) -> Single<Action> {
    ok(state.actions.update(id, body).await?)
}
