//! Employees, departments and positions.
//!
//! Listings of company-owned rows are always restricted to the caller's
//! active company, and new rows may only be created in it.

use axum::Json;
use axum::extract::State;
use urm_core::models::department::{
    CompanyDepartment, CompanyDepartmentEmployee, CompanyDepartmentEmployeeFilter,
    CompanyDepartmentFilter, CreateCompanyDepartment, CreateCompanyDepartmentEmployee,
    CreateDepartment, Department, DepartmentFilter, UpdateCompanyDepartment,
    UpdateCompanyDepartmentEmployee, UpdateDepartment,
};
use urm_core::models::employee::{CreateEmployee, Employee, EmployeeFilter, UpdateEmployee};
use urm_core::models::position::{CreatePosition, Position, PositionFilter, UpdatePosition};
use urm_core::repository::CrudRepository;

use super::{Single, ensure_active_company, ok};
use crate::envelope::PageEnvelope;
use crate::error::ApiResult;
use crate::middleware::{CurrentUser, IdPath, ValidJson, ValidQuery};
use crate::pagination::PageRequest;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

pub async fn list_employees(
    State(state): State<AppState>,
    current: CurrentUser,
    page: PageRequest,
    ValidQuery(mut filter): ValidQuery<EmployeeFilter>,
) -> ApiResult<Json<PageEnvelope<Employee>>> {
    filter.company_id = Some(current.active_company()?);
    let result = state.employees.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

/// Runs behind the `user_management` / `can_add_employee` gate.
pub async fn create_employee(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<CreateEmployee>,
) -> Single<Employee> {
    ensure_active_company(&current, body.company_id)?;
    ok(state.employees.create(body).await?)
}

pub async fn get_employee(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Employee> {
    ok(state.employees.get_by_id(id).await?)
}

pub async fn update_employee(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateEmployee>,
) -> Single<Employee> {
    ok(state.employees.update(id, body).await?)
}

// ---------------------------------------------------------------------------
// Departments
// ---------------------------------------------------------------------------

pub async fn list_departments(
    State(state): State<AppState>,
    _current: CurrentUser,
    page: PageRequest,
    ValidQuery(filter): ValidQuery<DepartmentFilter>,
) -> ApiResult<Json<PageEnvelope<Department>>> {
    let result = state.departments.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create_department(
    State(state): State<AppState>,
    _current: CurrentUser,
    ValidJson(body): ValidJson<CreateDepartment>,
) -> Single<Department> {
    ok(state.departments.create(body).await?)
}

pub async fn get_department(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Department> {
    ok(state.departments.get_by_id(id).await?)
}

pub async fn update_department(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateDepartment>,
) -> Single<Department> {
    ok(state.departments.update(id, body).await?)
}

// ---------------------------------------------------------------------------
// Company departments
// ---------------------------------------------------------------------------

pub async fn list_company_departments(
    State(state): State<AppState>,
    current: CurrentUser,
    page: PageRequest,
    ValidQuery(mut filter): ValidQuery<CompanyDepartmentFilter>,
) -> ApiResult<Json<PageEnvelope<CompanyDepartment>>> {
    filter.company_id = Some(current.active_company()?);
    let result = state.company_departments.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create_company_department(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<CreateCompanyDepartment>,
) -> Single<CompanyDepartment> {
    ensure_active_company(&current, body.company_id)?;
    ok(state.company_departments.create(body).await?)
}

pub async fn get_company_department(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<CompanyDepartment> {
    ok(state.company_departments.get_by_id(id).await?)
}

pub async fn update_company_department(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateCompanyDepartment>,
) -> Single<CompanyDepartment> {
    ok(state.company_departments.update(id, body).await?)
}

// ---------------------------------------------------------------------------
// Company department employees
// ---------------------------------------------------------------------------

pub async fn list_company_department_employees(
    State(state): State<AppState>,
    current: CurrentUser,
    page: PageRequest,
    ValidQuery(mut filter): ValidQuery<CompanyDepartmentEmployeeFilter>,
) -> ApiResult<Json<PageEnvelope<CompanyDepartmentEmployee>>> {
    filter.company_id = Some(current.active_company()?);
    let result = state
        .company_department_employees
        .list(filter, page.pagination)
        .await?;
    Ok(page.respond(result))
}

pub async fn create_company_department_employee(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<CreateCompanyDepartmentEmployee>,
) -> Single<CompanyDepartmentEmployee> {
    let department = state
        .company_departments
        .get_by_id(body.company_department_id)
        .await?;
    ensure_active_company(&current, department.company_id)?;
    ok(state.company_department_employees.create(body).await?)
}

pub async fn get_company_department_employee(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<CompanyDepartmentEmployee> {
    ok(state.company_department_employees.get_by_id(id).await?)
}

pub async fn update_company_department_employee(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdateCompanyDepartmentEmployee>,
) -> Single<CompanyDepartmentEmployee> {
    ok(state.company_department_employees.update(id, body).await?)
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

pub async fn list_positions(
    State(state): State<AppState>,
    current: CurrentUser,
    page: PageRequest,
    ValidQuery(mut filter): ValidQuery<PositionFilter>,
) -> ApiResult<Json<PageEnvelope<Position>>> {
    filter.company_id = Some(current.active_company()?);
    let result = state.positions.list(filter, page.pagination).await?;
    Ok(page.respond(result))
}

pub async fn create_position(
    State(state): State<AppState>,
    current: CurrentUser,
    ValidJson(body): ValidJson<CreatePosition>,
) -> Single<Position> {
    ensure_active_company(&current, body.company_id)?;
    ok(state.positions.create(body).await?)
}

pub async fn get_position(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
) -> Single<Position> {
    ok(state.positions.get_by_id(id).await?)
}

pub async fn update_position(
    State(state): State<AppState>,
    _current: CurrentUser,
    IdPath(id): IdPath,
    ValidJson(body): ValidJson<UpdatePosition>,
) -> Single<Position> {
    ok(state.positions.update(id, body).await?)
}
