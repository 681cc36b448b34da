//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Every entity exposes the same
//! [`CrudRepository`] surface; entity traits add the lookups the
//! authorization gate and the auth service depend on.

use uuid::Uuid;

use crate::error::UrmResult;
use crate::models::{
    action::{Action, ActionFilter, CreateAction, UpdateAction},
    company::{Company, CompanyFilter, CreateCompany, UpdateCompany},
    company_group::{CompanyGroup, CompanyGroupFilter, CreateCompanyGroup, UpdateCompanyGroup},
    department::{
        CompanyDepartment, CompanyDepartmentEmployee, CompanyDepartmentEmployeeFilter,
        CompanyDepartmentFilter, CreateCompanyDepartment, CreateCompanyDepartmentEmployee,
        CreateDepartment, Department, DepartmentFilter, UpdateCompanyDepartment,
        UpdateCompanyDepartmentEmployee, UpdateDepartment,
    },
    employee::{CreateEmployee, Employee, EmployeeFilter, UpdateEmployee},
    grant::{
        CreateObjectPermission, GrantSubject, ObjectPermission, ObjectPermissionFilter,
        UpdateObjectPermission,
    },
    group::{CreateGroup, Group, GroupFilter, UpdateGroup},
    permission::{CreatePermission, Permission, PermissionFilter, TargetKind, UpdatePermission},
    position::{CreatePosition, Position, PositionFilter, UpdatePosition},
    process::{CreateProcess, Process, ProcessFilter, UpdateProcess},
    session::{CreateSession, Session},
    user::{CreateUser, UpdateUser, User, UserFilter},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Create / read / update / list shared by every entity.
///
/// `update` only applies the fields that are set on the input; applying
/// the same input twice leaves the stored row unchanged apart from
/// `updated_at`.
pub trait CrudRepository: Send + Sync {
    type Entity: Send;
    type Create: Send;
    type Update: Send;
    type Filter: Send;

    fn create(&self, input: Self::Create) -> impl Future<Output = UrmResult<Self::Entity>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = UrmResult<Self::Entity>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: Self::Update,
    ) -> impl Future<Output = UrmResult<Self::Entity>> + Send;
    fn list(
        &self,
        filter: Self::Filter,
        pagination: Pagination,
    ) -> impl Future<Output = UrmResult<PaginatedResult<Self::Entity>>> + Send;
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

pub trait CompanyRepository:
    CrudRepository<
        Entity = Company,
        Create = CreateCompany,
        Update = UpdateCompany,
        Filter = CompanyFilter,
    >
{
    /// Attach a user to a company (idempotent).
    fn add_user(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = UrmResult<()>> + Send;

    fn is_member(
        &self,
        company_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = UrmResult<bool>> + Send;

    /// Companies the user is attached to.
    fn list_for_user(&self, user_id: Uuid) -> impl Future<Output = UrmResult<Vec<Company>>> + Send;

    /// Ids of the users attached to the company.
    fn member_ids(&self, company_id: Uuid) -> impl Future<Output = UrmResult<Vec<Uuid>>> + Send;
}

pub trait UserRepository:
    CrudRepository<Entity = User, Create = CreateUser, Update = UpdateUser, Filter = UserFilter>
{
    fn get_by_email(&self, email: &str) -> impl Future<Output = UrmResult<User>> + Send;

    /// Set or clear the company the user acts in.
    fn set_active_company(
        &self,
        user_id: Uuid,
        company_id: Option<Uuid>,
    ) -> impl Future<Output = UrmResult<User>> + Send;
}

pub trait GroupRepository:
    CrudRepository<Entity = Group, Create = CreateGroup, Update = UpdateGroup, Filter = GroupFilter>
{
}

pub trait CompanyGroupRepository:
    CrudRepository<
        Entity = CompanyGroup,
        Create = CreateCompanyGroup,
        Update = UpdateCompanyGroup,
        Filter = CompanyGroupFilter,
    >
{
    /// Add a user to a company group (idempotent).
    fn add_member(
        &self,
        company_group_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = UrmResult<()>> + Send;

    fn remove_member(
        &self,
        company_group_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = UrmResult<()>> + Send;

    /// Company groups the user belongs to, optionally restricted to one
    /// company.
    fn get_user_groups(
        &self,
        user_id: Uuid,
        company_id: Option<Uuid>,
    ) -> impl Future<Output = UrmResult<Vec<CompanyGroup>>> + Send;
}

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = UrmResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = UrmResult<Session>> + Send;
    /// Remove a single session (its refresh token stops working).
    fn invalidate(&self, id: Uuid) -> impl Future<Output = UrmResult<()>> + Send;
    fn invalidate_user_sessions(&self, user_id: Uuid)
    -> impl Future<Output = UrmResult<()>> + Send;
    /// Delete expired sessions, returning how many were removed.
    fn cleanup_expired(&self) -> impl Future<Output = UrmResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Permission store
// ---------------------------------------------------------------------------

pub trait PermissionRepository:
    CrudRepository<
        Entity = Permission,
        Create = CreatePermission,
        Update = UpdatePermission,
        Filter = PermissionFilter,
    >
{
    fn get_by_codename(&self, codename: &str)
    -> impl Future<Output = UrmResult<Permission>> + Send;
}

pub trait ObjectPermissionRepository:
    CrudRepository<
        Entity = ObjectPermission,
        Create = CreateObjectPermission,
        Update = UpdateObjectPermission,
        Filter = ObjectPermissionFilter,
    >
{
    fn delete(&self, id: Uuid) -> impl Future<Output = UrmResult<()>> + Send;

    /// Grants held by any of `subjects` for the permission `codename` on
    /// targets of `kind`.
    fn find_grants(
        &self,
        subjects: &[GrantSubject],
        codename: &str,
        kind: TargetKind,
    ) -> impl Future<Output = UrmResult<Vec<ObjectPermission>>> + Send;
}

// ---------------------------------------------------------------------------
// Processes
// ---------------------------------------------------------------------------

pub trait ProcessRepository:
    CrudRepository<
        Entity = Process,
        Create = CreateProcess,
        Update = UpdateProcess,
        Filter = ProcessFilter,
    >
{
    /// The non-deleted process called `name` in `company_id`, if any.
    fn find_by_name(
        &self,
        company_id: Uuid,
        name: &str,
    ) -> impl Future<Output = UrmResult<Option<Process>>> + Send;
}

pub trait ActionRepository:
    CrudRepository<Entity = Action, Create = CreateAction, Update = UpdateAction, Filter = ActionFilter>
{
    fn find_by_title(
        &self,
        process_id: Uuid,
        title: &str,
    ) -> impl Future<Output = UrmResult<Vec<Action>>> + Send;
}

// ---------------------------------------------------------------------------
// Org chart
// ---------------------------------------------------------------------------

pub trait EmployeeRepository:
    CrudRepository<
        Entity = Employee,
        Create = CreateEmployee,
        Update = UpdateEmployee,
        Filter = EmployeeFilter,
    >
{
}

pub trait DepartmentRepository:
    CrudRepository<
        Entity = Department,
        Create = CreateDepartment,
        Update = UpdateDepartment,
        Filter = DepartmentFilter,
    >
{
}

pub trait CompanyDepartmentRepository:
    CrudRepository<
        Entity = CompanyDepartment,
        Create = CreateCompanyDepartment,
        Update = UpdateCompanyDepartment,
        Filter = CompanyDepartmentFilter,
    >
{
}

pub trait CompanyDepartmentEmployeeRepository:
    CrudRepository<
        Entity = CompanyDepartmentEmployee,
        Create = CreateCompanyDepartmentEmployee,
        Update = UpdateCompanyDepartmentEmployee,
        Filter = CompanyDepartmentEmployeeFilter,
    >
{
}

pub trait PositionRepository:
    CrudRepository<
        Entity = Position,
        Create = CreatePosition,
        Update = UpdatePosition,
        Filter = PositionFilter,
    >
{
}
