//! SurrealDB implementations of the org-chart repositories:
//! [`DepartmentRepository`], [`CompanyDepartmentRepository`] and
//! [`CompanyDepartmentEmployeeRepository`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::{UrmError, UrmResult};
use urm_core::models::department::{
    CompanyDepartment, CompanyDepartmentEmployee, CompanyDepartmentEmployeeFilter,
    CompanyDepartmentFilter, CreateCompanyDepartment, CreateCompanyDepartmentEmployee,
    CreateDepartment, Department, DepartmentFilter, UpdateCompanyDepartment,
    UpdateCompanyDepartmentEmployee, UpdateDepartment,
};
use urm_core::repository::{
    CompanyDepartmentEmployeeRepository, CompanyDepartmentRepository, CrudRepository,
    DepartmentRepository, PaginatedResult, Pagination,
};
use uuid::Uuid;

use crate::crud;
use crate::error::DbError;

const DEPARTMENT_TABLE: &str = "department";
const COMPANY_DEPARTMENT_TABLE: &str = "company_department";
const MEMBER_TABLE: &str = "company_department_employee";

// ---------------------------------------------------------------------------
// Department (global catalogue)
// ---------------------------------------------------------------------------

#[derive(Debug, SurrealValue)]
struct DepartmentRow {
    record_id: String,
    title: String,
    abbreviation: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DepartmentRow {
    fn try_into_department(self) -> Result<Department, DbError> {
        Ok(Department {
            id: crud::parse_uuid(&self.record_id, "department")?,
            title: self.title,
            abbreviation: self.abbreviation,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealDepartmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDepartmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealDepartmentRepository<C> {
    type Entity = Department;
    type Create = CreateDepartment;
    type Update = UpdateDepartment;
    type Filter = DepartmentFilter;

    async fn create(&self, input: CreateDepartment) -> UrmResult<Department> {
        let content = crud::non_null_fields(&input)?;
        let row: DepartmentRow =
            crud::create_record(&self.db, DEPARTMENT_TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_department()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<Department> {
        let row: DepartmentRow = crud::get_record(&self.db, DEPARTMENT_TABLE, id).await?;
        Ok(row.try_into_department()?)
    }

    async fn update(&self, id: Uuid, input: UpdateDepartment) -> UrmResult<Department> {
        let patch = crud::non_null_fields(&input)?;
        let row: DepartmentRow =
            crud::update_record(&self.db, DEPARTMENT_TABLE, id, patch).await?;
        Ok(row.try_into_department()?)
    }

    async fn list(
        &self,
        filter: DepartmentFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<Department>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<DepartmentRow> = crud::list_records(
            &self.db,
            DEPARTMENT_TABLE,
            filter,
            &["title", "abbreviation"],
            pagination,
        )
        .await?;
        Ok(crud::map_page(page, DepartmentRow::try_into_department)?)
    }
}

impl<C: Connection> DepartmentRepository for SurrealDepartmentRepository<C> {}

// ---------------------------------------------------------------------------
// Company department (tree node inside one company)
// ---------------------------------------------------------------------------

#[derive(Debug, SurrealValue)]
struct CompanyDepartmentRow {
    record_id: String,
    company_id: String,
    department_id: String,
    parent_id: Option<String>,
    manager_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CompanyDepartmentRow {
    fn try_into_company_department(self) -> Result<CompanyDepartment, DbError> {
        Ok(CompanyDepartment {
            id: crud::parse_uuid(&self.record_id, "company department")?,
            company_id: crud::parse_uuid(&self.company_id, "company")?,
            department_id: crud::parse_uuid(&self.department_id, "department")?,
            parent_id: crud::parse_opt_uuid(self.parent_id.as_deref(), "parent")?,
            manager_id: crud::parse_opt_uuid(self.manager_id.as_deref(), "manager")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealCompanyDepartmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCompanyDepartmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// A parent must be a department of the same company.
    async fn check_parent(&self, company_id: Uuid, parent_id: Uuid) -> UrmResult<()> {
        let parent = self.get_by_id(parent_id).await?;
        if parent.company_id != company_id {
            return Err(UrmError::validation(
                "parent_id",
                "Parent department belongs to a different company.",
            ));
        }
        Ok(())
    }
}

impl<C: Connection> CrudRepository for SurrealCompanyDepartmentRepository<C> {
    type Entity = CompanyDepartment;
    type Create = CreateCompanyDepartment;
    type Update = UpdateCompanyDepartment;
    type Filter = CompanyDepartmentFilter;

    async fn create(&self, input: CreateCompanyDepartment) -> UrmResult<CompanyDepartment> {
        crud::ensure_exists(&self.db, "company", input.company_id).await?;
        crud::ensure_exists(&self.db, DEPARTMENT_TABLE, input.department_id).await?;
        if let Some(parent_id) = input.parent_id {
            self.check_parent(input.company_id, parent_id).await?;
        }
        if let Some(manager_id) = input.manager_id {
            crud::ensure_exists(&self.db, "employee", manager_id).await?;
        }

        let content = crud::non_null_fields(&input)?;
        let row: CompanyDepartmentRow =
            crud::create_record(&self.db, COMPANY_DEPARTMENT_TABLE, Uuid::new_v4(), content)
                .await?;
        Ok(row.try_into_company_department()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<CompanyDepartment> {
        let row: CompanyDepartmentRow =
            crud::get_record(&self.db, COMPANY_DEPARTMENT_TABLE, id).await?;
        Ok(row.try_into_company_department()?)
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateCompanyDepartment,
    ) -> UrmResult<CompanyDepartment> {
        if let Some(parent_id) = input.parent_id {
            if parent_id == id {
                return Err(UrmError::validation(
                    "parent_id",
                    "A department cannot be its own parent.",
                ));
            }
            let current = self.get_by_id(id).await?;
            self.check_parent(current.company_id, parent_id).await?;
        }

        let patch = crud::non_null_fields(&input)?;
        let row: CompanyDepartmentRow =
            crud::update_record(&self.db, COMPANY_DEPARTMENT_TABLE, id, patch).await?;
        Ok(row.try_into_company_department()?)
    }

    async fn list(
        &self,
        filter: CompanyDepartmentFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<CompanyDepartment>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<CompanyDepartmentRow> =
            crud::list_records(&self.db, COMPANY_DEPARTMENT_TABLE, filter, &[], pagination)
                .await?;
        Ok(crud::map_page(
            page,
            CompanyDepartmentRow::try_into_company_department,
        )?)
    }
}

impl<C: Connection> CompanyDepartmentRepository for SurrealCompanyDepartmentRepository<C> {}

// ---------------------------------------------------------------------------
// Company department employee (staffing)
// ---------------------------------------------------------------------------

#[derive(Debug, SurrealValue)]
struct MemberRow {
    record_id: String,
    company_id: String,
    company_department_id: String,
    employee_id: String,
    supervisor_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRow {
    fn try_into_member(self) -> Result<CompanyDepartmentEmployee, DbError> {
        Ok(CompanyDepartmentEmployee {
            id: crud::parse_uuid(&self.record_id, "company department employee")?,
            company_id: crud::parse_uuid(&self.company_id, "company")?,
            company_department_id: crud::parse_uuid(
                &self.company_department_id,
                "company department",
            )?,
            employee_id: crud::parse_uuid(&self.employee_id, "employee")?,
            supervisor_id: crud::parse_opt_uuid(self.supervisor_id.as_deref(), "supervisor")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Serialize)]
struct NewMemberRecord {
    company_id: Uuid,
    company_department_id: Uuid,
    employee_id: Uuid,
    supervisor_id: Option<Uuid>,
}

#[derive(Debug, SurrealValue)]
struct CompanyIdRow {
    company_id: String,
}

#[derive(Clone)]
pub struct SurrealCompanyDepartmentEmployeeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCompanyDepartmentEmployeeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn company_of(&self, company_department_id: Uuid) -> Result<Uuid, DbError> {
        let id_str = company_department_id.to_string();
        let mut result = self
            .db
            .query("SELECT company_id FROM type::record('company_department', $id)")
            .bind(("id", id_str.clone()))
            .await?;
        let rows: Vec<CompanyIdRow> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(COMPANY_DEPARTMENT_TABLE, id_str))?;
        crud::parse_uuid(&row.company_id, "company")
    }
}

impl<C: Connection> CrudRepository for SurrealCompanyDepartmentEmployeeRepository<C> {
    type Entity = CompanyDepartmentEmployee;
    type Create = CreateCompanyDepartmentEmployee;
    type Update = UpdateCompanyDepartmentEmployee;
    type Filter = CompanyDepartmentEmployeeFilter;

    async fn create(
        &self,
        input: CreateCompanyDepartmentEmployee,
    ) -> UrmResult<CompanyDepartmentEmployee> {
        let company_id = self.company_of(input.company_department_id).await?;
        crud::ensure_exists(&self.db, "employee", input.employee_id).await?;
        if let Some(supervisor_id) = input.supervisor_id {
            crud::ensure_exists(&self.db, "employee", supervisor_id).await?;
        }

        let record = NewMemberRecord {
            company_id,
            company_department_id: input.company_department_id,
            employee_id: input.employee_id,
            supervisor_id: input.supervisor_id,
        };
        let content = crud::non_null_fields(&record)?;
        let row: MemberRow =
            crud::create_record(&self.db, MEMBER_TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_member()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<CompanyDepartmentEmployee> {
        let row: MemberRow = crud::get_record(&self.db, MEMBER_TABLE, id).await?;
        Ok(row.try_into_member()?)
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateCompanyDepartmentEmployee,
    ) -> UrmResult<CompanyDepartmentEmployee> {
        if let Some(supervisor_id) = input.supervisor_id {
            crud::ensure_exists(&self.db, "employee", supervisor_id).await?;
        }
        let patch = crud::non_null_fields(&input)?;
        let row: MemberRow = crud::update_record(&self.db, MEMBER_TABLE, id, patch).await?;
        Ok(row.try_into_member()?)
    }

    async fn list(
        &self,
        filter: CompanyDepartmentEmployeeFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<CompanyDepartmentEmployee>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<MemberRow> =
            crud::list_records(&self.db, MEMBER_TABLE, filter, &[], pagination).await?;
        Ok(crud::map_page(page, MemberRow::try_into_member)?)
    }
}

impl<C: Connection> CompanyDepartmentEmployeeRepository
    for SurrealCompanyDepartmentEmployeeRepository<C>
{
}
