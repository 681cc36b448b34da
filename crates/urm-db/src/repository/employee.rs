//! SurrealDB implementation of [`EmployeeRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::UrmResult;
use urm_core::models::employee::{CreateEmployee, Employee, EmployeeFilter, UpdateEmployee};
use urm_core::repository::{CrudRepository, EmployeeRepository, PaginatedResult, Pagination};
use uuid::Uuid;

use crate::crud;
use crate::error::DbError;

const TABLE: &str = "employee";
const SEARCH_FIELDS: &[&str] = &["personnel_code"];

#[derive(Debug, SurrealValue)]
struct EmployeeRow {
    record_id: String,
    company_id: String,
    user_id: String,
    personnel_code: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EmployeeRow {
    fn try_into_employee(self) -> Result<Employee, DbError> {
        Ok(Employee {
            id: crud::parse_uuid(&self.record_id, "employee")?,
            company_id: crud::parse_uuid(&self.company_id, "company")?,
            user_id: crud::parse_uuid(&self.user_id, "user")?,
            personnel_code: self.personnel_code,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Employee repository.
#[derive(Clone)]
pub struct SurrealEmployeeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEmployeeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealEmployeeRepository<C> {
    type Entity = Employee;
    type Create = CreateEmployee;
    type Update = UpdateEmployee;
    type Filter = EmployeeFilter;

    async fn create(&self, input: CreateEmployee) -> UrmResult<Employee> {
        crud::ensure_exists(&self.db, "company", input.company_id).await?;
        crud::ensure_exists(&self.db, "user", input.user_id).await?;

        let content = crud::non_null_fields(&input)?;
        let row: EmployeeRow =
            crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_employee()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<Employee> {
        let row: EmployeeRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_employee()?)
    }

    async fn update(&self, id: Uuid, input: UpdateEmployee) -> UrmResult<Employee> {
        let patch = crud::non_null_fields(&input)?;
        let row: EmployeeRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_employee()?)
    }

    async fn list(
        &self,
        filter: EmployeeFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<Employee>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<EmployeeRow> =
            crud::list_records(&self.db, TABLE, filter, SEARCH_FIELDS, pagination).await?;
        Ok(crud::map_page(page, EmployeeRow::try_into_employee)?)
    }
}

impl<C: Connection> EmployeeRepository for SurrealEmployeeRepository<C> {}
