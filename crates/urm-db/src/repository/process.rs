//! SurrealDB implementation of [`ProcessRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::UrmResult;
use urm_core::models::process::{CreateProcess, Process, ProcessFilter, UpdateProcess};
use urm_core::repository::{CrudRepository, PaginatedResult, Pagination, ProcessRepository};
use uuid::Uuid;

use crate::crud;
use crate::error::DbError;

const TABLE: &str = "process";
const SEARCH_FIELDS: &[&str] = &["name"];

#[derive(Debug, SurrealValue)]
struct ProcessRow {
    record_id: String,
    company_id: String,
    created_by: Option<String>,
    name: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProcessRow {
    fn try_into_process(self) -> Result<Process, DbError> {
        Ok(Process {
            id: crud::parse_uuid(&self.record_id, "process")?,
            company_id: crud::parse_uuid(&self.company_id, "company")?,
            created_by: crud::parse_opt_uuid(self.created_by.as_deref(), "creator")?,
            name: self.name,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Process repository.
#[derive(Clone)]
pub struct SurrealProcessRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProcessRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealProcessRepository<C> {
    type Entity = Process;
    type Create = CreateProcess;
    type Update = UpdateProcess;
    type Filter = ProcessFilter;

    async fn create(&self, input: CreateProcess) -> UrmResult<Process> {
        crud::ensure_exists(&self.db, "company", input.company_id).await?;

        let content = crud::non_null_fields(&input)?;
        let row: ProcessRow = crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_process()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<Process> {
        let row: ProcessRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_process()?)
    }

    async fn update(&self, id: Uuid, input: UpdateProcess) -> UrmResult<Process> {
        let patch = crud::non_null_fields(&input)?;
        let row: ProcessRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_process()?)
    }

    async fn list(
        &self,
        filter: ProcessFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<Process>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<ProcessRow> =
            crud::list_records(&self.db, TABLE, filter, SEARCH_FIELDS, pagination).await?;
        Ok(crud::map_page(page, ProcessRow::try_into_process)?)
    }
}

impl<C: Connection> ProcessRepository for SurrealProcessRepository<C> {
    async fn find_by_name(&self, company_id: Uuid, name: &str) -> UrmResult<Option<Process>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM process \
                 WHERE company_id = $company_id AND name = $name \
                 AND is_deleted = false",
            )
            .bind(("company_id", company_id.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProcessRow> = result.take(0).map_err(DbError::from)?;
        let process = rows
            .into_iter()
            .next()
            .map(ProcessRow::try_into_process)
            .transpose()?;
        Ok(process)
    }
}
