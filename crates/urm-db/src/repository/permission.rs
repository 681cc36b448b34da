//! SurrealDB implementation of [`PermissionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::UrmResult;
use urm_core::models::permission::{
    CreatePermission, Permission, PermissionFilter, TargetKind, UpdatePermission,
};
use urm_core::repository::{CrudRepository, PaginatedResult, Pagination, PermissionRepository};
use uuid::Uuid;

use crate::crud;
use crate::error::DbError;

const TABLE: &str = "permission";
const SEARCH_FIELDS: &[&str] = &["codename", "name"];

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    record_id: String,
    codename: String,
    name: String,
    target_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRow {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        let target_type = TargetKind::parse(&self.target_type)
            .ok_or_else(|| DbError::Corrupt(format!("unknown target type: {}", self.target_type)))?;
        Ok(Permission {
            id: crud::parse_uuid(&self.record_id, "permission")?,
            codename: self.codename,
            name: self.name,
            target_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealPermissionRepository<C> {
    type Entity = Permission;
    type Create = CreatePermission;
    type Update = UpdatePermission;
    type Filter = PermissionFilter;

    async fn create(&self, input: CreatePermission) -> UrmResult<Permission> {
        let content = crud::non_null_fields(&input)?;
        let row: PermissionRow =
            crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_permission()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<Permission> {
        let row: PermissionRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_permission()?)
    }

    async fn update(&self, id: Uuid, input: UpdatePermission) -> UrmResult<Permission> {
        let patch = crud::non_null_fields(&input)?;
        let row: PermissionRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_permission()?)
    }

    async fn list(
        &self,
        filter: PermissionFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<Permission>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<PermissionRow> =
            crud::list_records(&self.db, TABLE, filter, SEARCH_FIELDS, pagination).await?;
        Ok(crud::map_page(page, PermissionRow::try_into_permission)?)
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn get_by_codename(&self, codename: &str) -> UrmResult<Permission> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE codename = $codename",
            )
            .bind(("codename", codename.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(TABLE, format!("codename={codename}")))?;

        Ok(row.try_into_permission()?)
    }
}
