//! SurrealDB implementation of [`GroupRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::UrmResult;
use urm_core::models::group::{CreateGroup, Group, GroupFilter, UpdateGroup};
use urm_core::repository::{CrudRepository, GroupRepository, PaginatedResult, Pagination};
use uuid::Uuid;

use crate::crud;
use crate::error::DbError;

const TABLE: &str = "auth_group";
const SEARCH_FIELDS: &[&str] = &["name"];

#[derive(Debug, SurrealValue)]
struct GroupRow {
    record_id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupRow {
    fn try_into_group(self) -> Result<Group, DbError> {
        Ok(Group {
            id: crud::parse_uuid(&self.record_id, "group")?,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Group repository.
#[derive(Clone)]
pub struct SurrealGroupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGroupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealGroupRepository<C> {
    type Entity = Group;
    type Create = CreateGroup;
    type Update = UpdateGroup;
    type Filter = GroupFilter;

    async fn create(&self, input: CreateGroup) -> UrmResult<Group> {
        let content = crud::non_null_fields(&input)?;
        let row: GroupRow = crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_group()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<Group> {
        let row: GroupRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_group()?)
    }

    async fn update(&self, id: Uuid, input: UpdateGroup) -> UrmResult<Group> {
        let patch = crud::non_null_fields(&input)?;
        let row: GroupRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_group()?)
    }

    async fn list(
        &self,
        filter: GroupFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<Group>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<GroupRow> =
            crud::list_records(&self.db, TABLE, filter, SEARCH_FIELDS, pagination).await?;
        Ok(crud::map_page(page, GroupRow::try_into_group)?)
    }
}

impl<C: Connection> GroupRepository for SurrealGroupRepository<C> {}
