//! SurrealDB implementation of [`PositionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::UrmResult;
use urm_core::models::position::{CreatePosition, Position, PositionFilter, UpdatePosition};
use urm_core::repository::{CrudRepository, PaginatedResult, Pagination, PositionRepository};
use uuid::Uuid;

use crate::crud;
use crate::error::DbError;

const TABLE: &str = "company_position";
const SEARCH_FIELDS: &[&str] = &["title", "abbreviation"];

#[derive(Debug, SurrealValue)]
struct PositionRow {
    record_id: String,
    company_id: String,
    title: String,
    abbreviation: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PositionRow {
    fn try_into_position(self) -> Result<Position, DbError> {
        Ok(Position {
            id: crud::parse_uuid(&self.record_id, "position")?,
            company_id: crud::parse_uuid(&self.company_id, "company")?,
            title: self.title,
            abbreviation: self.abbreviation,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Position repository.
#[derive(Clone)]
pub struct SurrealPositionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPositionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealPositionRepository<C> {
    type Entity = Position;
    type Create = CreatePosition;
    type Update = UpdatePosition;
    type Filter = PositionFilter;

    async fn create(&self, input: CreatePosition) -> UrmResult<Position> {
        crud::ensure_exists(&self.db, "company", input.company_id).await?;

        let content = crud::non_null_fields(&input)?;
        let row: PositionRow =
            crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_position()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<Position> {
        let row: PositionRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_position()?)
    }

    async fn update(&self, id: Uuid, input: UpdatePosition) -> UrmResult<Position> {
        let patch = crud::non_null_fields(&input)?;
        let row: PositionRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_position()?)
    }

    async fn list(
        &self,
        filter: PositionFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<Position>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<PositionRow> =
            crud::list_records(&self.db, TABLE, filter, SEARCH_FIELDS, pagination).await?;
        Ok(crud::map_page(page, PositionRow::try_into_position)?)
    }
}

impl<C: Connection> PositionRepository for SurrealPositionRepository<C> {}
