//! SurrealDB implementation of [`ActionRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::UrmResult;
use urm_core::models::action::{Action, ActionFilter, CreateAction, UpdateAction};
use urm_core::repository::{ActionRepository, CrudRepository, PaginatedResult, Pagination};
use uuid::Uuid;

use crate::crud;
use crate::error::DbError;

const TABLE: &str = "action";
const SEARCH_FIELDS: &[&str] = &["title", "route"];

#[derive(Debug, SurrealValue)]
struct ActionRow {
    record_id: String,
    process_id: String,
    title: String,
    route: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ActionRow {
    fn try_into_action(self) -> Result<Action, DbError> {
        Ok(Action {
            id: crud::parse_uuid(&self.record_id, "action")?,
            process_id: crud::parse_uuid(&self.process_id, "process")?,
            title: self.title,
            route: self.route,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Action repository.
#[derive(Clone)]
pub struct SurrealActionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealActionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealActionRepository<C> {
    type Entity = Action;
    type Create = CreateAction;
    type Update = UpdateAction;
    type Filter = ActionFilter;

    async fn create(&self, input: CreateAction) -> UrmResult<Action> {
        // The owning process must exist.
        crud::ensure_exists(&self.db, "process", input.process_id).await?;

        let content = crud::non_null_fields(&input)?;
        let row: ActionRow = crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_action()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<Action> {
        let row: ActionRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_action()?)
    }

    async fn update(&self, id: Uuid, input: UpdateAction) -> UrmResult<Action> {
        let patch = crud::non_null_fields(&input)?;
        let row: ActionRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_action()?)
    }

    async fn list(
        &self,
        filter: ActionFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<Action>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<ActionRow> =
            crud::list_records(&self.db, TABLE, filter, SEARCH_FIELDS, pagination).await?;
        Ok(crud::map_page(page, ActionRow::try_into_action)?)
    }
}

impl<C: Connection> ActionRepository for SurrealActionRepository<C> {
    async fn find_by_title(&self, process_id: Uuid, title: &str) -> UrmResult<Vec<Action>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM action \
                 WHERE process_id = $process_id AND title = $title",
            )
            .bind(("process_id", process_id.to_string()))
            .bind(("title", title.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActionRow> = result.take(0).map_err(DbError::from)?;
        let actions = rows
            .into_iter()
            .map(ActionRow::try_into_action)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(actions)
    }
}
