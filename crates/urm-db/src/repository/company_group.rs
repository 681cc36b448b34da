//! SurrealDB implementation of [`CompanyGroupRepository`].
//!
//! Membership is a `member_of` edge from `user` to `company_group`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::{UrmError, UrmResult};
use urm_core::models::company_group::{
    CompanyGroup, CompanyGroupFilter, CreateCompanyGroup, UpdateCompanyGroup,
    default_company_group_name,
};
use urm_core::repository::{
    CompanyGroupRepository, CrudRepository, PaginatedResult, Pagination,
};
use uuid::Uuid;

use crate::crud::{self, CountRow};
use crate::error::DbError;

const TABLE: &str = "company_group";
const COMPANY_TABLE: &str = "company";
const GROUP_TABLE: &str = "auth_group";
const SEARCH_FIELDS: &[&str] = &["name"];

#[derive(Debug, SurrealValue)]
struct CompanyGroupRow {
    record_id: String,
    company_id: String,
    group_id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CompanyGroupRow {
    fn try_into_company_group(self) -> Result<CompanyGroup, DbError> {
        Ok(CompanyGroup {
            id: crud::parse_uuid(&self.record_id, "company group")?,
            company_id: crud::parse_uuid(&self.company_id, "company")?,
            group_id: crud::parse_uuid(&self.group_id, "group")?,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Serialize)]
struct NewCompanyGroupRecord {
    company_id: Uuid,
    group_id: Uuid,
    name: String,
}

#[derive(Debug, SurrealValue)]
struct TitleRow {
    title: String,
}

#[derive(Debug, SurrealValue)]
struct NameRow {
    name: String,
}

/// SurrealDB implementation of the CompanyGroup repository.
#[derive(Clone)]
pub struct SurrealCompanyGroupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCompanyGroupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// `"{company.title}_{group.name}"`, failing if either side is missing.
    async fn default_name(&self, company_id: Uuid, group_id: Uuid) -> Result<String, DbError> {
        let company_id_str = company_id.to_string();
        let group_id_str = group_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT title FROM type::record('company', $company_id); \
                 SELECT name FROM type::record('auth_group', $group_id);",
            )
            .bind(("company_id", company_id_str.clone()))
            .bind(("group_id", group_id_str.clone()))
            .await?;

        let companies: Vec<TitleRow> = result.take(0)?;
        let company = companies
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(COMPANY_TABLE, company_id_str))?;
        let groups: Vec<NameRow> = result.take(1)?;
        let group = groups
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(GROUP_TABLE, group_id_str))?;

        Ok(default_company_group_name(&company.title, &group.name))
    }

    /// Number of members of `company_group_id` that do not work at `company_id`.
    async fn members_outside(
        &self,
        company_group_id: Uuid,
        company_id: Uuid,
    ) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM member_of \
                 WHERE out = type::record('company_group', $group_id) \
                 AND in NOT IN (\
                     SELECT VALUE in FROM works_at \
                     WHERE out = type::record('company', $company_id)\
                 ) GROUP ALL",
            )
            .bind(("group_id", company_group_id.to_string()))
            .bind(("company_id", company_id.to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

impl<C: Connection> CrudRepository for SurrealCompanyGroupRepository<C> {
    type Entity = CompanyGroup;
    type Create = CreateCompanyGroup;
    type Update = UpdateCompanyGroup;
    type Filter = CompanyGroupFilter;

    async fn create(&self, input: CreateCompanyGroup) -> UrmResult<CompanyGroup> {
        let default_name = self.default_name(input.company_id, input.group_id).await?;
        let name = input
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(default_name);
        let record = NewCompanyGroupRecord {
            company_id: input.company_id,
            group_id: input.group_id,
            name,
        };
        let content = crud::non_null_fields(&record)?;
        let row: CompanyGroupRow =
            crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_company_group()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<CompanyGroup> {
        let row: CompanyGroupRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_company_group()?)
    }

    /// Moving a group to another company requires every current member
    /// to work at that company.
    async fn update(&self, id: Uuid, input: UpdateCompanyGroup) -> UrmResult<CompanyGroup> {
        let current = self.get_by_id(id).await?;
        if let Some(group_id) = input.group_id.filter(|g| *g != current.group_id) {
            crud::ensure_exists(&self.db, GROUP_TABLE, group_id).await?;
        }
        if let Some(company_id) = input.company_id.filter(|c| *c != current.company_id) {
            crud::ensure_exists(&self.db, COMPANY_TABLE, company_id).await?;
            if self.members_outside(id, company_id).await? > 0 {
                return Err(UrmError::validation(
                    "company_id",
                    "Every member of the group must belong to the new company.",
                ));
            }
        }

        let patch = crud::non_null_fields(&input)?;
        let row: CompanyGroupRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_company_group()?)
    }

    async fn list(
        &self,
        filter: CompanyGroupFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<CompanyGroup>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<CompanyGroupRow> =
            crud::list_records(&self.db, TABLE, filter, SEARCH_FIELDS, pagination).await?;
        Ok(crud::map_page(page, CompanyGroupRow::try_into_company_group)?)
    }
}

impl<C: Connection> CompanyGroupRepository for SurrealCompanyGroupRepository<C> {
    async fn add_member(&self, company_group_id: Uuid, user_id: Uuid) -> UrmResult<()> {
        let user_id_str = user_id.to_string();
        let group_id_str = company_group_id.to_string();

        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE id = type::record('user', $user_id) GROUP ALL; \
                 SELECT count() AS total FROM company_group \
                 WHERE id = type::record('company_group', $group_id) GROUP ALL; \
                 SELECT count() AS total FROM member_of \
                 WHERE in = type::record('user', $user_id) \
                 AND out = type::record('company_group', $group_id) GROUP ALL;",
            )
            .bind(("user_id", user_id_str.clone()))
            .bind(("group_id", group_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let user_count: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if user_count.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::not_found("user", user_id_str).into());
        }
        let group_count: Vec<CountRow> = check.take(1).map_err(DbError::from)?;
        if group_count.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::not_found(TABLE, group_id_str).into());
        }
        let edge_count: Vec<CountRow> = check.take(2).map_err(DbError::from)?;
        if edge_count.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Ok(());
        }

        let query =
            format!("RELATE user:`{user_id_str}` -> member_of -> company_group:`{group_id_str}`;");
        self.db
            .query(query)
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_check("member_of", e))?;

        Ok(())
    }

    async fn remove_member(&self, company_group_id: Uuid, user_id: Uuid) -> UrmResult<()> {
        self.db
            .query(
                "DELETE member_of WHERE \
                 in = type::record('user', $user_id) AND \
                 out = type::record('company_group', $group_id)",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("group_id", company_group_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn get_user_groups(
        &self,
        user_id: Uuid,
        company_id: Option<Uuid>,
    ) -> UrmResult<Vec<CompanyGroup>> {
        let company_clause = if company_id.is_some() {
            " AND company_id = $company_id"
        } else {
            ""
        };
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM company_group \
             WHERE id IN (\
                 SELECT VALUE out FROM member_of \
                 WHERE in = type::record('user', $user_id)\
             ){company_clause} \
             ORDER BY created_at ASC"
        );

        let mut builder = self.db.query(&query).bind(("user_id", user_id.to_string()));
        if let Some(company_id) = company_id {
            builder = builder.bind(("company_id", company_id.to_string()));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<CompanyGroupRow> = result.take(0).map_err(DbError::from)?;
        let groups = rows
            .into_iter()
            .map(CompanyGroupRow::try_into_company_group)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(groups)
    }
}
