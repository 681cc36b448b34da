//! SurrealDB implementation of [`CompanyRepository`].
//!
//! Company membership is a `works_at` edge from `user` to `company`.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::UrmResult;
use urm_core::models::company::{Company, CompanyFilter, CreateCompany, UpdateCompany};
use urm_core::repository::{CompanyRepository, CrudRepository, PaginatedResult, Pagination};
use uuid::Uuid;

use crate::crud::{self, CountRow};
use crate::error::DbError;

const TABLE: &str = "company";
const SEARCH_FIELDS: &[&str] = &["title"];

#[derive(Debug, SurrealValue)]
struct CompanyRow {
    record_id: String,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CompanyRow {
    fn try_into_company(self) -> Result<Company, DbError> {
        Ok(Company {
            id: crud::parse_uuid(&self.record_id, "company")?,
            title: self.title,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Company repository.
#[derive(Clone)]
pub struct SurrealCompanyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCompanyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CrudRepository for SurrealCompanyRepository<C> {
    type Entity = Company;
    type Create = CreateCompany;
    type Update = UpdateCompany;
    type Filter = CompanyFilter;

    async fn create(&self, input: CreateCompany) -> UrmResult<Company> {
        let content = crud::non_null_fields(&input)?;
        let row: CompanyRow = crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_company()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<Company> {
        let row: CompanyRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_company()?)
    }

    async fn update(&self, id: Uuid, input: UpdateCompany) -> UrmResult<Company> {
        let patch = crud::non_null_fields(&input)?;
        let row: CompanyRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_company()?)
    }

    async fn list(
        &self,
        filter: CompanyFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<Company>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<CompanyRow> =
            crud::list_records(&self.db, TABLE, filter, SEARCH_FIELDS, pagination).await?;
        Ok(crud::map_page(page, CompanyRow::try_into_company)?)
    }
}

impl<C: Connection> CompanyRepository for SurrealCompanyRepository<C> {
    async fn add_user(&self, company_id: Uuid, user_id: Uuid) -> UrmResult<()> {
        let company_id_str = company_id.to_string();
        let user_id_str = user_id.to_string();

        let mut check = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE id = type::record('user', $user_id) GROUP ALL; \
                 SELECT count() AS total FROM company \
                 WHERE id = type::record('company', $company_id) GROUP ALL;",
            )
            .bind(("user_id", user_id_str.clone()))
            .bind(("company_id", company_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let user_count: Vec<CountRow> = check.take(0).map_err(DbError::from)?;
        if user_count.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::not_found("user", user_id_str).into());
        }
        let company_count: Vec<CountRow> = check.take(1).map_err(DbError::from)?;
        if company_count.first().map(|r| r.total).unwrap_or(0) == 0 {
            return Err(DbError::not_found(TABLE, company_id_str).into());
        }

        if self.is_member(company_id, user_id).await? {
            return Ok(());
        }

        let query =
            format!("RELATE user:`{user_id_str}` -> works_at -> company:`{company_id_str}`;");
        self.db
            .query(query)
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_check("works_at", e))?;

        Ok(())
    }

    async fn is_member(&self, company_id: Uuid, user_id: Uuid) -> UrmResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM works_at \
                 WHERE in = type::record('user', $user_id) \
                 AND out = type::record('company', $company_id) GROUP ALL",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("company_id", company_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> UrmResult<Vec<Company>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM company \
                 WHERE id IN (\
                     SELECT VALUE out FROM works_at \
                     WHERE in = type::record('user', $user_id)\
                 ) \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CompanyRow> = result.take(0).map_err(DbError::from)?;
        let companies = rows
            .into_iter()
            .map(CompanyRow::try_into_company)
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(companies)
    }

    async fn member_ids(&self, company_id: Uuid) -> UrmResult<Vec<Uuid>> {
        let mut result = self
            .db
            .query(
                "SELECT VALUE meta::id(in) FROM works_at \
                 WHERE out = type::record('company', $company_id)",
            )
            .bind(("company_id", company_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;
        let ids = ids
            .iter()
            .map(|id| crud::parse_uuid(id, "user"))
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(ids)
    }
}
