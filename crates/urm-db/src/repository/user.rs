//! SurrealDB implementation of [`UserRepository`].
//!
//! Password hashing uses Argon2id with OWASP-recommended parameters
//! (memory: 19 MiB, iterations: 2, parallelism: 1). Salt is randomly
//! generated per hash. An optional pepper (server-side secret) can be
//! provided at construction time.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use serde::Serialize;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::error::UrmResult;
use urm_core::models::user::{CreateUser, UpdateUser, User, UserFilter, UserType};
use urm_core::repository::{CrudRepository, PaginatedResult, Pagination, UserRepository};
use uuid::Uuid;

use crate::crud;
use crate::error::DbError;

const TABLE: &str = "user";
const SEARCH_FIELDS: &[&str] = &["email", "first_name", "last_name"];

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    is_active: bool,
    is_admin: bool,
    is_staff: bool,
    user_type: String,
    active_company_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let user_type = UserType::parse(&self.user_type)
            .ok_or_else(|| DbError::Corrupt(format!("unknown user type: {}", self.user_type)))?;
        Ok(User {
            id: crud::parse_uuid(&self.record_id, "user")?,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: self.is_active,
            is_admin: self.is_admin,
            is_staff: self.is_staff,
            user_type,
            active_company_id: crud::parse_opt_uuid(
                self.active_company_id.as_deref(),
                "active company",
            )?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Stored shape of a new user: the raw password never reaches the
/// database.
#[derive(Serialize)]
struct NewUserRecord {
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    is_staff: bool,
    is_admin: bool,
    user_type: UserType,
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// If a pepper is provided, it is prepended to the password before
/// hashing. The salt is randomly generated for each call.
fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Query(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let peppered: String;
    let input = match pepper {
        Some(p) => {
            peppered = format!("{p}{password}");
            peppered.as_bytes()
        }
        None => password.as_bytes(),
    };

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| DbError::Query(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }
}

impl<C: Connection> CrudRepository for SurrealUserRepository<C> {
    type Entity = User;
    type Create = CreateUser;
    type Update = UpdateUser;
    type Filter = UserFilter;

    /// Creates the user in a single `CREATE` statement; a duplicate email
    /// is rejected by the unique index and nothing is written.
    async fn create(&self, input: CreateUser) -> UrmResult<User> {
        let record = NewUserRecord {
            password_hash: hash_password(&input.password, self.pepper.as_deref())?,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            is_staff: input.is_staff,
            is_admin: input.is_admin,
            user_type: input.user_type.unwrap_or_default(),
        };
        let content = crud::non_null_fields(&record)?;
        let row: UserRow = crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        Ok(row.try_into_user()?)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<User> {
        let row: UserRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> UrmResult<User> {
        let patch = crud::non_null_fields(&input)?;
        let row: UserRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_user()?)
    }

    async fn list(
        &self,
        filter: UserFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<User>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<UserRow> =
            crud::list_records(&self.db, TABLE, filter, SEARCH_FIELDS, pagination).await?;
        Ok(crud::map_page(page, UserRow::try_into_user)?)
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn get_by_email(&self, email: &str) -> UrmResult<User> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(TABLE, format!("email={email}")))?;

        Ok(row.try_into_user()?)
    }

    async fn set_active_company(&self, user_id: Uuid, company_id: Option<Uuid>) -> UrmResult<User> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 active_company_id = $company_id, updated_at = time::now() \
                 RETURN NONE; \
                 SELECT meta::id(id) AS record_id, * FROM type::record('user', $id);",
            )
            .bind(("id", user_id.to_string()))
            .bind(("company_id", company_id.map(|id| id.to_string())))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_check(TABLE, e))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found(TABLE, user_id))?;

        Ok(row.try_into_user()?)
    }
}
