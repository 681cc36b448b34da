//! SurrealDB implementation of [`ObjectPermissionRepository`].
//!
//! A grant is stored flat: `subject_type`/`subject_id` for the holder
//! and `target_type`/`target_id` for the object. The five columns
//! together carry a UNIQUE index.

use chrono::{DateTime, Utc};
use serde::Serialize;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use urm_core::error::{UrmError, UrmResult};
use urm_core::models::grant::{
    CreateObjectPermission, GrantSubject, ObjectPermission, ObjectPermissionFilter,
    PermissionTarget, UpdateObjectPermission,
};
use urm_core::models::permission::TargetKind;
use urm_core::repository::{
    CrudRepository, ObjectPermissionRepository, PaginatedResult, Pagination,
};
use uuid::Uuid;

use crate::crud::{self, CountRow};
use crate::error::DbError;

const TABLE: &str = "object_permission";

#[derive(Debug, SurrealValue)]
struct ObjectPermissionRow {
    record_id: String,
    subject_type: String,
    subject_id: String,
    permission_id: String,
    target_type: String,
    target_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ObjectPermissionRow {
    fn try_into_grant(self) -> Result<ObjectPermission, DbError> {
        let subject_id = crud::parse_uuid(&self.subject_id, "subject")?;
        let subject = match self.subject_type.as_str() {
            "user" => GrantSubject::User(subject_id),
            "group" => GrantSubject::Group(subject_id),
            other => return Err(DbError::Corrupt(format!("unknown subject type: {other}"))),
        };
        let kind = TargetKind::parse(&self.target_type)
            .ok_or_else(|| DbError::Corrupt(format!("unknown target type: {}", self.target_type)))?;
        Ok(ObjectPermission {
            id: crud::parse_uuid(&self.record_id, "object permission")?,
            subject,
            permission_id: crud::parse_uuid(&self.permission_id, "permission")?,
            target: PermissionTarget::new(kind, crud::parse_uuid(&self.target_id, "target")?),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Stored columns of a grant.
#[derive(Debug, Serialize)]
struct GrantRecord {
    subject_type: &'static str,
    subject_id: Uuid,
    permission_id: Uuid,
    target_type: TargetKind,
    target_id: Uuid,
}

impl GrantRecord {
    fn new(subject: GrantSubject, permission_id: Uuid, target: PermissionTarget) -> Self {
        Self {
            subject_type: subject.kind_str(),
            subject_id: subject.id(),
            permission_id,
            target_type: target.kind,
            target_id: target.id,
        }
    }
}

/// Table holding the records a subject points at.
fn subject_table(subject: GrantSubject) -> &'static str {
    match subject {
        GrantSubject::User(_) => "user",
        GrantSubject::Group(_) => "company_group",
    }
}

#[derive(Debug, SurrealValue)]
struct TargetTypeRow {
    target_type: String,
}

/// SurrealDB implementation of the ObjectPermission repository.
#[derive(Clone)]
pub struct SurrealObjectPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealObjectPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Reject grants whose permission targets a different kind of object,
    /// and grants that already exist (other than `except`).
    async fn validate(&self, record: &GrantRecord, except: Option<Uuid>) -> UrmResult<()> {
        let permission_id = record.permission_id.to_string();
        let mut result = self
            .db
            .query(
                "SELECT target_type FROM type::record('permission', $permission_id); \
                 SELECT count() AS total FROM object_permission \
                 WHERE subject_type = $record.subject_type \
                 AND subject_id = $record.subject_id \
                 AND permission_id = $record.permission_id \
                 AND target_type = $record.target_type \
                 AND target_id = $record.target_id \
                 AND meta::id(id) != $except GROUP ALL;",
            )
            .bind(("permission_id", permission_id.clone()))
            .bind((
                "record",
                serde_json::to_value(record).map_err(|e| DbError::Query(e.to_string()))?,
            ))
            .bind(("except", except.map(|id| id.to_string()).unwrap_or_default()))
            .await
            .map_err(DbError::from)?;

        let permissions: Vec<TargetTypeRow> = result.take(0).map_err(DbError::from)?;
        let permission = permissions
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("permission", &permission_id))?;
        if permission.target_type != record.target_type.as_str() {
            return Err(UrmError::validation(
                "target_type",
                format!(
                    "permission applies to {} objects, not {}",
                    permission.target_type, record.target_type
                ),
            ));
        }

        let duplicates: Vec<CountRow> = result.take(1).map_err(DbError::from)?;
        if duplicates.first().map(|r| r.total).unwrap_or(0) > 0 {
            return Err(DbError::Duplicate {
                entity: TABLE.into(),
            }
            .into());
        }

        Ok(())
    }
}

impl<C: Connection> CrudRepository for SurrealObjectPermissionRepository<C> {
    type Entity = ObjectPermission;
    type Create = CreateObjectPermission;
    type Update = UpdateObjectPermission;
    type Filter = ObjectPermissionFilter;

    async fn create(&self, input: CreateObjectPermission) -> UrmResult<ObjectPermission> {
        crud::ensure_exists(&self.db, subject_table(input.subject), input.subject.id()).await?;
        let record = GrantRecord::new(input.subject, input.permission_id, input.target);
        self.validate(&record, None).await?;

        let content = crud::non_null_fields(&record)?;
        let row: ObjectPermissionRow =
            crud::create_record(&self.db, TABLE, Uuid::new_v4(), content).await?;
        let grant = row.try_into_grant()?;

        debug!(
            grant_id = %grant.id,
            subject = %record.subject_id,
            target_type = %record.target_type,
            target_id = %record.target_id,
            "Object permission granted"
        );
        Ok(grant)
    }

    async fn get_by_id(&self, id: Uuid) -> UrmResult<ObjectPermission> {
        let row: ObjectPermissionRow = crud::get_record(&self.db, TABLE, id).await?;
        Ok(row.try_into_grant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateObjectPermission) -> UrmResult<ObjectPermission> {
        let current = self.get_by_id(id).await?;
        if let Some(subject) = input.subject.filter(|s| *s != current.subject) {
            crud::ensure_exists(&self.db, subject_table(subject), subject.id()).await?;
        }
        let record = GrantRecord::new(
            input.subject.unwrap_or(current.subject),
            input.permission_id.unwrap_or(current.permission_id),
            input.target.unwrap_or(current.target),
        );
        self.validate(&record, Some(id)).await?;

        let patch = crud::non_null_fields(&record)?;
        let row: ObjectPermissionRow = crud::update_record(&self.db, TABLE, id, patch).await?;
        Ok(row.try_into_grant()?)
    }

    async fn list(
        &self,
        filter: ObjectPermissionFilter,
        pagination: Pagination,
    ) -> UrmResult<PaginatedResult<ObjectPermission>> {
        let filter = crud::non_null_fields(&filter)?;
        let page: PaginatedResult<ObjectPermissionRow> =
            crud::list_records(&self.db, TABLE, filter, &[], pagination).await?;
        Ok(crud::map_page(page, ObjectPermissionRow::try_into_grant)?)
    }
}

impl<C: Connection> ObjectPermissionRepository for SurrealObjectPermissionRepository<C> {
    async fn delete(&self, id: Uuid) -> UrmResult<()> {
        // Surface NotFound instead of silently deleting nothing.
        self.get_by_id(id).await?;
        crud::delete_record(&self.db, TABLE, id).await?;
        Ok(())
    }

    async fn find_grants(
        &self,
        subjects: &[GrantSubject],
        codename: &str,
        kind: TargetKind,
    ) -> UrmResult<Vec<ObjectPermission>> {
        if subjects.is_empty() {
            return Ok(Vec::new());
        }

        let mut user_ids = Vec::new();
        let mut group_ids = Vec::new();
        for subject in subjects {
            match subject {
                GrantSubject::User(id) => user_ids.push(id.to_string()),
                GrantSubject::Group(id) => group_ids.push(id.to_string()),
            }
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM object_permission \
                 WHERE target_type = $target_type \
                 AND permission_id IN (\
                     SELECT VALUE meta::id(id) FROM permission \
                     WHERE codename = $codename\
                 ) \
                 AND (\
                     (subject_type = 'user' AND subject_id IN $user_ids) \
                     OR (subject_type = 'group' AND subject_id IN $group_ids)\
                 ) \
                 ORDER BY created_at ASC",
            )
            .bind(("target_type", kind.as_str().to_string()))
            .bind(("codename", codename.to_string()))
            .bind(("user_ids", user_ids))
            .bind(("group_ids", group_ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ObjectPermissionRow> = result.take(0).map_err(DbError::from)?;
        let grants = rows
            .into_iter()
            .map(ObjectPermissionRow::try_into_grant)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(grants)
    }
}
