//! Database-specific error types and conversions.

use urm_core::error::UrmError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    Duplicate { entity: String },

    /// A stored row could not be mapped back into a domain model.
    #[error("Invalid stored data: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Classify an error returned by `Response::check`.
    ///
    /// Unique index violations surface as "Database index `..` already
    /// contains ..." and become [`DbError::Duplicate`].
    pub(crate) fn from_check(entity: &str, err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Duplicate {
                entity: entity.to_string(),
            }
        } else {
            DbError::Query(message)
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for UrmError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => UrmError::NotFound { entity, id },
            DbError::Duplicate { entity } => UrmError::AlreadyExists { entity },
            other => UrmError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_maps_to_already_exists() {
        let err: UrmError = DbError::Duplicate {
            entity: "permission".into(),
        }
        .into();
        assert!(matches!(err, UrmError::AlreadyExists { entity } if entity == "permission"));
    }

    #[test]
    fn not_found_keeps_entity_and_id() {
        let err: UrmError = DbError::not_found("company", "abc").into();
        assert!(
            matches!(err, UrmError::NotFound { entity, id } if entity == "company" && id == "abc")
        );
    }
}
