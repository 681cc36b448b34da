//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Companies
-- =======================================================================
DEFINE TABLE company SCHEMAFULL;
DEFINE FIELD title ON TABLE company TYPE string;
DEFINE FIELD created_at ON TABLE company TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE company TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE option<string>;
DEFINE FIELD last_name ON TABLE user TYPE option<string>;
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD is_admin ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD is_staff ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD user_type ON TABLE user TYPE string DEFAULT 'Customer' \
    ASSERT $value IN ['Staff', 'Customer', 'Supervisor'];
DEFINE FIELD active_company_id ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Groups and company groups
-- =======================================================================
DEFINE TABLE auth_group SCHEMAFULL;
DEFINE FIELD name ON TABLE auth_group TYPE string;
DEFINE FIELD created_at ON TABLE auth_group TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE auth_group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_auth_group_name ON TABLE auth_group COLUMNS name UNIQUE;

DEFINE TABLE company_group SCHEMAFULL;
DEFINE FIELD company_id ON TABLE company_group TYPE string;
DEFINE FIELD group_id ON TABLE company_group TYPE string;
DEFINE FIELD name ON TABLE company_group TYPE string;
DEFINE FIELD created_at ON TABLE company_group TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE company_group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_company_group_pair ON TABLE company_group \
    COLUMNS company_id, group_id UNIQUE;
DEFINE INDEX idx_company_group_company ON TABLE company_group \
    COLUMNS company_id;

-- =======================================================================
-- Permissions and object-permission grants
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD codename ON TABLE permission TYPE string;
DEFINE FIELD name ON TABLE permission TYPE string;
DEFINE FIELD target_type ON TABLE permission TYPE string \
    ASSERT $value IN ['action', 'process', 'company', 'employee', \
    'department'];
DEFINE FIELD created_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_codename ON TABLE permission \
    COLUMNS codename UNIQUE;

DEFINE TABLE object_permission SCHEMAFULL;
DEFINE FIELD subject_type ON TABLE object_permission TYPE string \
    ASSERT $value IN ['user', 'group'];
DEFINE FIELD subject_id ON TABLE object_permission TYPE string;
DEFINE FIELD permission_id ON TABLE object_permission TYPE string;
DEFINE FIELD target_type ON TABLE object_permission TYPE string \
    ASSERT $value IN ['action', 'process', 'company', 'employee', \
    'department'];
DEFINE FIELD target_id ON TABLE object_permission TYPE string;
DEFINE FIELD created_at ON TABLE object_permission TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE object_permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_object_permission_unique ON TABLE object_permission \
    COLUMNS subject_type, subject_id, permission_id, target_type, \
    target_id UNIQUE;
DEFINE INDEX idx_object_permission_subject ON TABLE object_permission \
    COLUMNS subject_type, subject_id;

-- =======================================================================
-- Processes and actions (company scope)
-- =======================================================================
DEFINE TABLE process SCHEMAFULL;
DEFINE FIELD company_id ON TABLE process TYPE string;
DEFINE FIELD created_by ON TABLE process TYPE option<string>;
DEFINE FIELD name ON TABLE process TYPE string;
DEFINE FIELD is_deleted ON TABLE process TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE process TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE process TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_process_company_name ON TABLE process \
    COLUMNS company_id, name UNIQUE;

DEFINE TABLE action SCHEMAFULL;
DEFINE FIELD process_id ON TABLE action TYPE string;
DEFINE FIELD title ON TABLE action TYPE string;
DEFINE FIELD route ON TABLE action TYPE option<string>;
DEFINE FIELD created_at ON TABLE action TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE action TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_action_process_title ON TABLE action \
    COLUMNS process_id, title UNIQUE;

-- =======================================================================
-- Org chart (company scope, departments global)
-- =======================================================================
DEFINE TABLE employee SCHEMAFULL;
DEFINE FIELD company_id ON TABLE employee TYPE string;
DEFINE FIELD user_id ON TABLE employee TYPE string;
DEFINE FIELD personnel_code ON TABLE employee TYPE string;
DEFINE FIELD created_at ON TABLE employee TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE employee TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_employee_company_user ON TABLE employee \
    COLUMNS company_id, user_id UNIQUE;
DEFINE INDEX idx_employee_company_code ON TABLE employee \
    COLUMNS company_id, personnel_code UNIQUE;

DEFINE TABLE department SCHEMAFULL;
DEFINE FIELD title ON TABLE department TYPE string;
DEFINE FIELD abbreviation ON TABLE department TYPE option<string>;
DEFINE FIELD created_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE department TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_department_title ON TABLE department \
    COLUMNS title UNIQUE;

DEFINE TABLE company_department SCHEMAFULL;
DEFINE FIELD company_id ON TABLE company_department TYPE string;
DEFINE FIELD department_id ON TABLE company_department TYPE string;
DEFINE FIELD parent_id ON TABLE company_department TYPE option<string>;
DEFINE FIELD manager_id ON TABLE company_department TYPE option<string>;
DEFINE FIELD created_at ON TABLE company_department TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE company_department TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_company_department_pair ON TABLE company_department \
    COLUMNS company_id, department_id UNIQUE;

DEFINE TABLE company_department_employee SCHEMAFULL;
DEFINE FIELD company_id ON TABLE company_department_employee \
    TYPE string;
DEFINE FIELD company_department_id ON TABLE company_department_employee \
    TYPE string;
DEFINE FIELD employee_id ON TABLE company_department_employee \
    TYPE string;
DEFINE FIELD supervisor_id ON TABLE company_department_employee \
    TYPE option<string>;
DEFINE FIELD created_at ON TABLE company_department_employee \
    TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE company_department_employee \
    TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_cde_pair ON TABLE company_department_employee \
    COLUMNS company_department_id, employee_id UNIQUE;

DEFINE TABLE company_position SCHEMAFULL;
DEFINE FIELD company_id ON TABLE company_position TYPE string;
DEFINE FIELD title ON TABLE company_position TYPE string;
DEFINE FIELD abbreviation ON TABLE company_position TYPE option<string>;
DEFINE FIELD created_at ON TABLE company_position TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE company_position TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_position_company_title ON TABLE company_position \
    COLUMNS company_id, title UNIQUE;

-- =======================================================================
-- Sessions
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD ip_address ON TABLE session TYPE option<string>;
DEFINE FIELD user_agent ON TABLE session TYPE option<string>;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_token ON TABLE session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_session_user ON TABLE session COLUMNS user_id;

-- =======================================================================
-- Graph Edge Tables (relations)
-- =======================================================================

-- User -> Company membership
DEFINE TABLE works_at TYPE RELATION SCHEMAFULL;
DEFINE INDEX idx_works_at_pair ON TABLE works_at COLUMNS in, out UNIQUE;

-- User -> Company group membership
DEFINE TABLE member_of TYPE RELATION SCHEMAFULL;
DEFINE INDEX idx_member_of_pair ON TABLE member_of COLUMNS in, out UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn every_table_is_schemafull() {
        for line in SCHEMA_V1.lines().filter(|l| l.starts_with("DEFINE TABLE")) {
            assert!(line.contains("SCHEMAFULL"), "{line}");
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
