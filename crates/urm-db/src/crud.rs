//! Generic create / read / update / list helpers shared by every
//! repository.
//!
//! Inputs are serialized to JSON objects and null-valued fields are
//! dropped before they reach the database, so an update only touches
//! the fields the caller actually set. Rows are read back with
//! `meta::id(id) AS record_id` into the caller's `SurrealValue` row type.

use serde::Serialize;
use serde_json::{Map, Value};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use urm_core::repository::{PaginatedResult, Pagination};
use uuid::Uuid;

use crate::error::DbError;

/// Key of the free-text search term inside a serialized filter.
const SEARCH_KEY: &str = "search";

/// Key of an id allow-list inside a serialized filter.
const IDS_KEY: &str = "ids";

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

/// Serialize `input` and keep only its non-null top-level fields.
pub(crate) fn non_null_fields<T: Serialize>(input: &T) -> Result<Map<String, Value>, DbError> {
    match serde_json::to_value(input).map_err(|e| DbError::Query(e.to_string()))? {
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => Err(DbError::Query(format!("expected an object, got {other}"))),
    }
}

pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Corrupt(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_opt_uuid(value: Option<&str>, field: &str) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(v, field)).transpose()
}

/// Build the `WHERE` clause for a serialized filter.
///
/// Every remaining key becomes an equality against `$filter.<key>`,
/// except `ids` which restricts the record ids. The search term, when
/// present, matches case-insensitively against any of `search_fields`.
fn where_clause(filter: &Map<String, Value>, search_fields: &[&str], has_search: bool) -> String {
    let mut conditions: Vec<String> = filter
        .keys()
        .map(|key| match key.as_str() {
            IDS_KEY => format!("meta::id(id) IN $filter.{IDS_KEY}"),
            _ => format!("{key} = $filter.{key}"),
        })
        .collect();

    if has_search && !search_fields.is_empty() {
        let any_field = search_fields
            .iter()
            .map(|field| format!("string::contains(string::lowercase({field} ?? ''), $search)"))
            .collect::<Vec<_>>()
            .join(" OR ");
        conditions.push(format!("({any_field})"));
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Create a record with the given id and return it as a row.
pub(crate) async fn create_record<C, R>(
    db: &Surreal<C>,
    table: &'static str,
    id: Uuid,
    content: Map<String, Value>,
) -> Result<R, DbError>
where
    C: Connection,
    R: SurrealValue,
{
    let id_str = id.to_string();
    let query = format!(
        "CREATE type::record('{table}', $id) CONTENT $content RETURN NONE; \
         SELECT meta::id(id) AS record_id, * FROM type::record('{table}', $id);"
    );

    let result = db
        .query(&query)
        .bind(("id", id_str.clone()))
        .bind(("content", Value::Object(content)))
        .await?;
    let mut result = result.check().map_err(|e| DbError::from_check(table, e))?;

    let rows: Vec<R> = result.take(1)?;
    rows.into_iter()
        .next()
        .ok_or_else(|| DbError::not_found(table, id_str))
}

pub(crate) async fn get_record<C, R>(
    db: &Surreal<C>,
    table: &'static str,
    id: Uuid,
) -> Result<R, DbError>
where
    C: Connection,
    R: SurrealValue,
{
    let id_str = id.to_string();
    let query = format!("SELECT meta::id(id) AS record_id, * FROM type::record('{table}', $id)");

    let mut result = db.query(&query).bind(("id", id_str.clone())).await?;
    let rows: Vec<R> = result.take(0)?;
    rows.into_iter()
        .next()
        .ok_or_else(|| DbError::not_found(table, id_str))
}

/// Merge `patch` into an existing record and bump `updated_at`.
///
/// An empty patch only bumps the timestamp. Missing records fail with
/// [`DbError::NotFound`].
pub(crate) async fn update_record<C, R>(
    db: &Surreal<C>,
    table: &'static str,
    id: Uuid,
    patch: Map<String, Value>,
) -> Result<R, DbError>
where
    C: Connection,
    R: SurrealValue,
{
    let id_str = id.to_string();
    let query = format!(
        "UPDATE type::record('{table}', $id) MERGE $patch RETURN NONE; \
         UPDATE type::record('{table}', $id) SET updated_at = time::now() RETURN NONE; \
         SELECT meta::id(id) AS record_id, * FROM type::record('{table}', $id);"
    );

    let result = db
        .query(&query)
        .bind(("id", id_str.clone()))
        .bind(("patch", Value::Object(patch)))
        .await?;
    let mut result = result.check().map_err(|e| DbError::from_check(table, e))?;

    let rows: Vec<R> = result.take(2)?;
    rows.into_iter()
        .next()
        .ok_or_else(|| DbError::not_found(table, id_str))
}

/// Fail with [`DbError::NotFound`] unless `table:id` exists.
pub(crate) async fn ensure_exists<C: Connection>(
    db: &Surreal<C>,
    table: &'static str,
    id: Uuid,
) -> Result<(), DbError> {
    let query = format!(
        "SELECT count() AS total FROM {table} \
         WHERE id = type::record('{table}', $id) GROUP ALL"
    );
    let mut result = db.query(&query).bind(("id", id.to_string())).await?;
    let rows: Vec<CountRow> = result.take(0)?;
    if rows.first().map(|r| r.total).unwrap_or(0) == 0 {
        return Err(DbError::not_found(table, id));
    }
    Ok(())
}

pub(crate) async fn delete_record<C: Connection>(
    db: &Surreal<C>,
    table: &'static str,
    id: Uuid,
) -> Result<(), DbError> {
    let query = format!("DELETE type::record('{table}', $id)");
    db.query(&query)
        .bind(("id", id.to_string()))
        .await?
        .check()
        .map_err(|e| DbError::from_check(table, e))?;
    Ok(())
}

/// List records matching a serialized filter, oldest first.
pub(crate) async fn list_records<C, R>(
    db: &Surreal<C>,
    table: &'static str,
    mut filter: Map<String, Value>,
    search_fields: &[&str],
    pagination: Pagination,
) -> Result<PaginatedResult<R>, DbError>
where
    C: Connection,
    R: SurrealValue,
{
    let search = filter
        .remove(SEARCH_KEY)
        .and_then(|v| v.as_str().map(str::to_lowercase))
        .filter(|s| !s.is_empty());
    let where_sql = where_clause(&filter, search_fields, search.is_some());

    let query = format!(
        "SELECT count() AS total FROM {table}{where_sql} GROUP ALL; \
         SELECT meta::id(id) AS record_id, * FROM {table}{where_sql} \
         ORDER BY created_at ASC \
         LIMIT $limit START $offset;"
    );

    let result = db
        .query(&query)
        .bind(("filter", Value::Object(filter)))
        .bind(("search", search.unwrap_or_default()))
        .bind(("limit", pagination.limit))
        .bind(("offset", pagination.offset))
        .await?;
    let mut result = result.check().map_err(|e| DbError::from_check(table, e))?;

    let count_rows: Vec<CountRow> = result.take(0)?;
    let total = count_rows.first().map(|r| r.total).unwrap_or(0);
    let items: Vec<R> = result.take(1)?;

    Ok(PaginatedResult {
        items,
        total,
        offset: pagination.offset,
        limit: pagination.limit,
    })
}

/// Map the rows of a page through a fallible conversion.
pub(crate) fn map_page<R, T>(
    page: PaginatedResult<R>,
    convert: impl Fn(R) -> Result<T, DbError>,
) -> Result<PaginatedResult<T>, DbError> {
    let items = page
        .items
        .into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, DbError>>()?;
    Ok(PaginatedResult {
        items,
        total: page.total,
        offset: page.offset,
        limit: page.limit,
    })
}
