use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{FromRow, MySql, MySqlPool};

use crate::error::{AppError, AppResult};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    U8(u8),
    U64(u64),
    String(String),
    DateTime(DateTime<Utc>),
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Column names come from code, never from request payloads.
pub fn build_update_sql(
    table: &str,
    fields: Vec<(&'static str, SqlValue)>,
    id_column: &str,
    id_value: u64,
) -> AppResult<SqlUpdate> {
    if fields.is_empty() {
        return Err(AppError::InvalidInput("No fields provided for update".into()));
    }

    let set_clause = fields
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = fields.into_iter().map(|(_, v)| v).collect();
    values.push(SqlValue::U64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::U8(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::String(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

/// ===============================
/// Bind filter values, in order
/// ===============================
pub fn bind_query_as<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: &[SqlValue],
) -> QueryAs<'q, MySql, O, MySqlArguments>
where
    O: for<'r> FromRow<'r, MySqlRow>,
{
    for value in values {
        query = match value.clone() {
            SqlValue::U8(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::String(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
        };
    }
    query
}

pub fn bind_scalar<'q>(
    mut query: QueryScalar<'q, MySql, i64, MySqlArguments>,
    values: &[SqlValue],
) -> QueryScalar<'q, MySql, i64, MySqlArguments> {
    for value in values {
        query = match value.clone() {
            SqlValue::U8(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::String(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
        };
    }
    query
}
