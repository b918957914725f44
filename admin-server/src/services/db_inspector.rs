//! Database inspector and raw SQL console
//!
//! Statements pass a keyword blocklist and a single-statement check before
//! they reach SQLite. Row results are capped at [`MAX_ROWS`].

use base64::Engine;
use futures::TryStreamExt;
use serde_json::{Map, Value};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{SqlResult, TableColumn};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, Row, SqlitePool, TypeInfo, ValueRef};

/// Row cap for console queries
pub const MAX_ROWS: usize = 1000;

/// Keywords rejected anywhere in a console statement
pub const FORBIDDEN_KEYWORDS: &[&str] = &[
    "DROP", "TRUNCATE", "ALTER", "GRANT", "REVOKE", "ATTACH", "DETACH", "PRAGMA", "VACUUM",
    "REINDEX",
];

const HIDDEN_TABLES: &str = "name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations'";

/// User tables, by name
pub async fn list_tables(pool: &SqlitePool) -> AppResult<Vec<String>> {
    let tables = sqlx::query_scalar(&format!(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND {HIDDEN_TABLES} ORDER BY name"
    ))
    .fetch_all(pool)
    .await
    .map_err(crate::db::repository::RepoError::from)?;
    Ok(tables)
}

async fn table_exists(pool: &SqlitePool, table: &str) -> AppResult<bool> {
    let found: Option<String> = sqlx::query_scalar(&format!(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND {HIDDEN_TABLES} AND name = ?"
    ))
    .bind(table)
    .fetch_optional(pool)
    .await
    .map_err(crate::db::repository::RepoError::from)?;
    Ok(found.is_some())
}

/// Column metadata of a user table
pub async fn table_columns(pool: &SqlitePool, table: &str) -> AppResult<Vec<TableColumn>> {
    if !table_exists(pool, table).await? {
        return Err(AppError::new(ErrorCode::TableNotFound));
    }
    let rows: Vec<(String, String, i64, Option<String>, i64)> = sqlx::query_as(
        "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid",
    )
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(crate::db::repository::RepoError::from)?;

    Ok(rows
        .into_iter()
        .map(|(name, data_type, not_null, default_value, pk)| TableColumn {
            name,
            data_type: data_type.to_uppercase(),
            not_null: not_null != 0,
            default_value,
            primary_key: pk > 0,
        })
        .collect())
}

/// SQL text with comments and quoted content blanked out
///
/// Keeps statement structure (keywords, `;`) so checks cannot be fooled by a
/// keyword inside a string literal. Fails on an unterminated literal.
fn strip_literals(sql: &str) -> Result<String, AppError> {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' | '[' => {
                let close = if c == '[' { ']' } else { c };
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    if inner == close {
                        // Doubled quote is an escaped quote
                        if close != ']' && chars.peek() == Some(&close) {
                            chars.next();
                            continue;
                        }
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(AppError::with_message(
                        ErrorCode::SqlInvalid,
                        "unterminated quoted text",
                    ));
                }
                out.push_str(" ? ");
            }
            '-' if chars.peek() == Some(&'-') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
                out.push(' ');
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn words(stripped: &str) -> impl Iterator<Item = String> + '_ {
    stripped
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_uppercase)
}

/// Statement accepted by the console guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedSql {
    /// Statement text without the trailing `;`
    pub sql: String,
    /// Whether the statement yields rows
    pub returns_rows: bool,
}

/// Validate a console statement
///
/// Rejects empty input, more than one statement and any forbidden keyword
/// (case-insensitive, whole words only).
pub fn check_sql(sql: &str) -> AppResult<CheckedSql> {
    let trimmed = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if trimmed.is_empty() {
        return Err(AppError::with_message(ErrorCode::SqlInvalid, "sql is empty"));
    }

    let stripped = strip_literals(trimmed)?;
    if stripped.contains(';') {
        return Err(AppError::with_message(
            ErrorCode::SqlInvalid,
            "only one statement per call is allowed",
        ));
    }

    let tokens: Vec<String> = words(&stripped).collect();
    if let Some(word) = tokens
        .iter()
        .find(|w| FORBIDDEN_KEYWORDS.contains(&w.as_str()))
    {
        return Err(AppError::with_message(
            ErrorCode::SqlForbidden,
            format!("sql contains forbidden keyword: {word}"),
        ));
    }

    let first = tokens.first().map(String::as_str).unwrap_or_default();
    let returns_rows = matches!(first, "SELECT" | "WITH" | "EXPLAIN" | "VALUES")
        || tokens.iter().any(|w| w == "RETURNING");

    Ok(CheckedSql {
        sql: trimmed.to_string(),
        returns_rows,
    })
}

fn column_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();
    let value = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" | "NUMERIC" => Value::from(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Value::from(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        _ => Value::from(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

fn sql_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db_err) => {
            AppError::with_message(ErrorCode::SqlInvalid, db_err.message().to_string())
        }
        other => crate::db::repository::RepoError::from(other).into(),
    }
}

/// Run one guarded statement
pub async fn execute(pool: &SqlitePool, sql: &str) -> AppResult<SqlResult> {
    let checked = check_sql(sql)?;

    if !checked.returns_rows {
        let done = sqlx::query(&checked.sql)
            .execute(pool)
            .await
            .map_err(sql_error)?;
        return Ok(SqlResult {
            rows_affected: Some(done.rows_affected()),
            ..Default::default()
        });
    }

    let mut result = SqlResult::default();
    let mut stream = sqlx::query(&checked.sql).fetch(pool);
    while let Some(row) = stream.try_next().await.map_err(sql_error)? {
        if result.rows.len() == MAX_ROWS {
            result.truncated = true;
            break;
        }
        if result.columns.is_empty() {
            result.columns = row.columns().iter().map(|c| c.name().to_string()).collect();
        }
        let mut object = Map::with_capacity(result.columns.len());
        for (index, name) in result.columns.iter().enumerate() {
            object.insert(name.clone(), column_value(&row, index).map_err(sql_error)?);
        }
        result.rows.push(object);
    }
    drop(stream);

    if result.columns.is_empty() {
        let described = pool.describe(&checked.sql).await.map_err(sql_error)?;
        result.columns = described
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[test]
    fn test_blocklist_is_word_bounded_and_case_insensitive() {
        assert_eq!(
            check_sql("drop table sys_user").unwrap_err().code,
            ErrorCode::SqlForbidden
        );
        assert_eq!(
            check_sql("SELECT 1; Pragma foreign_keys").unwrap_err().code,
            ErrorCode::SqlInvalid
        );
        assert!(check_sql("SELECT dropped_at, altered FROM t").is_ok());
        assert!(check_sql("SELECT 'DROP TABLE x' AS note").is_ok());
        assert!(check_sql("SELECT 1 -- drop\n").is_ok());
        assert_eq!(
            check_sql("/* hi */ ALTER TABLE t ADD c").unwrap_err().code,
            ErrorCode::SqlForbidden
        );
    }

    #[test]
    fn test_single_statement_and_empty() {
        assert!(check_sql("  ;  ").is_err());
        assert!(check_sql("SELECT 1;").is_ok());
        assert!(check_sql("SELECT ';'").is_ok());
        assert!(check_sql("SELECT 1; SELECT 2").is_err());
        assert!(check_sql("SELECT 'open").is_err());
    }

    #[test]
    fn test_row_returning_detection() {
        assert!(check_sql("select 1").unwrap().returns_rows);
        assert!(check_sql("WITH x AS (SELECT 1) SELECT * FROM x").unwrap().returns_rows);
        assert!(check_sql("DELETE FROM t RETURNING id").unwrap().returns_rows);
        assert!(!check_sql("UPDATE t SET a = 1").unwrap().returns_rows);
    }

    #[tokio::test]
    async fn test_tables_and_columns() {
        let db = DbService::in_memory().await.unwrap();
        let tables = list_tables(&db.pool).await.unwrap();
        assert_eq!(
            tables,
            vec!["sys_menu", "sys_role", "sys_role_apis", "sys_role_menus", "sys_user"]
        );

        let columns = table_columns(&db.pool, "sys_role").await.unwrap();
        let id = &columns[0];
        assert_eq!(id.name, "id");
        assert_eq!(id.data_type, "INTEGER");
        assert!(id.primary_key);
        let scope = columns.iter().find(|c| c.name == "data_scope").unwrap();
        assert!(scope.not_null);
        assert_eq!(scope.default_value.as_deref(), Some("'all'"));

        let err = table_columns(&db.pool, "_sqlx_migrations").await.unwrap_err();
        assert_eq!(err.message, "table not found");
    }

    #[tokio::test]
    async fn test_execute_select_and_write() {
        let db = DbService::in_memory().await.unwrap();
        let done = execute(
            &db.pool,
            "INSERT INTO sys_role (role_name, role_key, created_at, updated_at) VALUES ('Ops', 'ops', 1, 1)",
        )
        .await
        .unwrap();
        assert_eq!(done.rows_affected, Some(1));
        assert!(done.columns.is_empty());

        let rows = execute(
            &db.pool,
            "SELECT id, role_key, status, NULL AS empty, 1.5 AS ratio, x'0102' AS raw FROM sys_role",
        )
        .await
        .unwrap();
        assert_eq!(rows.columns, vec!["id", "role_key", "status", "empty", "ratio", "raw"]);
        assert_eq!(rows.rows.len(), 1);
        let row = &rows.rows[0];
        assert_eq!(row["role_key"], "ops");
        assert_eq!(row["status"], 1);
        assert_eq!(row["empty"], Value::Null);
        assert_eq!(row["ratio"], 1.5);
        assert_eq!(row["raw"], "AQI=");
        assert_eq!(rows.rows_affected, None);
    }

    #[tokio::test]
    async fn test_execute_empty_result_keeps_columns() {
        let db = DbService::in_memory().await.unwrap();
        let rows = execute(&db.pool, "SELECT id, username FROM sys_user").await.unwrap();
        assert!(rows.rows.is_empty());
        assert_eq!(rows.columns, vec!["id", "username"]);
    }

    #[tokio::test]
    async fn test_execute_caps_rows() {
        let db = DbService::in_memory().await.unwrap();
        let rows = execute(
            &db.pool,
            "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 1500) SELECT x FROM n",
        )
        .await
        .unwrap();
        assert_eq!(rows.rows.len(), MAX_ROWS);
        assert!(rows.truncated);
    }

    #[tokio::test]
    async fn test_execute_reports_sqlite_errors() {
        let db = DbService::in_memory().await.unwrap();
        let err = execute(&db.pool, "SELECT * FROM missing_table").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SqlInvalid);
    }
}
