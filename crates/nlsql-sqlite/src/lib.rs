//! SQLite executor for validated NLSQL queries

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod catalog;
mod demo;
pub use catalog::{discover, introspect, IntrospectionError};
pub use demo::bootstrap_demo;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Failed to open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Limits applied while collecting rows
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionBudget {
    pub max_rows: Option<usize>,
}

pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    /// Open an existing database file read-only
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExecutionError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| ExecutionError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Run one statement and collect its result set
    pub fn execute(
        &self,
        sql: &str,
        budget: ExecutionBudget,
    ) -> Result<QueryResult, ExecutionError> {
        let mut stmt = self.conn.prepare(sql)?;

        // Extract column names before executing
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let column_count = columns.len();

        let mut rows = stmt.query([])?;
        let mut result_rows = Vec::new();
        let mut truncated = false;

        while let Some(row) = rows.next()? {
            if budget.max_rows.is_some_and(|max| result_rows.len() >= max) {
                truncated = true;
                break;
            }

            let mut json_row = Vec::with_capacity(column_count);
            for i in 0..column_count {
                json_row.push(value_to_json(row.get_ref(i)?));
            }
            result_rows.push(json_row);
        }

        let row_count = result_rows.len();
        tracing::debug!(row_count, truncated, "Query executed");

        Ok(QueryResult {
            columns,
            rows: result_rows,
            row_count,
            truncated,
        })
    }
}

/// Ordered column names plus rows of scalar values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: usize,
    #[serde(default)]
    pub truncated: bool,
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::json!(i),
        ValueRef::Real(f) => serde_json::json!(f),
        ValueRef::Text(s) => serde_json::Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor() -> SqliteExecutor {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER, name TEXT, score REAL, avatar BLOB);
             INSERT INTO users VALUES (1, 'Alice', 9.5, x'0102'), (2, 'Bob', NULL, NULL), (3, 'Cy', 7.0, NULL);",
        )
        .unwrap();
        SqliteExecutor::from_connection(conn)
    }

    #[test]
    fn test_execute_collects_columns_and_rows() {
        let result = executor()
            .execute("SELECT id, name, score, avatar FROM users ORDER BY id", ExecutionBudget::default())
            .unwrap();

        assert_eq!(result.columns, vec!["id", "name", "score", "avatar"]);
        assert_eq!(result.row_count, 3);
        assert!(!result.truncated);
        assert_eq!(
            result.rows[0],
            vec![
                serde_json::json!(1),
                serde_json::json!("Alice"),
                serde_json::json!(9.5),
                serde_json::json!("<blob 2 bytes>"),
            ]
        );
        assert_eq!(result.rows[1][2], serde_json::Value::Null);
    }

    #[test]
    fn test_max_rows_truncates() {
        let result = executor()
            .execute("SELECT name FROM users", ExecutionBudget { max_rows: Some(2) })
            .unwrap();
        assert_eq!(result.row_count, 2);
        assert!(result.truncated);
    }

    #[test]
    fn test_invalid_sql_is_an_error() {
        let err = executor()
            .execute("SELECT nope FROM users", ExecutionBudget::default())
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Database(_)));
    }

    #[test]
    fn test_open_missing_file() {
        let err = SqliteExecutor::open("/definitely/not/here.sqlite").err().unwrap();
        assert!(matches!(err, ExecutionError::Open { .. }));
    }
}
