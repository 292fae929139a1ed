//! Execution boundary: where validated SQL is actually run

use nlsql_sqlite::{ExecutionBudget, ExecutionError, QueryResult, SqliteExecutor};
use std::path::Path;

pub trait ExecutionSink: Send + Sync {
    fn execute(&self, database: &Path, sql: &str) -> Result<QueryResult, ExecutionError>;
}

/// Opens the schema's SQLite file read-only for every statement
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteSink {
    budget: ExecutionBudget,
}

impl SqliteSink {
    pub fn new(budget: ExecutionBudget) -> Self {
        Self { budget }
    }
}

impl ExecutionSink for SqliteSink {
    fn execute(&self, database: &Path, sql: &str) -> Result<QueryResult, ExecutionError> {
        SqliteExecutor::open(database)?.execute(sql, self.budget)
    }
}
