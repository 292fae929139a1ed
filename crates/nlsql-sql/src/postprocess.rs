//! Sanitizing and validating generated SQL before it reaches the database

use nlsql_schema::DatabaseSchema;
use thiserror::Error;

use crate::shape::StatementShape;

/// Why a candidate statement was rejected. Checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("parse failure: {0}")]
    ParseFailure(String),

    #[error("missing FROM")]
    MissingFrom,

    #[error("unknown table")]
    UnknownTable,

    #[error("mutating statement forbidden")]
    MutatingStatement,
}

/// Textual read-only guard. Coarse: it also blocks identifiers ending in one
/// of these words (`last_update FROM ...`) and knows nothing about comments.
const FORBIDDEN_FRAGMENTS: &[&str] = &["drop ", "delete ", "update ", "insert "];

/// Collapse whitespace runs to a single space and trim
pub fn sanitize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check a statement against `schema`, returning its shape when accepted
pub fn validate(sql: &str, schema: &DatabaseSchema) -> Result<StatementShape, ValidationError> {
    let shape =
        StatementShape::parse(sql).map_err(|e| ValidationError::ParseFailure(e.to_string()))?;

    if !shape.has_from {
        return Err(ValidationError::MissingFrom);
    }

    let lowered = sql.to_lowercase();

    let references_known_table = schema
        .tables()
        .iter()
        .any(|table| lowered.contains(&table.name.to_lowercase()));
    if !references_known_table {
        return Err(ValidationError::UnknownTable);
    }

    if FORBIDDEN_FRAGMENTS
        .iter()
        .any(|fragment| lowered.contains(fragment))
    {
        return Err(ValidationError::MutatingStatement);
    }

    Ok(shape)
}
