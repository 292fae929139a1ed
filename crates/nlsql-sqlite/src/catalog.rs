//! Schema extraction from live SQLite databases
//!
//! Used when no schema document is configured: every table, column, primary
//! key and foreign key is read from the database itself, along with a couple
//! of sample values per column for prompt enrichment.

use nlsql_schema::{Column, DatabaseSchema, ForeignKey, SampleValue, SchemaCollection, SchemaError, Table};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Distinct sample values pulled per column
const SAMPLES_PER_COLUMN: usize = 2;

/// File extensions treated as SQLite databases by [`discover`]
const DATABASE_EXTENSIONS: &[&str] = &["sqlite", "db"];

#[derive(Debug, Error)]
pub enum IntrospectionError {
    #[error("Failed to open database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("Failed to read directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Foreign key as reported by SQLite; the target column may be implicit
struct RawForeignKey {
    source_table: String,
    source_column: String,
    target_table: String,
    target_column: Option<String>,
}

/// Read the schema of the database at `path`
pub fn introspect<P: AsRef<Path>>(name: &str, path: P) -> Result<DatabaseSchema, IntrospectionError> {
    let path = path.as_ref();
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
        |source| IntrospectionError::Open {
            path: path.to_path_buf(),
            source,
        },
    )?;

    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let table_names: Vec<String> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut tables = Vec::with_capacity(table_names.len());
    let mut raw_keys = Vec::new();
    for table_name in &table_names {
        tables.push(extract_table(&conn, table_name)?);
        raw_keys.extend(extract_foreign_keys(&conn, table_name)?);
    }

    // Implicit targets reference the target table's primary key
    let primary_keys: HashMap<String, String> = tables
        .iter()
        .filter_map(|t| Some((t.name.to_lowercase(), t.primary_key.clone()?)))
        .collect();
    let foreign_keys = raw_keys
        .into_iter()
        .filter_map(|fk| {
            let target_column = fk
                .target_column
                .or_else(|| primary_keys.get(&fk.target_table.to_lowercase()).cloned())?;
            Some(ForeignKey::new(
                fk.source_table,
                fk.source_column,
                fk.target_table,
                target_column,
            ))
        })
        .collect();

    tracing::info!(
        schema = name,
        tables = tables.len(),
        path = %path.display(),
        "Introspected database"
    );

    Ok(DatabaseSchema::new(name, path, tables, foreign_keys)?)
}

/// Introspect every SQLite file in `dir`; the file stem names each schema
pub fn discover<P: AsRef<Path>>(dir: P) -> Result<SchemaCollection, IntrospectionError> {
    let dir = dir.as_ref();
    let io_err = |source| IntrospectionError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_database = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DATABASE_EXTENSIONS.contains(&ext));
        if path.is_file() && is_database {
            paths.push(path);
        }
    }
    paths.sort();

    let mut databases = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        databases.push(introspect(&name, &path)?);
    }

    Ok(SchemaCollection::new(databases))
}

fn extract_table(conn: &Connection, table_name: &str) -> Result<Table, IntrospectionError> {
    let mut stmt = conn.prepare("SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns: Vec<(String, String, i64)> = stmt
        .query_map([table_name], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let primary_key = columns
        .iter()
        .find(|(_, _, pk)| *pk == 1)
        .map(|(name, _, _)| name.clone());

    let mut table = Table::new(
        table_name,
        columns
            .iter()
            .map(|(name, data_type, _)| Column::new(name, data_type))
            .collect(),
    );
    table.primary_key = primary_key;

    for (column, _, _) in &columns {
        let samples = extract_samples(conn, table_name, column)?;
        if !samples.is_empty() {
            table = table.with_samples(column, samples);
        }
    }

    Ok(table)
}

fn extract_foreign_keys(
    conn: &Connection,
    table_name: &str,
) -> Result<Vec<RawForeignKey>, IntrospectionError> {
    let mut stmt =
        conn.prepare("SELECT \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq")?;
    let keys = stmt
        .query_map([table_name], |row| {
            Ok(RawForeignKey {
                source_table: table_name.to_string(),
                source_column: row.get(1)?,
                target_table: row.get(0)?,
                target_column: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keys)
}

fn extract_samples(
    conn: &Connection,
    table_name: &str,
    column: &str,
) -> Result<Vec<SampleValue>, IntrospectionError> {
    let query = format!(
        "SELECT DISTINCT {col} FROM {table} WHERE {col} IS NOT NULL LIMIT {limit}",
        col = quote_ident(column),
        table = quote_ident(table_name),
        limit = SAMPLES_PER_COLUMN,
    );

    let mut stmt = conn.prepare(&query)?;
    let mut rows = stmt.query([])?;
    let mut samples = Vec::new();
    while let Some(row) = rows.next()? {
        let sample = match row.get_ref(0)? {
            ValueRef::Integer(i) => SampleValue::Integer(i),
            ValueRef::Real(f) => SampleValue::Real(f),
            ValueRef::Text(s) => SampleValue::Text(String::from_utf8_lossy(s).to_string()),
            ValueRef::Null | ValueRef::Blob(_) => continue,
        };
        samples.push(sample);
    }
    Ok(samples)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
