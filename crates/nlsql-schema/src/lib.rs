//! NLSQL schema model
//!
//! In-memory description of the databases a question can be asked against.
//! Schemas are loaded once (from a JSON document or by introspecting a live
//! database) and are read-only afterwards, so they can be shared freely
//! across requests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

mod types;
pub use types::*;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema document {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate table '{table}' in schema '{schema}'")]
    DuplicateTable { schema: String, table: String },

    #[error("Schema {0} not found.")]
    NotFound(String),

    #[error("No schemas loaded")]
    Empty,
}

/// One database: its tables, relations and the file that backs it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawDatabaseSchema")]
pub struct DatabaseSchema {
    name: String,
    path: PathBuf,
    tables: Vec<Table>,
    #[serde(default)]
    foreign_keys: Vec<ForeignKey>,

    /// Lowercased table name -> position in `tables`
    #[serde(skip)]
    table_index: HashMap<String, usize>,
}

/// Wire shape of a database entry, before the table index is built
#[derive(Deserialize)]
struct RawDatabaseSchema {
    name: String,
    path: PathBuf,
    tables: Vec<Table>,
    #[serde(default)]
    foreign_keys: Vec<ForeignKey>,
}

impl TryFrom<RawDatabaseSchema> for DatabaseSchema {
    type Error = SchemaError;

    fn try_from(raw: RawDatabaseSchema) -> Result<Self, Self::Error> {
        DatabaseSchema::new(raw.name, raw.path, raw.tables, raw.foreign_keys)
    }
}

impl DatabaseSchema {
    /// Build a schema, rejecting table names that collide case-insensitively
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        tables: Vec<Table>,
        foreign_keys: Vec<ForeignKey>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut table_index = HashMap::with_capacity(tables.len());

        for (idx, table) in tables.iter().enumerate() {
            if table_index.insert(table.name.to_lowercase(), idx).is_some() {
                return Err(SchemaError::DuplicateTable {
                    schema: name,
                    table: table.name.clone(),
                });
            }
        }

        Ok(Self {
            name,
            path: path.into(),
            tables,
            foreign_keys,
            table_index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locator of the executable database backing this schema
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Case-insensitive table lookup
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.table_index
            .get(&name.to_lowercase())
            .map(|&idx| &self.tables[idx])
    }

    /// `src.col -> tgt.col` rendering of every foreign key, in declaration order
    pub fn relation_strings(&self) -> Vec<String> {
        self.foreign_keys.iter().map(ToString::to_string).collect()
    }
}

/// Every database known to a pipeline, in load order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCollection {
    databases: Vec<DatabaseSchema>,
}

impl SchemaCollection {
    pub fn new(databases: Vec<DatabaseSchema>) -> Self {
        Self { databases }
    }

    /// Load a schema document from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn databases(&self) -> &[DatabaseSchema] {
        &self.databases
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// Resolve a schema by name (case-insensitive), or the first one when no name is given
    pub fn select(&self, name: Option<&str>) -> Result<&DatabaseSchema, SchemaError> {
        match name {
            Some(name) => self
                .databases
                .iter()
                .find(|db| db.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| SchemaError::NotFound(name.to_string())),
            None => self.databases.first().ok_or(SchemaError::Empty),
        }
    }
}
