//! Schema linking: which columns does the question talk about?
//!
//! Matching is exact substring search over normalized text (lowercase,
//! underscores read as spaces). There is no fuzzy matching.

use nlsql_schema::Table;
use serde::{Deserialize, Serialize};

/// A (table, column) pair mentioned by the question
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedColumn {
    pub table: String,
    pub column: String,
}

impl LinkedColumn {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace('_', " ")
}

/// Link question text to columns, in table-then-column order
pub fn link(question: &str, tables: &[Table]) -> Vec<LinkedColumn> {
    let normalized_question = normalize(question);
    let mut matches = Vec::new();

    for table in tables {
        for column in &table.columns {
            let alias = normalize(&column.name);
            if !alias.is_empty() && normalized_question.contains(&alias) {
                matches.push(LinkedColumn::new(&table.name, &column.name));
            }
        }
    }

    matches
}

/// Distinct table names of a link result, in discovery order
pub fn linked_tables(linked: &[LinkedColumn]) -> Vec<&str> {
    let mut tables: Vec<&str> = Vec::new();
    for link in linked {
        if !tables.contains(&link.table.as_str()) {
            tables.push(&link.table);
        }
    }
    tables
}
