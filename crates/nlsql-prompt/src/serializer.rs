//! Compact textual rendering of a schema for the model prompt

use nlsql_schema::{DatabaseSchema, Table};
use serde::{Deserialize, Serialize};

/// Limits and toggles for schema serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    pub max_tables: usize,
    pub max_columns_per_table: usize,
    pub include_sample_values: bool,
    pub include_relations: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_tables: 6,
            max_columns_per_table: 16,
            include_sample_values: true,
            include_relations: true,
        }
    }
}

/// Sample values shown per column
const SAMPLES_PER_COLUMN: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct SchemaSerializer {
    config: SerializerConfig,
}

impl SchemaSerializer {
    pub fn new(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Render `schema`, linked tables first, capped by the configured budget.
    ///
    /// Output shape: `t1(c1 T1, c2 T2) | t2(...) || relations: a.x -> b.y; ...`
    pub fn serialize(&self, schema: &DatabaseSchema, linked_tables: &[&str]) -> String {
        let tables = self.prioritize(schema, linked_tables);

        let table_section = tables
            .iter()
            .take(self.config.max_tables)
            .map(|table| self.serialize_table(table))
            .collect::<Vec<_>>()
            .join(" | ");

        let mut out = table_section;
        if self.config.include_relations && !schema.foreign_keys().is_empty() {
            let relations = schema
                .relation_strings()
                .into_iter()
                .take(self.config.max_tables)
                .collect::<Vec<_>>();
            out.push_str(" || relations: ");
            out.push_str(&relations.join("; "));
        }
        out
    }

    /// Linked tables in discovery order, then the rest in declaration order
    fn prioritize<'a>(&self, schema: &'a DatabaseSchema, linked_tables: &[&str]) -> Vec<&'a Table> {
        let mut ordered: Vec<&Table> = Vec::with_capacity(schema.tables().len());

        let linked = linked_tables
            .iter()
            .filter_map(|name| schema.find_table(name));
        for table in linked.chain(schema.tables()) {
            if !ordered.iter().any(|seen| seen.name == table.name) {
                ordered.push(table);
            }
        }

        ordered
    }

    fn serialize_table(&self, table: &Table) -> String {
        let columns = &table.columns[..table.columns.len().min(self.config.max_columns_per_table)];

        let mut snippet = columns
            .iter()
            .map(|col| format!("{} {}", col.name, col.data_type))
            .collect::<Vec<_>>()
            .join(", ");

        if self.config.include_sample_values {
            let samples: Vec<String> = columns
                .iter()
                .filter_map(|col| {
                    let values = table.samples_for(&col.name);
                    if values.is_empty() {
                        return None;
                    }
                    let joined = values
                        .iter()
                        .take(SAMPLES_PER_COLUMN)
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("/");
                    Some(format!("{}≈{}", col.name, joined))
                })
                .collect();

            if !samples.is_empty() {
                snippet.push_str(&format!(" [samples: {}]", samples.join(", ")));
            }
        }

        format!("{}({})", table.name, snippet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlsql_schema::{Column, ForeignKey};

    fn schema() -> DatabaseSchema {
        DatabaseSchema::new(
            "company",
            "company.db",
            vec![
                Table::new(
                    "departments",
                    vec![Column::new("id", "INTEGER"), Column::new("division", "TEXT")],
                ),
                Table::new(
                    "employees",
                    vec![
                        Column::new("id", "INTEGER"),
                        Column::new("name", "TEXT"),
                        Column::new("department", "TEXT"),
                    ],
                )
                .with_samples("department", ["Sales", "HR", "Finance"])
                .with_samples("name", ["Ava"]),
                Table::new("sales", vec![Column::new("amount", "REAL")]),
            ],
            vec![
                ForeignKey::new("employees", "department_id", "departments", "id"),
                ForeignKey::new("sales", "employee_id", "employees", "id"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_serialize_declaration_order() {
        let serializer = SchemaSerializer::new(SerializerConfig {
            include_sample_values: false,
            include_relations: false,
            ..Default::default()
        });
        assert_eq!(
            serializer.serialize(&schema(), &[]),
            "departments(id INTEGER, division TEXT) | employees(id INTEGER, name TEXT, department TEXT) | sales(amount REAL)"
        );
    }

    #[test]
    fn test_linked_tables_come_first() {
        let serializer = SchemaSerializer::new(SerializerConfig {
            include_sample_values: false,
            include_relations: false,
            ..Default::default()
        });
        let out = serializer.serialize(&schema(), &["SALES", "employees", "sales"]);
        assert!(out.starts_with("sales(amount REAL) | employees("));
        assert!(out.ends_with("| departments(id INTEGER, division TEXT)"));
    }

    #[test]
    fn test_samples_use_first_two_values() {
        let serializer = SchemaSerializer::new(SerializerConfig {
            include_relations: false,
            ..Default::default()
        });
        let out = serializer.serialize(&schema(), &["employees"]);
        assert!(out.starts_with(
            "employees(id INTEGER, name TEXT, department TEXT [samples: name≈Ava, department≈Sales/HR])"
        ));
    }

    #[test]
    fn test_relations_suffix() {
        let serializer = SchemaSerializer::new(SerializerConfig {
            include_sample_values: false,
            ..Default::default()
        });
        let out = serializer.serialize(&schema(), &[]);
        assert!(out.ends_with(
            " || relations: employees.department_id -> departments.id; sales.employee_id -> employees.id"
        ));
    }

    #[test]
    fn test_caps_tables_and_columns() {
        let serializer = SchemaSerializer::new(SerializerConfig {
            max_tables: 1,
            max_columns_per_table: 2,
            include_sample_values: true,
            include_relations: true,
        });
        let out = serializer.serialize(&schema(), &["employees"]);
        // department is beyond the column cap, so its samples are dropped too
        assert_eq!(
            out,
            "employees(id INTEGER, name TEXT [samples: name≈Ava]) || relations: employees.department_id -> departments.id"
        );
    }

    #[test]
    fn test_deterministic() {
        let serializer = SchemaSerializer::default();
        let s = schema();
        assert_eq!(
            serializer.serialize(&s, &["employees"]),
            serializer.serialize(&s, &["employees"])
        );
    }
}
