//! End-to-end prompt construction against a small company schema

use nlsql_prompt::{AggregateHint, LinkedColumn, Preprocessor, SerializerConfig};
use nlsql_schema::{Column, DatabaseSchema, ForeignKey, Table};

fn company() -> DatabaseSchema {
    DatabaseSchema::new(
        "company",
        "data/sample.db",
        vec![
            Table::new(
                "departments",
                vec![
                    Column::new("id", "INTEGER"),
                    Column::new("title", "TEXT"),
                    Column::new("division", "TEXT"),
                ],
            ),
            Table::new(
                "employees",
                vec![
                    Column::new("id", "INTEGER"),
                    Column::new("name", "TEXT"),
                    Column::new("salary", "INTEGER"),
                    Column::new("department_id", "INTEGER"),
                ],
            )
            .with_samples("name", ["Ava Thompson", "Liam Carter"]),
        ],
        vec![ForeignKey::new("employees", "department_id", "departments", "id")],
    )
    .unwrap()
}

#[test]
fn test_prompt_with_hints() {
    let preprocessor = Preprocessor::new(SerializerConfig::default());
    let out = preprocessor.build("What is the highest salary?", &company());

    assert_eq!(out.linked_columns, vec![LinkedColumn::new("employees", "salary")]);
    assert_eq!(out.aggregations, vec![AggregateHint::Max]);
    assert_eq!(
        out.prompt,
        "translate to SQL: What is the highest salary? || schema: \
         employees(id INTEGER, name TEXT, salary INTEGER, department_id INTEGER [samples: name≈Ava Thompson/Liam Carter]) | \
         departments(id INTEGER, title TEXT, division TEXT) || relations: employees.department_id -> departments.id \
         || agg_hints: MAX"
    );
}

#[test]
fn test_prompt_without_hints_omits_segment() {
    let preprocessor = Preprocessor::new(SerializerConfig {
        include_relations: false,
        include_sample_values: false,
        ..Default::default()
    });
    let out = preprocessor.build("Show every division", &company());

    assert!(out.aggregations.is_empty());
    assert!(!out.prompt.contains("agg_hints"));
    assert_eq!(
        out.prompt,
        "translate to SQL: Show every division || schema: \
         departments(id INTEGER, title TEXT, division TEXT) | \
         employees(id INTEGER, name TEXT, salary INTEGER, department_id INTEGER)"
    );
    assert_eq!(out.schema_prompt, out.prompt.split(" || schema: ").nth(1).unwrap());
}

#[test]
fn test_serialized_tables_respect_caps() {
    let config = SerializerConfig {
        max_tables: 1,
        max_columns_per_table: 2,
        include_sample_values: false,
        include_relations: false,
    };
    let preprocessor = Preprocessor::new(config);
    let schema = company();

    for question in ["salary", "division", "nothing relevant", "department id and title"] {
        let out = preprocessor.build(question, &schema);
        let tables: Vec<&str> = out.schema_prompt.split(" | ").collect();
        assert_eq!(tables.len(), 1, "{question}");
        let columns = tables[0].split(", ").count();
        assert!(columns <= 2, "{question}: {}", out.schema_prompt);
    }
}
