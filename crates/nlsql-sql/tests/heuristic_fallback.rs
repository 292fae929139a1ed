//! Heuristic translator scenarios

use nlsql_schema::{Column, DatabaseSchema, Table};
use nlsql_sql::{sanitize, validate, HeuristicTranslator};

fn employees_only() -> DatabaseSchema {
    DatabaseSchema::new(
        "company",
        "data/sample.db",
        vec![Table::new(
            "employees",
            vec![
                Column::new("name", "TEXT"),
                Column::new("age", "INTEGER"),
                Column::new("department", "TEXT"),
            ],
        )],
        vec![],
    )
    .unwrap()
}

fn with_sales() -> DatabaseSchema {
    DatabaseSchema::new(
        "company",
        "data/sample.db",
        vec![
            Table::new("employees", vec![Column::new("id", "INTEGER")]),
            Table::new("department", vec![Column::new("id", "INTEGER")]),
            Table::new("sales", vec![Column::new("client", "TEXT")]),
        ],
        vec![],
    )
    .unwrap()
}

#[test]
fn test_employees_older_than_in_department() {
    let sql = HeuristicTranslator::new().translate(
        "List employees older than 30 in the Sales department",
        &employees_only(),
    );
    assert_eq!(
        sql.as_deref(),
        Some("SELECT name FROM employees WHERE age > 30 AND department = 'Sales'")
    );
}

#[test]
fn test_multi_word_department_is_title_cased() {
    let sql = HeuristicTranslator::new()
        .translate(
            "Which employees older than 45 work within the human resources department?",
            &employees_only(),
        )
        .unwrap();
    assert_eq!(
        sql,
        "SELECT name FROM employees WHERE age > 45 AND department = 'Human Resources'"
    );
}

#[test]
fn test_sales_keyword_without_department_phrase() {
    let sql = HeuristicTranslator::new()
        .translate("employee names in sales", &employees_only())
        .unwrap();
    assert_eq!(sql, "SELECT name FROM employees WHERE department = 'Sales'");
}

#[test]
fn test_no_filters() {
    let sql = HeuristicTranslator::new()
        .translate("Show me every employee", &employees_only())
        .unwrap();
    assert_eq!(sql, "SELECT name FROM employees");
}

#[test]
fn test_requires_employees_table() {
    let schema = DatabaseSchema::new(
        "school",
        "school.db",
        vec![Table::new("students", vec![Column::new("name", "TEXT")])],
        vec![],
    )
    .unwrap();
    assert!(HeuristicTranslator::new()
        .translate("List employees older than 30", &schema)
        .is_none());
}

#[test]
fn test_unmatched_question() {
    assert!(HeuristicTranslator::new()
        .translate("How many planets orbit the sun?", &employees_only())
        .is_none());
}

#[test]
fn test_q3_join_rule_wins_over_employee_rule() {
    let sql = HeuristicTranslator::new()
        .translate(
            "Which clients bought from each division and employee in Q3 2024?",
            &with_sales(),
        )
        .unwrap();
    assert!(sql.starts_with("SELECT s.client,"));
    assert!(sql.contains("FROM sales AS s"));
    assert!(sql.contains("JOIN department AS d ON e.department_id = d.id"));
    assert!(sql.ends_with("WHERE s.quarter = '2024-Q3'"));

    // the generated statement passes validation once sanitized
    assert!(validate(&sanitize(&sql), &with_sales()).is_ok());
}

#[test]
fn test_q3_rule_needs_all_tables() {
    // no sales table: falls through to the employee rule
    let sql = HeuristicTranslator::new()
        .translate("employee per division for 2024-Q3", &employees_only())
        .unwrap();
    assert_eq!(sql, "SELECT name FROM employees");
}
