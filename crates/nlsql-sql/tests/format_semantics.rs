//! Formatted SQL must return the same rows as the SQL it was formatted from

use nlsql_sql::pretty_format;
use rusqlite::types::Value;
use rusqlite::Connection;

fn company() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT, age INTEGER, department TEXT, \"first name\" TEXT);
         INSERT INTO employees VALUES (1, 'Ava Thompson', 34, 'Sales', 'Ava');
         INSERT INTO employees VALUES (2, 'Liam Carter', 29, 'Engineering', 'Liam');
         INSERT INTO employees VALUES (3, 'Sophia Nguyen', 41, 'Sales', 'Sophia');
         INSERT INTO employees VALUES (4, 'Noah O''Brien', 52, 'Engineering', 'Noah');",
    )
    .unwrap();
    conn
}

fn rows(conn: &Connection, sql: &str) -> Vec<Vec<Value>> {
    let mut stmt = conn.prepare(sql).unwrap();
    let width = stmt.column_count();
    stmt.query_map([], |row| {
        (0..width).map(|i| row.get::<_, Value>(i)).collect::<Result<Vec<_>, _>>()
    })
    .unwrap()
    .collect::<Result<Vec<_>, _>>()
    .unwrap()
}

#[test]
fn test_formatting_preserves_results() {
    let conn = company();
    let statements = [
        "SELECT 1e3, 0x10, -5 FROM employees",
        "select name from employees where age > 30 and department = 'Sales' order by name",
        "select \"first name\", [name] from employees where name = 'Noah O''Brien'",
        "select name from employees where age between 30 and 45 or department = 'Engineering' order by id",
        "select name from employees where age = (select max(age) from employees)",
        "select department, count(*) as n from employees group by department having count(*) > 1 order by 2 desc, 1",
        "select name -- display name\nfrom employees /* all */ order by id limit 2",
        "select x'41', 0X1F + 1, 1.50 * 2 from employees limit 1",
    ];

    for sql in statements {
        let formatted = pretty_format(sql);
        assert_eq!(
            rows(&conn, sql),
            rows(&conn, &formatted),
            "{sql:?} formatted as {formatted:?}"
        );
    }
}

#[test]
fn test_hex_integer_stays_an_integer() {
    let conn = company();
    let formatted = pretty_format("SELECT 0x10 FROM employees LIMIT 1");

    assert_eq!(formatted, "SELECT 0x10\nFROM employees\nLIMIT 1");
    assert_eq!(rows(&conn, &formatted), vec![vec![Value::Integer(16)]]);
}
