//! Demo company database used by the sample schema document

use rusqlite::{params, Connection};
use std::path::Path;

use crate::ExecutionError;

const DEPARTMENTS: &[(i64, &str, &str)] = &[
    (1, "Sales", "Enterprise"),
    (2, "Engineering", "Product"),
    (3, "HR", "Corporate"),
    (4, "Finance", "Corporate"),
];

const EMPLOYEES: &[(i64, &str, i64, &str, i64, &str, i64)] = &[
    (1, "Ava Thompson", 34, "Sales", 1, "Sales Manager", 120000),
    (2, "Liam Carter", 29, "Engineering", 2, "Backend Engineer", 135000),
    (3, "Sophia Nguyen", 41, "Sales", 1, "Account Executive", 98000),
    (4, "Ethan Patel", 37, "Sales", 1, "Sales Associate", 86000),
    (5, "Mia Rodriguez", 31, "HR", 3, "HR Business Partner", 90000),
    (6, "Noah Brooks", 45, "Finance", 4, "Senior Analyst", 110000),
    (7, "Olivia Green", 33, "Sales", 1, "Sales Operations Lead", 102000),
];

const DDL: &str = "
    DROP TABLE IF EXISTS employees;
    DROP TABLE IF EXISTS departments;
    CREATE TABLE departments (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        division TEXT NOT NULL
    );
    CREATE TABLE employees (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        age INTEGER NOT NULL,
        department TEXT NOT NULL,
        department_id INTEGER NOT NULL,
        role TEXT NOT NULL,
        salary INTEGER NOT NULL,
        FOREIGN KEY (department_id) REFERENCES departments(id)
    );
";

/// (Re)create the demo `departments` / `employees` database at `path`.
///
/// Existing tables of the same name are dropped first. The parent directory
/// must already exist.
pub fn bootstrap_demo<P: AsRef<Path>>(path: P) -> Result<(), ExecutionError> {
    let path = path.as_ref();
    let mut conn = Connection::open(path).map_err(|source| ExecutionError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    let tx = conn.transaction()?;
    tx.execute_batch(DDL)?;
    {
        let mut insert =
            tx.prepare("INSERT INTO departments (id, name, division) VALUES (?1, ?2, ?3)")?;
        for (id, name, division) in DEPARTMENTS {
            insert.execute(params![id, name, division])?;
        }

        let mut insert = tx.prepare(
            "INSERT INTO employees (id, name, age, department, department_id, role, salary)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for (id, name, age, department, department_id, role, salary) in EMPLOYEES {
            insert.execute(params![id, name, age, department, department_id, role, salary])?;
        }
    }
    tx.commit()?;

    tracing::info!(
        path = %path.display(),
        departments = DEPARTMENTS.len(),
        employees = EMPLOYEES.len(),
        "Demo database ready"
    );
    Ok(())
}
