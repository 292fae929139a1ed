//! Deterministic pattern-based translator used when no model candidate works
//!
//! Low coverage by construction: each rule recognizes one hard-coded question
//! family and only fires when the tables it needs exist. Rules are tried in
//! declaration order and the first match wins.

use nlsql_schema::DatabaseSchema;
use once_cell::sync::Lazy;
use regex::Regex;

static AGE_FILTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:older|over|greater) than (\d+)").expect("valid age regex"));

static DEPARTMENT_FILTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:in|from|within) the ([a-z ]+) department").expect("valid department regex")
});

/// Phrasings of the third quarter of 2024
const Q3_2024_PHRASES: &[&str] = &["2024-q3", "q3 2024", "2024 quarter 3", "q3 of 2024"];

/// A single question pattern; receives the lowercased question
pub struct HeuristicRule {
    pub name: &'static str,
    apply: fn(&str, &DatabaseSchema) -> Option<String>,
}

const DEFAULT_RULES: &[HeuristicRule] = &[
    HeuristicRule {
        name: "sales_client_division_q3",
        apply: sales_client_division_q3,
    },
    HeuristicRule {
        name: "employee_age_department",
        apply: employee_age_department,
    },
];

pub struct HeuristicTranslator {
    rules: &'static [HeuristicRule],
}

impl Default for HeuristicTranslator {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES,
        }
    }
}

impl HeuristicTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name)
    }

    pub fn translate(&self, question: &str, schema: &DatabaseSchema) -> Option<String> {
        let lowered = question.to_lowercase();
        self.rules.iter().find_map(|rule| {
            let sql = (rule.apply)(&lowered, schema)?;
            tracing::debug!(rule = rule.name, "Heuristic rule matched");
            Some(sql)
        })
    }
}

/// Join demo: clients, divisions and employees behind Q3 2024 sales
fn sales_client_division_q3(lowered: &str, schema: &DatabaseSchema) -> Option<String> {
    if !lowered.contains("division") {
        return None;
    }
    if !Q3_2024_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
        return None;
    }

    let departments = schema
        .find_table("departments")
        .or_else(|| schema.find_table("department"))?;
    let sales = schema.find_table("sales")?;
    let employees = schema.find_table("employees")?;

    Some(format!(
        "SELECT s.client,\n       d.division,\n       d.name AS department,\n       e.name AS employee,\n       s.amount\n\
         FROM {} AS s\n\
         JOIN {} AS e ON s.employee_id = e.id\n\
         JOIN {} AS d ON e.department_id = d.id\n\
         WHERE s.quarter = '2024-Q3'",
        sales.name, employees.name, departments.name
    ))
}

/// Single-table employee listing filtered by age and department
fn employee_age_department(lowered: &str, schema: &DatabaseSchema) -> Option<String> {
    if !lowered.contains("employee") {
        return None;
    }
    let table = schema.find_table("employees")?;

    let mut conditions = Vec::new();

    if let Some(caps) = AGE_FILTER.captures(lowered) {
        conditions.push(format!("age > {}", &caps[1]));
    }

    if let Some(caps) = DEPARTMENT_FILTER.captures(lowered) {
        conditions.push(format!("department = '{}'", title_case(caps[1].trim())));
    } else if lowered.contains("sales") {
        conditions.push("department = 'Sales'".to_string());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    Some(format!("SELECT name FROM {}{}", table.name, where_clause))
}

/// "human resources" -> "Human Resources"
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
